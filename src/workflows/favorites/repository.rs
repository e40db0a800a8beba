use super::domain::{Favorite, FavoriteId, SavedListing};
use crate::identity::UserId;
use crate::store::StoreError;

/// Storage abstraction for the favorites ledger. Pair uniqueness lives
/// here, not in the caller: a double-click that races itself still ends up
/// with at most one row for the pair.
pub trait FavoriteRepository: Send + Sync {
    /// Flip the pair: if a row for `(candidate.user_id, candidate.listing_id)`
    /// exists it is removed and `false` comes back; otherwise `candidate` is
    /// inserted and `true` comes back. `NotFound` when the listing is gone.
    fn toggle(&self, candidate: Favorite) -> Result<bool, StoreError>;
    fn fetch(&self, id: &FavoriteId) -> Result<Option<Favorite>, StoreError>;
    fn delete(&self, id: &FavoriteId) -> Result<(), StoreError>;
    /// The user's favorites joined with their listings, newest first.
    /// Dangling rows come back with `listing: None`.
    fn saved_for_user(&self, user: &UserId) -> Result<Vec<SavedListing>, StoreError>;
}

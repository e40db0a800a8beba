use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{Favorite, FavoriteId, SavedListing};
use super::repository::FavoriteRepository;
use crate::identity::CurrentUser;
use crate::workflows::directory::DirectoryRepository;
use crate::workflows::error::WorkflowError;
use crate::workflows::guard::AccessGuard;
use crate::workflows::listings::ListingId;

static FAVORITE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_favorite_id() -> FavoriteId {
    let id = FAVORITE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    FavoriteId(format!("fav-{id:06}"))
}

/// Service owning the per-user bookmark ledger.
pub struct FavoriteService<F, D> {
    favorites: Arc<F>,
    guard: AccessGuard<D>,
}

impl<F, D> FavoriteService<F, D>
where
    F: FavoriteRepository,
    D: DirectoryRepository,
{
    pub fn new(favorites: Arc<F>, directory: Arc<D>) -> Self {
        let guard = AccessGuard::new(directory);
        Self { favorites, guard }
    }

    /// Save the listing if it is not saved, unsave it if it is. Returns the
    /// membership after the flip.
    pub fn toggle(
        &self,
        identity: Option<&CurrentUser>,
        listing_id: &ListingId,
    ) -> Result<bool, WorkflowError> {
        let caller = self.guard.resolve_active(identity)?;
        let candidate = Favorite {
            id: next_favorite_id(),
            user_id: caller.id,
            listing_id: listing_id.clone(),
            created_at: Utc::now(),
        };
        let is_favorite = self.favorites.toggle(candidate)?;
        Ok(is_favorite)
    }

    /// Remove one favorite row. The row must belong to the caller.
    pub fn remove(
        &self,
        identity: Option<&CurrentUser>,
        favorite_id: &FavoriteId,
    ) -> Result<(), WorkflowError> {
        let caller = self.guard.resolve_active(identity)?;
        let favorite = self
            .favorites
            .fetch(favorite_id)?
            .ok_or(WorkflowError::NotFound("favorite"))?;
        if favorite.user_id != caller.id {
            return Err(WorkflowError::Forbidden("not the owner of this favorite"));
        }
        self.favorites.delete(favorite_id)?;
        Ok(())
    }

    /// The caller's saved listings, dangling rows included.
    pub fn saved(
        &self,
        identity: Option<&CurrentUser>,
    ) -> Result<Vec<SavedListing>, WorkflowError> {
        let caller = self.guard.resolve(identity)?;
        let saved = self.favorites.saved_for_user(&caller.id)?;
        Ok(saved)
    }
}

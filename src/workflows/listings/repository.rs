use chrono::{DateTime, Utc};

use super::domain::{Listing, ListingDraft, ListingFilters, ListingId, ListingStatus, StatusCounts};
use crate::identity::UserId;
use crate::store::StoreError;

/// What a listing deletion removed alongside the record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingPurge {
    pub favorites_removed: usize,
}

/// Storage abstraction for listings. Status transitions are conditional
/// updates: the store applies them only while the record is still in the
/// expected state and reports `Conflict` otherwise, so two racing moderators
/// cannot both win.
pub trait ListingRepository: Send + Sync {
    fn insert(&self, listing: Listing) -> Result<Listing, StoreError>;
    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, StoreError>;
    /// Overwrite the editable fields, leaving status and moderation
    /// timestamps untouched.
    fn update_fields(
        &self,
        id: &ListingId,
        draft: &ListingDraft,
        at: DateTime<Utc>,
    ) -> Result<Listing, StoreError>;
    /// Conditional move between moderation states; `Conflict` unless the
    /// current status is one of `from`.
    fn transition(
        &self,
        id: &ListingId,
        from: &[ListingStatus],
        to: ListingStatus,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Listing, StoreError>;
    /// Conditional publish from `in_attesa`: stamps `published_at` and
    /// `expires_at` together with the status flip, as one application.
    fn publish(&self, id: &ListingId, at: DateTime<Utc>) -> Result<Listing, StoreError>;
    /// Remove the listing and every favorite pointing at it as one unit.
    fn delete_cascade(&self, id: &ListingId) -> Result<ListingPurge, StoreError>;
    /// Best-effort monotonic counter; lost updates under contention are fine.
    fn increment_views(&self, id: &ListingId) -> Result<u64, StoreError>;
    /// Published rows visible at `now` matching the filters, newest first.
    fn search(
        &self,
        filters: &ListingFilters,
        now: DateTime<Utc>,
    ) -> Result<Vec<Listing>, StoreError>;
    /// Everything a given owner has, any status, newest first.
    fn by_owner(&self, owner: &UserId) -> Result<Vec<Listing>, StoreError>;
    /// All rows currently in `status`, oldest first so moderators drain the
    /// queue in arrival order.
    fn by_status(&self, status: ListingStatus) -> Result<Vec<Listing>, StoreError>;
    fn status_counts(&self) -> Result<StatusCounts, StoreError>;
    /// Bulk conditional sweep `pubblicato -> scaduto` for rows whose
    /// `expires_at` is at or before `as_of`; returns how many flipped.
    fn expire_overdue(&self, as_of: DateTime<Utc>) -> Result<usize, StoreError>;
}

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{
    Listing, ListingDraft, ListingFilters, ListingId, ListingStatus, StatusCounts, SubmissionMode,
};
use super::repository::{ListingPurge, ListingRepository};
use crate::identity::CurrentUser;
use crate::workflows::directory::{DirectoryRepository, UserRole};
use crate::workflows::error::WorkflowError;
use crate::workflows::guard::AccessGuard;

static LISTING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_listing_id() -> ListingId {
    let id = LISTING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ListingId(format!("lst-{id:06}"))
}

/// Service owning the listing lifecycle: creation and edits by advertisers,
/// the moderation transitions, and the public catalogue queries.
pub struct ListingService<L, D> {
    listings: Arc<L>,
    guard: AccessGuard<D>,
}

impl<L, D> ListingService<L, D>
where
    L: ListingRepository,
    D: DirectoryRepository,
{
    pub fn new(listings: Arc<L>, directory: Arc<D>) -> Self {
        let guard = AccessGuard::new(directory);
        Self { listings, guard }
    }

    /// Create a listing as a private draft or straight into the moderation
    /// queue. Advertisers and admins only.
    pub fn create(
        &self,
        identity: Option<&CurrentUser>,
        draft: ListingDraft,
        mode: SubmissionMode,
    ) -> Result<Listing, WorkflowError> {
        let owner = self.guard.require_advertiser(identity)?;
        draft.validate()?;

        let now = Utc::now();
        let listing = Listing {
            id: next_listing_id(),
            owner_id: owner.id,
            title: draft.title,
            description: draft.description,
            listing_type: draft.listing_type,
            category: draft.category,
            price: draft.price,
            location: draft.location,
            city: draft.city,
            province: draft.province,
            address: draft.address,
            images: draft.images,
            surface: draft.surface,
            rooms: draft.rooms,
            bathrooms: draft.bathrooms,
            floor: draft.floor,
            energy_class: draft.energy_class,
            features: draft.features,
            status: mode.initial_status(),
            moderation_note: None,
            views: 0,
            created_at: now,
            updated_at: now,
            published_at: None,
            expires_at: None,
        };
        let stored = self.listings.insert(listing)?;
        Ok(stored)
    }

    /// Edit the listing fields. Owner or admin; the moderation status is not
    /// touched here, resubmission is an explicit separate step.
    pub fn update(
        &self,
        identity: Option<&CurrentUser>,
        id: &ListingId,
        draft: ListingDraft,
    ) -> Result<Listing, WorkflowError> {
        let caller = self.guard.resolve_active(identity)?;
        let current = self
            .listings
            .fetch(id)?
            .ok_or(WorkflowError::NotFound("listing"))?;
        AccessGuard::<D>::ensure_owner_or_admin(&caller, &current.owner_id)?;
        draft.validate()?;
        let updated = self.listings.update_fields(id, &draft, Utc::now())?;
        Ok(updated)
    }

    /// Move a draft, rejected, or expired listing back into the moderation
    /// queue. Conditional on the current state.
    pub fn submit(
        &self,
        identity: Option<&CurrentUser>,
        id: &ListingId,
    ) -> Result<Listing, WorkflowError> {
        let caller = self.guard.resolve_active(identity)?;
        let current = self
            .listings
            .fetch(id)?
            .ok_or(WorkflowError::NotFound("listing"))?;
        AccessGuard::<D>::ensure_owner_or_admin(&caller, &current.owner_id)?;
        let resubmitted = self.listings.transition(
            id,
            &[
                ListingStatus::Bozza,
                ListingStatus::Rifiutato,
                ListingStatus::Scaduto,
            ],
            ListingStatus::InAttesa,
            None,
            Utc::now(),
        )?;
        Ok(resubmitted)
    }

    /// Remove the listing and its favorites as one unit. Owner or admin.
    pub fn delete(
        &self,
        identity: Option<&CurrentUser>,
        id: &ListingId,
    ) -> Result<ListingPurge, WorkflowError> {
        let caller = self.guard.resolve_active(identity)?;
        let current = self
            .listings
            .fetch(id)?
            .ok_or(WorkflowError::NotFound("listing"))?;
        AccessGuard::<D>::ensure_owner_or_admin(&caller, &current.owner_id)?;
        let purge = self.listings.delete_cascade(id)?;
        Ok(purge)
    }

    /// Approve a pending listing: publication and expiry stamps land together
    /// with the status flip. `Conflict` from any state other than `in_attesa`.
    pub fn approve(
        &self,
        identity: Option<&CurrentUser>,
        id: &ListingId,
    ) -> Result<Listing, WorkflowError> {
        self.guard.require_admin(identity)?;
        let published = self.listings.publish(id, Utc::now())?;
        Ok(published)
    }

    /// Reject a pending listing. The rationale is recommended but an empty
    /// one is tolerated.
    pub fn reject(
        &self,
        identity: Option<&CurrentUser>,
        id: &ListingId,
        note: Option<String>,
    ) -> Result<Listing, WorkflowError> {
        self.guard.require_admin(identity)?;
        let note = note.filter(|text| !text.trim().is_empty());
        let rejected = self.listings.transition(
            id,
            &[ListingStatus::InAttesa],
            ListingStatus::Rifiutato,
            note,
            Utc::now(),
        )?;
        Ok(rejected)
    }

    /// Detail-page view counter. Anonymous-allowed, approximate by design.
    pub fn increment_view(&self, id: &ListingId) -> Result<u64, WorkflowError> {
        let views = self.listings.increment_views(id)?;
        Ok(views)
    }

    /// Public catalogue search: only published, unexpired rows.
    pub fn search(&self, filters: &ListingFilters) -> Result<Vec<Listing>, WorkflowError> {
        let rows = self.listings.search(filters, Utc::now())?;
        Ok(rows)
    }

    /// One listing for the detail page. Published rows are public; anything
    /// else is only visible to its owner or an admin and reads as absent to
    /// everyone else.
    pub fn detail(
        &self,
        identity: Option<&CurrentUser>,
        id: &ListingId,
    ) -> Result<Listing, WorkflowError> {
        let listing = self
            .listings
            .fetch(id)?
            .ok_or(WorkflowError::NotFound("listing"))?;
        if listing.status == ListingStatus::Pubblicato {
            return Ok(listing);
        }
        let caller = self
            .guard
            .resolve(identity)
            .map_err(|_| WorkflowError::NotFound("listing"))?;
        if caller.role == UserRole::Admin || caller.id == listing.owner_id {
            Ok(listing)
        } else {
            Err(WorkflowError::NotFound("listing"))
        }
    }

    /// The caller's own listings for the advertiser dashboard, any status.
    pub fn own_listings(
        &self,
        identity: Option<&CurrentUser>,
    ) -> Result<Vec<Listing>, WorkflowError> {
        let caller = self.guard.resolve(identity)?;
        let rows = self.listings.by_owner(&caller.id)?;
        Ok(rows)
    }

    /// Listings awaiting review, oldest first.
    pub fn moderation_queue(
        &self,
        identity: Option<&CurrentUser>,
    ) -> Result<Vec<Listing>, WorkflowError> {
        self.guard.require_admin(identity)?;
        let rows = self.listings.by_status(ListingStatus::InAttesa)?;
        Ok(rows)
    }

    /// Per-status totals for the admin dashboard.
    pub fn overview(&self, identity: Option<&CurrentUser>) -> Result<StatusCounts, WorkflowError> {
        self.guard.require_admin(identity)?;
        let counts = self.listings.status_counts()?;
        Ok(counts)
    }

    /// Flip every published listing past its expiry to `scaduto`. The expiry
    /// timer expressed as an explicit admin sweep; there is no in-process
    /// scheduler.
    pub fn expire_overdue(
        &self,
        identity: Option<&CurrentUser>,
        as_of: DateTime<Utc>,
    ) -> Result<usize, WorkflowError> {
        self.guard.require_admin(identity)?;
        let expired = self.listings.expire_overdue(as_of)?;
        Ok(expired)
    }
}

/// Sample draft used by the demo binary seeding.
pub fn demo_draft(title: &str, city: &str, province: &str, price: f64) -> ListingDraft {
    ListingDraft {
        title: title.to_string(),
        description: format!("{title}, zona servita, disponibile subito."),
        listing_type: super::domain::ListingType::Vendita,
        category: super::domain::ListingCategory::Appartamento,
        price,
        location: city.to_string(),
        city: city.to_string(),
        province: province.to_string(),
        address: None,
        images: Vec::new(),
        surface: None,
        rooms: None,
        bathrooms: None,
        floor: None,
        energy_class: None,
        features: BTreeSet::new(),
    }
}

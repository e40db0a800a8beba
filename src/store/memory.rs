//! In-process reference store. One mutex guards every table, so compound
//! operations (approval transactions, cascading deletes, publication stamps)
//! apply as single units and conditional updates observe a consistent state.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::StoreError;
use crate::identity::UserId;
use crate::workflows::directory::{
    AccountPurge, AccountStatus, ContactUpdate, DirectoryRepository, UserProfile, UserRole,
};
use crate::workflows::favorites::{Favorite, FavoriteId, FavoriteRepository, SavedListing};
use crate::workflows::listings::{
    publication_window, Listing, ListingDraft, ListingFilters, ListingId, ListingPurge,
    ListingRepository, ListingStatus, StatusCounts,
};
use crate::workflows::roles::{
    RoleRequest, RoleRequestId, RoleRequestRepository, RoleRequestStatus,
};
use crate::workflows::settings::{SettingsRepository, SettingsUpdate, SiteSettings};

#[derive(Debug)]
struct Tables {
    users: HashMap<UserId, UserProfile>,
    listings: HashMap<ListingId, Listing>,
    requests: HashMap<RoleRequestId, RoleRequest>,
    favorites: HashMap<FavoriteId, Favorite>,
    settings: SiteSettings,
}

/// Reference store backing the integration tests and the demo binary. Every
/// repository trait is implemented against the same set of tables.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                users: HashMap::new(),
                listings: HashMap::new(),
                requests: HashMap::new(),
                favorites: HashMap::new(),
                settings: SiteSettings::seeded(Utc::now()),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl DirectoryRepository for MemoryStore {
    fn insert(&self, profile: UserProfile) -> Result<UserProfile, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.contains_key(&profile.id) {
            return Err(StoreError::Conflict("account already registered"));
        }
        tables.users.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    fn update_contact(
        &self,
        id: &UserId,
        update: &ContactUpdate,
        at: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError> {
        let mut tables = self.lock()?;
        let profile = tables
            .users
            .get_mut(id)
            .ok_or(StoreError::NotFound("account"))?;
        if let Some(full_name) = &update.full_name {
            profile.full_name = Some(full_name.clone());
        }
        if let Some(phone) = &update.phone {
            profile.phone = Some(phone.clone());
        }
        profile.updated_at = at;
        Ok(profile.clone())
    }

    fn set_role(
        &self,
        id: &UserId,
        role: UserRole,
        at: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError> {
        let mut tables = self.lock()?;
        let profile = tables
            .users
            .get_mut(id)
            .ok_or(StoreError::NotFound("account"))?;
        profile.role = role;
        profile.updated_at = at;
        Ok(profile.clone())
    }

    fn set_status(
        &self,
        id: &UserId,
        status: AccountStatus,
        at: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError> {
        let mut tables = self.lock()?;
        let profile = tables
            .users
            .get_mut(id)
            .ok_or(StoreError::NotFound("account"))?;
        profile.status = status;
        profile.updated_at = at;
        Ok(profile.clone())
    }

    fn delete_cascade(&self, id: &UserId) -> Result<AccountPurge, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.remove(id).is_none() {
            return Err(StoreError::NotFound("account"));
        }

        let owned: Vec<ListingId> = tables
            .listings
            .values()
            .filter(|listing| &listing.owner_id == id)
            .map(|listing| listing.id.clone())
            .collect();
        for listing_id in &owned {
            tables.listings.remove(listing_id);
        }

        let before = tables.favorites.len();
        tables.favorites.retain(|_, favorite| {
            &favorite.user_id != id && !owned.contains(&favorite.listing_id)
        });
        let favorites_removed = before - tables.favorites.len();

        let requests_before = tables.requests.len();
        tables.requests.retain(|_, request| &request.user_id != id);
        let requests_removed = requests_before - tables.requests.len();

        Ok(AccountPurge {
            listings_removed: owned.len(),
            favorites_removed,
            requests_removed,
        })
    }

    fn all(&self) -> Result<Vec<UserProfile>, StoreError> {
        let tables = self.lock()?;
        let mut profiles: Vec<UserProfile> = tables.users.values().cloned().collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(profiles)
    }
}

impl ListingRepository for MemoryStore {
    fn insert(&self, listing: Listing) -> Result<Listing, StoreError> {
        let mut tables = self.lock()?;
        if tables.listings.contains_key(&listing.id) {
            return Err(StoreError::Conflict("listing id already taken"));
        }
        tables.listings.insert(listing.id.clone(), listing.clone());
        Ok(listing)
    }

    fn fetch(&self, id: &ListingId) -> Result<Option<Listing>, StoreError> {
        Ok(self.lock()?.listings.get(id).cloned())
    }

    fn update_fields(
        &self,
        id: &ListingId,
        draft: &ListingDraft,
        at: DateTime<Utc>,
    ) -> Result<Listing, StoreError> {
        let mut tables = self.lock()?;
        let listing = tables
            .listings
            .get_mut(id)
            .ok_or(StoreError::NotFound("listing"))?;
        listing.title = draft.title.clone();
        listing.description = draft.description.clone();
        listing.listing_type = draft.listing_type;
        listing.category = draft.category;
        listing.price = draft.price;
        listing.location = draft.location.clone();
        listing.city = draft.city.clone();
        listing.province = draft.province.clone();
        listing.address = draft.address.clone();
        listing.images = draft.images.clone();
        listing.surface = draft.surface;
        listing.rooms = draft.rooms;
        listing.bathrooms = draft.bathrooms;
        listing.floor = draft.floor;
        listing.energy_class = draft.energy_class;
        listing.features = draft.features.clone();
        listing.updated_at = at;
        Ok(listing.clone())
    }

    fn transition(
        &self,
        id: &ListingId,
        from: &[ListingStatus],
        to: ListingStatus,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Listing, StoreError> {
        let mut tables = self.lock()?;
        let listing = tables
            .listings
            .get_mut(id)
            .ok_or(StoreError::NotFound("listing"))?;
        if !from.contains(&listing.status) {
            return Err(StoreError::Conflict("listing no longer in expected status"));
        }
        listing.status = to;
        listing.moderation_note = note;
        listing.updated_at = at;
        Ok(listing.clone())
    }

    fn publish(&self, id: &ListingId, at: DateTime<Utc>) -> Result<Listing, StoreError> {
        let mut tables = self.lock()?;
        let listing = tables
            .listings
            .get_mut(id)
            .ok_or(StoreError::NotFound("listing"))?;
        if listing.status != ListingStatus::InAttesa {
            return Err(StoreError::Conflict("listing no longer awaiting review"));
        }
        listing.status = ListingStatus::Pubblicato;
        listing.published_at = Some(at);
        listing.expires_at = Some(publication_window(at));
        listing.updated_at = at;
        Ok(listing.clone())
    }

    fn delete_cascade(&self, id: &ListingId) -> Result<ListingPurge, StoreError> {
        let mut tables = self.lock()?;
        if tables.listings.remove(id).is_none() {
            return Err(StoreError::NotFound("listing"));
        }
        let before = tables.favorites.len();
        tables
            .favorites
            .retain(|_, favorite| &favorite.listing_id != id);
        Ok(ListingPurge {
            favorites_removed: before - tables.favorites.len(),
        })
    }

    fn increment_views(&self, id: &ListingId) -> Result<u64, StoreError> {
        let mut tables = self.lock()?;
        let listing = tables
            .listings
            .get_mut(id)
            .ok_or(StoreError::NotFound("listing"))?;
        listing.views += 1;
        Ok(listing.views)
    }

    fn search(
        &self,
        filters: &ListingFilters,
        now: DateTime<Utc>,
    ) -> Result<Vec<Listing>, StoreError> {
        let tables = self.lock()?;
        let mut hits: Vec<Listing> = tables
            .listings
            .values()
            .filter(|listing| listing.publicly_visible(now) && filters.matches(listing))
            .cloned()
            .collect();
        hits.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(hits)
    }

    fn by_owner(&self, owner: &UserId) -> Result<Vec<Listing>, StoreError> {
        let tables = self.lock()?;
        let mut rows: Vec<Listing> = tables
            .listings
            .values()
            .filter(|listing| &listing.owner_id == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn by_status(&self, status: ListingStatus) -> Result<Vec<Listing>, StoreError> {
        let tables = self.lock()?;
        let mut rows: Vec<Listing> = tables
            .listings
            .values()
            .filter(|listing| listing.status == status)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    fn status_counts(&self) -> Result<StatusCounts, StoreError> {
        let tables = self.lock()?;
        let mut counts = StatusCounts::default();
        for listing in tables.listings.values() {
            counts.bump(listing.status);
        }
        Ok(counts)
    }

    fn expire_overdue(&self, as_of: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut tables = self.lock()?;
        let mut flipped = 0;
        for listing in tables.listings.values_mut() {
            let overdue = listing.status == ListingStatus::Pubblicato
                && listing
                    .expires_at
                    .map(|expiry| expiry <= as_of)
                    .unwrap_or(false);
            if overdue {
                listing.status = ListingStatus::Scaduto;
                listing.updated_at = as_of;
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}

impl RoleRequestRepository for MemoryStore {
    fn insert_pending(&self, request: RoleRequest) -> Result<RoleRequest, StoreError> {
        let mut tables = self.lock()?;
        if tables.requests.contains_key(&request.id) {
            return Err(StoreError::Conflict("role request id already taken"));
        }
        let already_pending = tables.requests.values().any(|existing| {
            existing.user_id == request.user_id && existing.status == RoleRequestStatus::InAttesa
        });
        if already_pending {
            return Err(StoreError::Conflict("a pending role request already exists"));
        }
        tables.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn fetch(&self, id: &RoleRequestId) -> Result<Option<RoleRequest>, StoreError> {
        Ok(self.lock()?.requests.get(id).cloned())
    }

    fn approve_transaction(
        &self,
        id: &RoleRequestId,
        reviewer: &UserId,
        at: DateTime<Utc>,
    ) -> Result<RoleRequest, StoreError> {
        let mut tables = self.lock()?;
        let tables = &mut *tables;
        let request = tables
            .requests
            .get_mut(id)
            .ok_or(StoreError::NotFound("role request"))?;
        if request.status != RoleRequestStatus::InAttesa {
            return Err(StoreError::Conflict("role request already reviewed"));
        }
        let applicant = tables
            .users
            .get_mut(&request.user_id)
            .ok_or(StoreError::NotFound("account"))?;
        applicant.role = request.requested_role;
        applicant.updated_at = at;
        request.status = RoleRequestStatus::Approvato;
        request.reviewed_by = Some(reviewer.clone());
        request.reviewed_at = Some(at);
        request.updated_at = at;
        Ok(request.clone())
    }

    fn reject_pending(
        &self,
        id: &RoleRequestId,
        reviewer: &UserId,
        notes: &str,
        at: DateTime<Utc>,
    ) -> Result<RoleRequest, StoreError> {
        let mut tables = self.lock()?;
        let request = tables
            .requests
            .get_mut(id)
            .ok_or(StoreError::NotFound("role request"))?;
        if request.status != RoleRequestStatus::InAttesa {
            return Err(StoreError::Conflict("role request already reviewed"));
        }
        request.status = RoleRequestStatus::Rifiutato;
        request.admin_notes = Some(notes.to_string());
        request.reviewed_by = Some(reviewer.clone());
        request.reviewed_at = Some(at);
        request.updated_at = at;
        Ok(request.clone())
    }

    fn set_notes(
        &self,
        id: &RoleRequestId,
        notes: &str,
        at: DateTime<Utc>,
    ) -> Result<RoleRequest, StoreError> {
        let mut tables = self.lock()?;
        let request = tables
            .requests
            .get_mut(id)
            .ok_or(StoreError::NotFound("role request"))?;
        request.admin_notes = Some(notes.to_string());
        request.updated_at = at;
        Ok(request.clone())
    }

    fn delete(&self, id: &RoleRequestId) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        tables
            .requests
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("role request"))
    }

    fn pending(&self) -> Result<Vec<RoleRequest>, StoreError> {
        let tables = self.lock()?;
        let mut rows: Vec<RoleRequest> = tables
            .requests
            .values()
            .filter(|request| request.status == RoleRequestStatus::InAttesa)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    fn latest_for_user(&self, user: &UserId) -> Result<Option<RoleRequest>, StoreError> {
        let tables = self.lock()?;
        let latest = tables
            .requests
            .values()
            .filter(|request| &request.user_id == user)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned();
        Ok(latest)
    }
}

impl FavoriteRepository for MemoryStore {
    fn toggle(&self, candidate: Favorite) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        if !tables.listings.contains_key(&candidate.listing_id) {
            return Err(StoreError::NotFound("listing"));
        }
        let existing = tables
            .favorites
            .values()
            .find(|favorite| {
                favorite.user_id == candidate.user_id
                    && favorite.listing_id == candidate.listing_id
            })
            .map(|favorite| favorite.id.clone());
        match existing {
            Some(id) => {
                tables.favorites.remove(&id);
                Ok(false)
            }
            None => {
                tables.favorites.insert(candidate.id.clone(), candidate);
                Ok(true)
            }
        }
    }

    fn fetch(&self, id: &FavoriteId) -> Result<Option<Favorite>, StoreError> {
        Ok(self.lock()?.favorites.get(id).cloned())
    }

    fn delete(&self, id: &FavoriteId) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        tables
            .favorites
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("favorite"))
    }

    fn saved_for_user(&self, user: &UserId) -> Result<Vec<SavedListing>, StoreError> {
        let tables = self.lock()?;
        let mut rows: Vec<Favorite> = tables
            .favorites
            .values()
            .filter(|favorite| &favorite.user_id == user)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .map(|favorite| {
                let listing = tables.listings.get(&favorite.listing_id).cloned();
                SavedListing { favorite, listing }
            })
            .collect())
    }
}

impl SettingsRepository for MemoryStore {
    fn load(&self) -> Result<SiteSettings, StoreError> {
        Ok(self.lock()?.settings.clone())
    }

    fn apply(
        &self,
        update: &SettingsUpdate,
        at: DateTime<Utc>,
    ) -> Result<SiteSettings, StoreError> {
        let mut tables = self.lock()?;
        let settings = &mut tables.settings;
        if let Some(site_name) = &update.site_name {
            settings.site_name = site_name.clone();
        }
        if let Some(site_description) = &update.site_description {
            settings.site_description = site_description.clone();
        }
        if let Some(logo_url) = &update.logo_url {
            settings.logo_url = Some(logo_url.clone());
        }
        if let Some(primary_color) = &update.primary_color {
            settings.primary_color = primary_color.clone();
        }
        if let Some(secondary_color) = &update.secondary_color {
            settings.secondary_color = secondary_color.clone();
        }
        if let Some(contact_email) = &update.contact_email {
            settings.contact_email = contact_email.clone();
        }
        if let Some(contact_phone) = &update.contact_phone {
            settings.contact_phone = Some(contact_phone.clone());
        }
        if let Some(facebook_url) = &update.facebook_url {
            settings.facebook_url = Some(facebook_url.clone());
        }
        if let Some(instagram_url) = &update.instagram_url {
            settings.instagram_url = Some(instagram_url.clone());
        }
        settings.updated_at = at;
        Ok(settings.clone())
    }
}

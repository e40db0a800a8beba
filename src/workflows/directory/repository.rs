use chrono::{DateTime, Utc};

use super::domain::{AccountStatus, ContactUpdate, UserProfile, UserRole};
use crate::identity::UserId;
use crate::store::StoreError;

/// What an account deletion swept away alongside the profile itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountPurge {
    pub listings_removed: usize,
    pub favorites_removed: usize,
    pub requests_removed: usize,
}

/// Storage abstraction for the account directory. `delete_cascade` removes
/// the profile together with its listings, favorites, and role requests in
/// one atomic application.
pub trait DirectoryRepository: Send + Sync {
    fn insert(&self, profile: UserProfile) -> Result<UserProfile, StoreError>;
    fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError>;
    fn update_contact(
        &self,
        id: &UserId,
        update: &ContactUpdate,
        at: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError>;
    fn set_role(
        &self,
        id: &UserId,
        role: UserRole,
        at: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError>;
    fn set_status(
        &self,
        id: &UserId,
        status: AccountStatus,
        at: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError>;
    fn delete_cascade(&self, id: &UserId) -> Result<AccountPurge, StoreError>;
    /// All accounts, newest first.
    fn all(&self) -> Result<Vec<UserProfile>, StoreError>;
}

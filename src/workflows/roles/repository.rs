use chrono::{DateTime, Utc};

use super::domain::{RoleRequest, RoleRequestId};
use crate::identity::UserId;
use crate::store::StoreError;

/// Storage abstraction for role-upgrade requests. The two review verbs are
/// conditional on the request still being `in_attesa`, and approval also
/// flips the target user's role in the same application; a store must never
/// let the two effects come apart.
pub trait RoleRequestRepository: Send + Sync {
    /// Insert a new pending request, enforcing at most one pending request
    /// per user (`Conflict` otherwise).
    fn insert_pending(&self, request: RoleRequest) -> Result<RoleRequest, StoreError>;
    fn fetch(&self, id: &RoleRequestId) -> Result<Option<RoleRequest>, StoreError>;
    /// Conditional approval: request to `approvato` with the reviewer stamp
    /// AND the user's role to `inserzionista`, atomically. `Conflict` when
    /// the request is no longer pending.
    fn approve_transaction(
        &self,
        id: &RoleRequestId,
        reviewer: &UserId,
        at: DateTime<Utc>,
    ) -> Result<RoleRequest, StoreError>;
    /// Conditional rejection with the reviewer stamp and mandatory notes.
    fn reject_pending(
        &self,
        id: &RoleRequestId,
        reviewer: &UserId,
        notes: &str,
        at: DateTime<Utc>,
    ) -> Result<RoleRequest, StoreError>;
    /// Overwrite the admin notes in any status; the status is untouched.
    fn set_notes(
        &self,
        id: &RoleRequestId,
        notes: &str,
        at: DateTime<Utc>,
    ) -> Result<RoleRequest, StoreError>;
    fn delete(&self, id: &RoleRequestId) -> Result<(), StoreError>;
    /// Requests awaiting review, oldest first.
    fn pending(&self) -> Result<Vec<RoleRequest>, StoreError>;
    /// The user's most recent request, if any.
    fn latest_for_user(&self, user: &UserId) -> Result<Option<RoleRequest>, StoreError>;
}

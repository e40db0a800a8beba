use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{validate_reason, RoleRequest, RoleRequestId, RoleRequestStatus};
use super::repository::RoleRequestRepository;
use crate::identity::CurrentUser;
use crate::workflows::directory::{DirectoryRepository, UserRole};
use crate::workflows::error::{ValidationError, WorkflowError};
use crate::workflows::guard::AccessGuard;

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RoleRequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RoleRequestId(format!("req-{id:06}"))
}

/// Service owning the advertiser-upgrade workflow: users apply, admins
/// review, and an approval changes the account role in the same breath.
pub struct RoleRequestService<R, D> {
    requests: Arc<R>,
    guard: AccessGuard<D>,
}

impl<R, D> RoleRequestService<R, D>
where
    R: RoleRequestRepository,
    D: DirectoryRepository,
{
    pub fn new(requests: Arc<R>, directory: Arc<D>) -> Self {
        let guard = AccessGuard::new(directory);
        Self { requests, guard }
    }

    /// Apply for the advertiser role. Only plain accounts may apply, the
    /// motivation must be substantial, and one pending request per user is
    /// the ceiling.
    pub fn submit(
        &self,
        identity: Option<&CurrentUser>,
        reason: String,
    ) -> Result<RoleRequest, WorkflowError> {
        let caller = self.guard.resolve_active(identity)?;
        if caller.role != UserRole::Utente {
            return Err(WorkflowError::Forbidden(
                "only plain accounts may request the advertiser role",
            ));
        }
        validate_reason(&reason)?;

        let now = Utc::now();
        let request = RoleRequest {
            id: next_request_id(),
            user_id: caller.id,
            requested_role: UserRole::Inserzionista,
            status: RoleRequestStatus::InAttesa,
            reason: reason.trim().to_string(),
            admin_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        let stored = self.requests.insert_pending(request)?;
        Ok(stored)
    }

    /// Approve a pending request. The request record and the user's role
    /// change together; a second racing approval receives `Conflict`.
    pub fn approve(
        &self,
        identity: Option<&CurrentUser>,
        id: &RoleRequestId,
    ) -> Result<RoleRequest, WorkflowError> {
        let admin = self.guard.require_admin(identity)?;
        let approved = self.requests.approve_transaction(id, &admin.id, Utc::now())?;
        Ok(approved)
    }

    /// Reject a pending request. The rationale is mandatory here: the
    /// rejected user gets to read it.
    pub fn reject(
        &self,
        identity: Option<&CurrentUser>,
        id: &RoleRequestId,
        notes: String,
    ) -> Result<RoleRequest, WorkflowError> {
        let admin = self.guard.require_admin(identity)?;
        if notes.trim().is_empty() {
            return Err(ValidationError::EmptyReviewNotes.into());
        }
        let rejected = self
            .requests
            .reject_pending(id, &admin.id, notes.trim(), Utc::now())?;
        Ok(rejected)
    }

    /// Amend the admin notes on a request in any status.
    pub fn edit_notes(
        &self,
        identity: Option<&CurrentUser>,
        id: &RoleRequestId,
        notes: String,
    ) -> Result<RoleRequest, WorkflowError> {
        self.guard.require_admin(identity)?;
        let updated = self.requests.set_notes(id, notes.trim(), Utc::now())?;
        Ok(updated)
    }

    /// Remove a request outright, whatever its status.
    pub fn delete(
        &self,
        identity: Option<&CurrentUser>,
        id: &RoleRequestId,
    ) -> Result<(), WorkflowError> {
        self.guard.require_admin(identity)?;
        self.requests.delete(id)?;
        Ok(())
    }

    /// Requests awaiting review, oldest first.
    pub fn pending_queue(
        &self,
        identity: Option<&CurrentUser>,
    ) -> Result<Vec<RoleRequest>, WorkflowError> {
        self.guard.require_admin(identity)?;
        let queue = self.requests.pending()?;
        Ok(queue)
    }

    /// The caller's most recent request, for the "request advertiser" panel.
    pub fn own_request(
        &self,
        identity: Option<&CurrentUser>,
    ) -> Result<Option<RoleRequest>, WorkflowError> {
        let caller = self.guard.resolve(identity)?;
        let latest = self.requests.latest_for_user(&caller.id)?;
        Ok(latest)
    }
}

use std::sync::Arc;

use chrono::Utc;

use super::domain::{AccountStatus, ContactUpdate, UserProfile, UserRole};
use super::repository::{AccountPurge, DirectoryRepository};
use crate::identity::{CurrentUser, UserId};
use crate::workflows::error::WorkflowError;
use crate::workflows::guard::AccessGuard;

/// Service owning account registration, self-service edits, and the admin
/// role/status controls.
pub struct DirectoryService<D> {
    directory: Arc<D>,
    guard: AccessGuard<D>,
}

impl<D> DirectoryService<D>
where
    D: DirectoryRepository,
{
    pub fn new(directory: Arc<D>) -> Self {
        let guard = AccessGuard::new(directory.clone());
        Self { directory, guard }
    }

    /// Mirror the external identity into the directory on first sign-up.
    /// New accounts start as plain active users.
    pub fn register(
        &self,
        identity: Option<&CurrentUser>,
        full_name: Option<String>,
    ) -> Result<UserProfile, WorkflowError> {
        let identity = identity.ok_or(WorkflowError::Unauthenticated)?;
        let now = Utc::now();
        let profile = UserProfile {
            id: identity.id.clone(),
            email: identity.email.clone(),
            full_name: full_name.filter(|name| !name.trim().is_empty()),
            phone: None,
            role: UserRole::Utente,
            status: AccountStatus::Attivo,
            created_at: now,
            updated_at: now,
        };
        let stored = self.directory.insert(profile)?;
        Ok(stored)
    }

    pub fn profile(&self, identity: Option<&CurrentUser>) -> Result<UserProfile, WorkflowError> {
        self.guard.resolve(identity)
    }

    /// Contact-detail edit on the caller's own record. Role and status are
    /// not reachable from here.
    pub fn update_own_profile(
        &self,
        identity: Option<&CurrentUser>,
        update: ContactUpdate,
    ) -> Result<UserProfile, WorkflowError> {
        let profile = self.guard.resolve_active(identity)?;
        let updated = self
            .directory
            .update_contact(&profile.id, &update, Utc::now())?;
        Ok(updated)
    }

    pub fn set_role(
        &self,
        identity: Option<&CurrentUser>,
        target: &UserId,
        role: UserRole,
    ) -> Result<UserProfile, WorkflowError> {
        let admin = self.guard.require_admin(identity)?;
        if &admin.id == target {
            return Err(WorkflowError::Forbidden("cannot change own role"));
        }
        let current = self
            .directory
            .fetch(target)?
            .ok_or(WorkflowError::NotFound("profile"))?;
        if current.role == role {
            return Ok(current);
        }
        let updated = self.directory.set_role(target, role, Utc::now())?;
        Ok(updated)
    }

    pub fn set_status(
        &self,
        identity: Option<&CurrentUser>,
        target: &UserId,
        status: AccountStatus,
    ) -> Result<UserProfile, WorkflowError> {
        let admin = self.guard.require_admin(identity)?;
        if &admin.id == target {
            return Err(WorkflowError::Forbidden("cannot change own status"));
        }
        let current = self
            .directory
            .fetch(target)?
            .ok_or(WorkflowError::NotFound("profile"))?;
        if current.status == status {
            return Ok(current);
        }
        let updated = self.directory.set_status(target, status, Utc::now())?;
        Ok(updated)
    }

    /// Drop an advertiser back to a plain account. Only legal when the
    /// target currently holds the advertiser role; admins are never touched.
    pub fn degrade(
        &self,
        identity: Option<&CurrentUser>,
        target: &UserId,
    ) -> Result<UserProfile, WorkflowError> {
        self.guard.require_admin(identity)?;
        let current = self
            .directory
            .fetch(target)?
            .ok_or(WorkflowError::NotFound("profile"))?;
        if current.role != UserRole::Inserzionista {
            return Err(WorkflowError::Conflict("account is not an advertiser"));
        }
        let updated = self
            .directory
            .set_role(target, UserRole::Utente, Utc::now())?;
        Ok(updated)
    }

    /// Hard delete of an account and everything hanging off it, applied as
    /// one atomic store operation.
    pub fn delete_account(
        &self,
        identity: Option<&CurrentUser>,
        target: &UserId,
    ) -> Result<AccountPurge, WorkflowError> {
        let admin = self.guard.require_admin(identity)?;
        if &admin.id == target {
            return Err(WorkflowError::Forbidden("cannot delete own account"));
        }
        let purge = self.directory.delete_cascade(target)?;
        Ok(purge)
    }

    /// Full account roster for the admin console, newest first.
    pub fn roster(&self, identity: Option<&CurrentUser>) -> Result<Vec<UserProfile>, WorkflowError> {
        self.guard.require_admin(identity)?;
        let profiles = self.directory.all()?;
        Ok(profiles)
    }
}

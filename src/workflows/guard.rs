use std::sync::Arc;

use crate::identity::{CurrentUser, UserId};
use crate::workflows::directory::{AccountStatus, DirectoryRepository, UserProfile, UserRole};
use crate::workflows::error::WorkflowError;

/// Resolves the calling identity against the account directory and answers
/// the role and ownership questions every workflow asks. All authorization
/// decisions go through here.
pub struct AccessGuard<D> {
    directory: Arc<D>,
}

impl<D> Clone for AccessGuard<D> {
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
        }
    }
}

impl<D> AccessGuard<D>
where
    D: DirectoryRepository,
{
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// The caller's profile, regardless of account status. Read paths use
    /// this; suspended accounts keep read access.
    pub fn resolve(&self, identity: Option<&CurrentUser>) -> Result<UserProfile, WorkflowError> {
        let identity = identity.ok_or(WorkflowError::Unauthenticated)?;
        self.directory
            .fetch(&identity.id)?
            .ok_or(WorkflowError::NotFound("profile"))
    }

    /// The caller's profile, refusing suspended accounts. Every mutating
    /// operation resolves through this.
    pub fn resolve_active(
        &self,
        identity: Option<&CurrentUser>,
    ) -> Result<UserProfile, WorkflowError> {
        let profile = self.resolve(identity)?;
        if profile.status == AccountStatus::Sospeso {
            return Err(WorkflowError::Forbidden("account suspended"));
        }
        Ok(profile)
    }

    pub fn require_admin(
        &self,
        identity: Option<&CurrentUser>,
    ) -> Result<UserProfile, WorkflowError> {
        let profile = self.resolve_active(identity)?;
        if profile.role != UserRole::Admin {
            return Err(WorkflowError::Forbidden("admin role required"));
        }
        Ok(profile)
    }

    /// Advertisers and admins pass; plain accounts do not.
    pub fn require_advertiser(
        &self,
        identity: Option<&CurrentUser>,
    ) -> Result<UserProfile, WorkflowError> {
        let profile = self.resolve_active(identity)?;
        match profile.role {
            UserRole::Inserzionista | UserRole::Admin => Ok(profile),
            UserRole::Utente => Err(WorkflowError::Forbidden("advertiser role required")),
        }
    }

    /// Owners act on their own records; admins act on anyone's.
    pub fn ensure_owner_or_admin(
        profile: &UserProfile,
        owner: &UserId,
    ) -> Result<(), WorkflowError> {
        if profile.role == UserRole::Admin || &profile.id == owner {
            Ok(())
        } else {
            Err(WorkflowError::Forbidden("not the owner of this record"))
        }
    }
}

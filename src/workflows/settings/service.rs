use std::sync::Arc;

use chrono::Utc;

use super::domain::{SettingsUpdate, SiteSettings};
use super::repository::SettingsRepository;
use crate::identity::CurrentUser;
use crate::workflows::directory::DirectoryRepository;
use crate::workflows::error::WorkflowError;
use crate::workflows::guard::AccessGuard;

/// Service owning the site configuration singleton.
pub struct SettingsService<S, D> {
    settings: Arc<S>,
    guard: AccessGuard<D>,
}

impl<S, D> SettingsService<S, D>
where
    S: SettingsRepository,
    D: DirectoryRepository,
{
    pub fn new(settings: Arc<S>, directory: Arc<D>) -> Self {
        let guard = AccessGuard::new(directory);
        Self { settings, guard }
    }

    /// Public read; the storefront needs this before anyone signs in.
    pub fn site(&self) -> Result<SiteSettings, WorkflowError> {
        let settings = self.settings.load()?;
        Ok(settings)
    }

    /// Admin-only partial update.
    pub fn update(
        &self,
        identity: Option<&CurrentUser>,
        update: SettingsUpdate,
    ) -> Result<SiteSettings, WorkflowError> {
        self.guard.require_admin(identity)?;
        update.validate()?;
        let updated = self.settings.apply(&update, Utc::now())?;
        Ok(updated)
    }
}

use chrono::{DateTime, Utc};

use super::domain::{SettingsUpdate, SiteSettings};
use crate::store::StoreError;

/// Storage abstraction for the singleton settings row.
pub trait SettingsRepository: Send + Sync {
    fn load(&self) -> Result<SiteSettings, StoreError>;
    /// Apply the partial update and return the resulting row.
    fn apply(&self, update: &SettingsUpdate, at: DateTime<Utc>)
        -> Result<SiteSettings, StoreError>;
}

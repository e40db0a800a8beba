use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::error::ValidationError;

/// The singleton site configuration row. Publicly readable, admin-written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_description: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteSettings {
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self {
            site_name: "CasaMercato".to_string(),
            site_description: "Annunci immobiliari con moderazione".to_string(),
            logo_url: None,
            primary_color: "#1d4ed8".to_string(),
            secondary_color: "#f59e0b".to_string(),
            contact_email: "info@casamercato.local".to_string(),
            contact_phone: None,
            facebook_url: None,
            instagram_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update applied by an admin; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
}

impl SettingsUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.site_name {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptySiteName);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_site_name_is_rejected() {
        let update = SettingsUpdate {
            site_name: Some("   ".to_string()),
            ..SettingsUpdate::default()
        };
        assert_eq!(update.validate(), Err(ValidationError::EmptySiteName));
    }

    #[test]
    fn absent_fields_are_fine() {
        assert!(SettingsUpdate::default().validate().is_ok());
    }
}

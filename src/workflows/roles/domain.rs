use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;
use crate::workflows::directory::UserRole;
use crate::workflows::error::ValidationError;

/// Minimum length of the motivation a user writes when applying for the
/// advertiser role.
pub const MIN_REASON_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleRequestId(pub String);

impl fmt::Display for RoleRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoleRequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Review state of an upgrade request. Approval and rejection are terminal
/// for re-review; admins may still edit notes or delete the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleRequestStatus {
    InAttesa,
    Approvato,
    Rifiutato,
}

impl RoleRequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RoleRequestStatus::InAttesa => "In attesa",
            RoleRequestStatus::Approvato => "Approvato",
            RoleRequestStatus::Rifiutato => "Rifiutato",
        }
    }
}

/// A user's application to become an advertiser. `requested_role` is fixed
/// to `inserzionista`; the field exists so the record reads the same as any
/// future upgrade path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRequest {
    pub id: RoleRequestId,
    pub user_id: UserId,
    pub requested_role: UserRole,
    pub status: RoleRequestStatus,
    pub reason: String,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The motivation must carry enough substance for a reviewer to judge.
pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    let found = reason.trim().chars().count();
    if found < MIN_REASON_CHARS {
        return Err(ValidationError::ReasonTooShort {
            min: MIN_REASON_CHARS,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reason_is_rejected() {
        assert_eq!(
            validate_reason("troppo breve"),
            Err(ValidationError::ReasonTooShort { min: 20, found: 12 })
        );
    }

    #[test]
    fn twenty_characters_pass() {
        assert!(validate_reason("Voglio vendere il mio immobile di famiglia").is_ok());
    }

    #[test]
    fn surrounding_whitespace_does_not_count() {
        assert!(validate_reason("   dodici car.   ").is_err());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// Role ladder for marketplace accounts. Plain accounts browse and save,
/// advertisers publish, admins moderate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Utente,
    Inserzionista,
    Admin,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            UserRole::Utente => "Utente",
            UserRole::Inserzionista => "Inserzionista",
            UserRole::Admin => "Amministratore",
        }
    }
}

/// Account standing. Suspended accounts keep read access but every mutating
/// operation refuses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Attivo,
    Sospeso,
    InAttesa,
}

impl AccountStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AccountStatus::Attivo => "Attivo",
            AccountStatus::Sospeso => "Sospeso",
            AccountStatus::InAttesa => "In attesa",
        }
    }
}

/// Directory record for one account. `id` and `email` mirror the external
/// identity provider; everything else is owned here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Self-service profile edit. `None` leaves the field untouched; role and
/// status are deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

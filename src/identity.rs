use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier minted by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The authenticated caller as asserted by the identity provider. Workflow
/// operations receive `Option<CurrentUser>`; `None` is an anonymous caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId(id.into()),
            email: email.into(),
        }
    }
}

/// Reads the identity asserted upstream. The service itself never verifies
/// credentials; a gateway in front of it owns authentication.
pub fn current_user_from_headers(headers: &HeaderMap) -> Option<CurrentUser> {
    let id = headers.get("x-user-id")?.to_str().ok()?.trim();
    if id.is_empty() {
        return None;
    }
    let email = headers
        .get("x-user-email")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .trim()
        .to_string();

    Some(CurrentUser {
        id: UserId(id.to_string()),
        email,
    })
}

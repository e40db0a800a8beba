use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;
use crate::workflows::listings::{Listing, ListingId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FavoriteId(pub String);

impl fmt::Display for FavoriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FavoriteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One saved listing. The `(user_id, listing_id)` pair is unique; toggling
/// the same listing twice lands back where it started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub listing_id: ListingId,
    pub created_at: DateTime<Utc>,
}

/// A favorite joined with its listing for display. `listing` is `None` when
/// the listing has since disappeared; the row still renders as "no longer
/// available" instead of erroring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedListing {
    pub favorite: Favorite,
    pub listing: Option<Listing>,
}

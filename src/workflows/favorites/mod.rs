//! Favorites ledger: a unique `(user, listing)` bookmark pair with an
//! idempotent toggle and dangling-tolerant reads.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{Favorite, FavoriteId, SavedListing};
pub use repository::FavoriteRepository;
pub use router::favorite_router;
pub use service::FavoriteService;

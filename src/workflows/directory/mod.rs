//! Account directory: the marketplace-side mirror of externally
//! authenticated identities, plus the admin controls over roles and
//! account standing.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{AccountStatus, ContactUpdate, UserProfile, UserRole};
pub use repository::{AccountPurge, DirectoryRepository};
pub use router::directory_router;
pub use service::DirectoryService;

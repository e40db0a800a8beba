//! Advertiser-upgrade request workflow. Approving a request and granting
//! the advertiser role are one transaction; they are never observed apart.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    validate_reason, RoleRequest, RoleRequestId, RoleRequestStatus, MIN_REASON_CHARS,
};
pub use repository::RoleRequestRepository;
pub use router::role_request_router;
pub use service::RoleRequestService;

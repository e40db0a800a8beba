//! Listing store and moderation workflow: drafts move through an admin
//! review queue before reaching the public catalogue, publications carry a
//! fixed expiry window, and rejected or expired listings re-enter review
//! through owner resubmission.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    is_known_province, publication_window, EnergyClass, Feature, Listing, ListingCategory,
    ListingDraft, ListingFilters, ListingId, ListingStatus, ListingType, StatusCounts,
    SubmissionMode, MAX_IMAGES, PROVINCES, PUBLICATION_WINDOW_DAYS,
};
pub use repository::{ListingPurge, ListingRepository};
pub use router::listing_router;
pub use service::{demo_draft, ListingService};

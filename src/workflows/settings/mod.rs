//! Site configuration singleton.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{SettingsUpdate, SiteSettings};
pub use repository::SettingsRepository;
pub use router::settings_router;
pub use service::SettingsService;

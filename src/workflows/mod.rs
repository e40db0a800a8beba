pub mod directory;
pub mod error;
pub mod favorites;
pub mod guard;
pub mod listings;
pub mod roles;
pub mod settings;

pub use error::{ValidationError, WorkflowError};
pub use guard::AccessGuard;

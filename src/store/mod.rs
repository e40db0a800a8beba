pub mod memory;

pub use memory::MemoryStore;

/// Failures surfaced by a backing store. Conditional updates report
/// `Conflict` when the expected state no longer holds.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store conflict: {0}")]
    Conflict(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

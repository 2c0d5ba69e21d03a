use thiserror::Error;

use super::task::TaskId;

/// Store operation failures. `Validation` and `NotFound` surface to the
/// caller synchronously and leave the store untouched; persistence trouble is
/// swallowed at the call site so in-memory state stays authoritative.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("persistence failed: {0}")]
    Persistence(String),
}

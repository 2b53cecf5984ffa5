use burrow_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedirectorError>;

/// Errors that prevent a redirect from being resolved.
///
/// Failing to record the click is not one of them: the redirect still
/// succeeds and the failure is only logged.
#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

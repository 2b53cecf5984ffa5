use burrow_core::{CoreError, MappingId, StorageError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Debug, Clone, Error)]
pub enum AnalyticsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The mapping does not exist or is not visible to the caller.
    #[error("mapping not found: {0}")]
    MappingNotFound(String),
    /// A click referenced a mapping that was deleted in the meantime.
    #[error("unknown mapping: {0}")]
    UnknownMapping(MappingId),
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for AnalyticsError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::UnknownMapping(id) => Self::UnknownMapping(id),
            other => Self::Storage(other),
        }
    }
}

impl From<CoreError> for AnalyticsError {
    fn from(value: CoreError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

use crate::model::MappingId;
use thiserror::Error;

/// Validation errors raised while constructing core domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("invalid owner id: {0}")]
    InvalidOwner(String),
    #[error("invalid time range: {0}")]
    InvalidRange(String),
}

/// Errors returned by storage backends.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// A uniqueness constraint rejected the write (short code already taken).
    #[error("short code already exists: {0}")]
    Conflict(String),
    /// A click referenced a mapping that does not exist (anymore).
    #[error("unknown mapping: {0}")]
    UnknownMapping(MappingId),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Errors surfaced by the [`Shortener`](crate::shortener::Shortener) contract.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Every allocation attempt collided with an existing short code.
    #[error("short code allocation exhausted after {attempts} attempts")]
    AllocationExhausted { attempts: usize },
    #[error("short code generation unavailable: {0}")]
    GenerationUnavailable(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

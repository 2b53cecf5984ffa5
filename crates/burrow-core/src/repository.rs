use crate::error::StorageError;
use crate::model::{ClickEvent, Mapping, MappingId, NewMapping};
use crate::owner::OwnerId;
use crate::range::TimeRange;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-only view of the mapping table.
///
/// The redirect hot path and the analytics scope checks only need this half,
/// so they take it instead of the full [`MappingRepository`].
#[async_trait]
pub trait ReadMappingRepository: Send + Sync + 'static {
    /// Exact-match lookup by short code.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>>;

    async fn find_by_id(&self, id: MappingId) -> Result<Option<Mapping>>;

    /// All mappings owned by `owner`, in no particular order.
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Mapping>>;
}

#[async_trait]
pub trait MappingRepository: ReadMappingRepository {
    /// Persists a new mapping and returns it with its store-assigned id.
    ///
    /// Short-code uniqueness is enforced atomically by the store: a taken code
    /// yields `Err(StorageError::Conflict)` and nothing is written.
    async fn insert(&self, mapping: NewMapping) -> Result<Mapping>;

    /// Atomically adds one to the mapping's click counter.
    ///
    /// Returns `Err(StorageError::NotFound)` if the mapping does not exist.
    async fn increment_click_count(&self, id: MappingId) -> Result<()>;

    /// Deletes a mapping together with its click events.
    /// Returns `true` if the mapping existed and was removed.
    async fn delete(&self, id: MappingId) -> Result<bool>;
}

/// The append-only click event log.
#[async_trait]
pub trait ClickRepository: Send + Sync + 'static {
    /// Appends one click event and increments the mapping's click counter in
    /// the same atomic storage operation.
    ///
    /// Returns `Err(StorageError::UnknownMapping)` if the mapping does not
    /// exist; in that case neither write is applied.
    async fn insert_click(&self, mapping_id: MappingId, clicked_at: Timestamp)
        -> Result<ClickEvent>;

    /// Timestamps of the mapping's clicks that fall inside `range`.
    async fn click_times(&self, mapping_id: MappingId, range: TimeRange) -> Result<Vec<Timestamp>>;

    /// Timestamps of clicks inside `range` across every mapping owned by `owner`.
    async fn owner_click_times(&self, owner: &OwnerId, range: TimeRange)
        -> Result<Vec<Timestamp>>;

    /// Total number of click events stored for the mapping.
    async fn count_clicks(&self, mapping_id: MappingId) -> Result<u64>;
}

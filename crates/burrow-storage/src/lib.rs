//! Storage backends for mappings and click events.

pub mod memory;
pub mod mysql;

pub use burrow_core::repository::{
    ClickRepository, MappingRepository, ReadMappingRepository, Result,
};
pub use burrow_core::StorageError;
pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

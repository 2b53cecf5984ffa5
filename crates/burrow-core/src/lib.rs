//! Core types and traits for the Burrow URL shortener.
//!
//! This crate provides the domain model (mappings, click events, short codes),
//! the storage contracts and the error taxonomy shared by the shortener,
//! analytics and redirector services.

pub mod clock;
pub mod error;
pub mod model;
pub mod owner;
pub mod range;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, ShortenerError, StorageError};
pub use model::{ClickEvent, ClickId, DailyClicks, Mapping, MappingId, NewMapping};
pub use owner::OwnerId;
pub use range::{utc_date, TimeRange};
pub use repository::{ClickRepository, MappingRepository, ReadMappingRepository};
pub use shortcode::ShortCode;
pub use shortener::{ShortenParams, Shortener};

//! URL shortener service implementation.
//!
//! This crate owns short-code allocation: it validates the target URL, asks a
//! [`Generator`](burrow_generator::Generator) for candidates and lets the
//! store's uniqueness constraint decide, retrying a bounded number of times.
//! Core types are re-exported from `burrow_core`.

pub mod service;

pub use burrow_core::{ShortenParams, Shortener, ShortenerError};
pub use service::{ShortenerService, ShortenerSettings, DEFAULT_MAX_ATTEMPTS};

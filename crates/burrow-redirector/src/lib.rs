//! Redirect resolution.
//!
//! [`RedirectorService`] looks a short code up, records the click (counter
//! and event log in one storage operation) and hands the original URL back to
//! the transport layer, which turns it into a redirect response.

pub mod error;
pub mod redirector;
pub mod service;

pub use error::{RedirectorError, Result};
pub use redirector::Redirector;
pub use service::RedirectorService;

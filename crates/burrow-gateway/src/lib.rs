//! HTTP surface of the URL shortener.
//!
//! [`App::router`] wires the shortener, redirector and analytics services
//! (held in [`AppState`]) to axum routes. The `gateway` binary builds the
//! state from command-line configuration and serves the router.

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use error::{AppError, Result};
pub use state::AppState;

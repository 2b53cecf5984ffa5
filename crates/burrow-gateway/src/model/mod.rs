mod analytics;
mod health;
mod url;

pub use analytics::*;
pub use health::*;
pub use url::*;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

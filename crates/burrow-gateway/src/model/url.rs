use burrow_core::Mapping;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CreateUrlRequest {
    pub original_url: String,
}

#[derive(Serialize)]
pub struct CreateUrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
}

/// One row of an owner's mapping list.
#[derive(Serialize)]
pub struct UrlSummary {
    pub id: u64,
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub click_count: u64,
    pub created_at: Timestamp,
}

impl UrlSummary {
    pub fn new(mapping: Mapping, short_url: String) -> Self {
        Self {
            id: mapping.id.get(),
            short_code: mapping.code.as_str().to_string(),
            short_url,
            original_url: mapping.original_url,
            click_count: mapping.click_count,
            created_at: mapping.created_at,
        }
    }
}

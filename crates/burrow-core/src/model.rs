use crate::owner::OwnerId;
use crate::shortcode::ShortCode;
use jiff::civil::Date;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Store-assigned identifier of a [`Mapping`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingId(u64);

impl MappingId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for MappingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of a [`ClickEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClickId(u64);

impl ClickId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for ClickId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A durable binding from a short code to an original URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub id: MappingId,
    pub code: ShortCode,
    pub original_url: String,
    pub owner: OwnerId,
    pub created_at: Timestamp,
    /// Number of click events recorded against this mapping.
    pub click_count: u64,
}

/// A mapping that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMapping {
    pub code: ShortCode,
    pub original_url: String,
    pub owner: OwnerId,
    pub created_at: Timestamp,
}

impl NewMapping {
    /// Materializes the stored mapping once the store has assigned an id.
    pub fn into_mapping(self, id: MappingId) -> Mapping {
        Mapping {
            id,
            code: self.code,
            original_url: self.original_url,
            owner: self.owner,
            created_at: self.created_at,
            click_count: 0,
        }
    }
}

/// One immutable redirect occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: ClickId,
    pub mapping_id: MappingId,
    pub clicked_at: Timestamp,
}

/// Click count for one calendar date (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClicks {
    pub date: Date,
    pub count: u64,
}

use burrow_core::DailyClicks;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// `start`/`end` are ISO-8601 timestamps; a value without offset is read as UTC.
#[derive(Deserialize)]
pub struct MappingAnalyticsQuery {
    pub start: String,
    pub end: String,
}

/// Calendar dates, `end_date` inclusive.
#[derive(Deserialize)]
pub struct OwnerAnalyticsQuery {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Serialize)]
pub struct DailyCount {
    pub date: Date,
    pub count: u64,
}

impl From<DailyClicks> for DailyCount {
    fn from(value: DailyClicks) -> Self {
        Self {
            date: value.date,
            count: value.count,
        }
    }
}

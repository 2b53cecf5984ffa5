//! Click recording and per-day aggregation.
//!
//! [`ClickRecorder`] appends to the click log, [`Aggregator`] turns the log
//! into daily counts. Days are UTC calendar dates.

pub mod aggregator;
pub mod error;
pub mod recorder;

pub use aggregator::Aggregator;
pub use error::{AnalyticsError, Result};
pub use recorder::ClickRecorder;

use async_trait::async_trait;
use burrow_core::{DailyClicks, MappingId, OwnerId, ShortCode, TimeRange};
use jiff::civil::Date;
use std::collections::BTreeMap;

/// Read side of click analytics, object safe so it can sit behind an `Arc<dyn _>`.
#[async_trait]
pub trait ClickAnalytics: Send + Sync + 'static {
    /// Daily counts for one mapping over a half-open timestamp range.
    async fn count_by_day(&self, mapping_id: MappingId, range: TimeRange)
        -> Result<Vec<DailyClicks>>;

    /// Like [`count_by_day`](Self::count_by_day), addressed by short code and
    /// restricted to mappings owned by `owner`.
    async fn count_by_day_for_code(
        &self,
        owner: &OwnerId,
        code: &ShortCode,
        range: TimeRange,
    ) -> Result<Vec<DailyClicks>>;

    /// Sparse per-day counts across all of `owner`'s mappings, `end` inclusive.
    async fn count_by_day_for_owner(
        &self,
        owner: &OwnerId,
        start: Date,
        end: Date,
    ) -> Result<BTreeMap<Date, u64>>;
}

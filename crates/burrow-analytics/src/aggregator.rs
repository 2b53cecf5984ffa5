use crate::error::{AnalyticsError, Result};
use crate::ClickAnalytics;
use async_trait::async_trait;
use burrow_core::{
    utc_date, ClickRepository, DailyClicks, MappingId, OwnerId, ReadMappingRepository, ShortCode,
    TimeRange,
};
use jiff::civil::Date;
use jiff::Timestamp;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Groups click events into per-day counts.
///
/// Dates are UTC calendar dates. Grouping depends only on event timestamps,
/// never on the order in which the store returns them.
#[derive(Debug)]
pub struct Aggregator<M, C> {
    mappings: Arc<M>,
    clicks: Arc<C>,
}

impl<M, C> Clone for Aggregator<M, C> {
    fn clone(&self) -> Self {
        Self {
            mappings: Arc::clone(&self.mappings),
            clicks: Arc::clone(&self.clicks),
        }
    }
}

impl<M: ReadMappingRepository, C: ClickRepository> Aggregator<M, C> {
    pub fn new(mappings: M, clicks: C) -> Self {
        Self::from_arcs(Arc::new(mappings), Arc::new(clicks))
    }

    pub fn from_arcs(mappings: Arc<M>, clicks: Arc<C>) -> Self {
        Self { mappings, clicks }
    }

    /// Daily counts for one mapping over `[range.start, range.end)`, ascending by date.
    ///
    /// A missing mapping is an error; a range without events is an empty result.
    pub async fn count_by_day(
        &self,
        mapping_id: MappingId,
        range: TimeRange,
    ) -> Result<Vec<DailyClicks>> {
        if self.mappings.find_by_id(mapping_id).await?.is_none() {
            trace!(mapping_id = %mapping_id, "analytics for missing mapping");
            return Err(AnalyticsError::MappingNotFound(mapping_id.to_string()));
        }

        let times = self.clicks.click_times(mapping_id, range).await?;
        debug!(mapping_id = %mapping_id, events = times.len(), "aggregated mapping clicks");
        Ok(into_series(bucket_by_day(times)))
    }

    /// Daily counts for the mapping behind `code`, visible only to its owner.
    ///
    /// A code owned by someone else is reported exactly like an unknown code.
    pub async fn count_by_day_for_code(
        &self,
        owner: &OwnerId,
        code: &ShortCode,
        range: TimeRange,
    ) -> Result<Vec<DailyClicks>> {
        let mapping = match self.mappings.find_by_code(code).await? {
            Some(mapping) if mapping.owner == *owner => mapping,
            _ => {
                trace!(code = %code, owner = %owner, "analytics for inaccessible code");
                return Err(AnalyticsError::MappingNotFound(code.to_string()));
            }
        };

        let times = self.clicks.click_times(mapping.id, range).await?;
        debug!(code = %code, events = times.len(), "aggregated mapping clicks");
        Ok(into_series(bucket_by_day(times)))
    }

    /// Daily counts across every mapping `owner` has, for the calendar dates
    /// `start..=end`. Dates without clicks are absent.
    pub async fn count_by_day_for_owner(
        &self,
        owner: &OwnerId,
        start: Date,
        end: Date,
    ) -> Result<BTreeMap<Date, u64>> {
        let range = TimeRange::from_dates(start, end)?;
        let times = self.clicks.owner_click_times(owner, range).await?;
        debug!(owner = %owner, events = times.len(), "aggregated owner clicks");
        Ok(bucket_by_day(times))
    }
}

#[async_trait]
impl<M: ReadMappingRepository, C: ClickRepository> ClickAnalytics for Aggregator<M, C> {
    async fn count_by_day(
        &self,
        mapping_id: MappingId,
        range: TimeRange,
    ) -> Result<Vec<DailyClicks>> {
        Aggregator::count_by_day(self, mapping_id, range).await
    }

    async fn count_by_day_for_code(
        &self,
        owner: &OwnerId,
        code: &ShortCode,
        range: TimeRange,
    ) -> Result<Vec<DailyClicks>> {
        Aggregator::count_by_day_for_code(self, owner, code, range).await
    }

    async fn count_by_day_for_owner(
        &self,
        owner: &OwnerId,
        start: Date,
        end: Date,
    ) -> Result<BTreeMap<Date, u64>> {
        Aggregator::count_by_day_for_owner(self, owner, start, end).await
    }
}

fn bucket_by_day(times: impl IntoIterator<Item = Timestamp>) -> BTreeMap<Date, u64> {
    let mut buckets = BTreeMap::new();
    for ts in times {
        *buckets.entry(utc_date(ts)).or_insert(0) += 1;
    }
    buckets
}

fn into_series(buckets: BTreeMap<Date, u64>) -> Vec<DailyClicks> {
    buckets
        .into_iter()
        .map(|(date, count)| DailyClicks { date, count })
        .collect()
}

use crate::error::Result;
use burrow_core::{ClickEvent, ClickRepository, MappingId};
use jiff::Timestamp;
use std::sync::Arc;
use tracing::debug;

/// Appends click events to the log.
///
/// Every call writes a new event; there is no deduplication. The store bumps
/// the mapping's click counter in the same operation, so the counter and the
/// log cannot drift apart.
#[derive(Debug)]
pub struct ClickRecorder<C> {
    clicks: Arc<C>,
}

impl<C> Clone for ClickRecorder<C> {
    fn clone(&self) -> Self {
        Self {
            clicks: Arc::clone(&self.clicks),
        }
    }
}

impl<C: ClickRepository> ClickRecorder<C> {
    pub fn new(clicks: C) -> Self {
        Self::from_arc(Arc::new(clicks))
    }

    pub fn from_arc(clicks: Arc<C>) -> Self {
        Self { clicks }
    }

    /// Records one click at `at`.
    ///
    /// Fails with [`AnalyticsError::UnknownMapping`](crate::AnalyticsError::UnknownMapping)
    /// if the mapping no longer exists.
    pub async fn record(&self, mapping_id: MappingId, at: Timestamp) -> Result<ClickEvent> {
        let event = self.clicks.insert_click(mapping_id, at).await?;
        debug!(mapping_id = %mapping_id, click_id = %event.id, "recorded click");
        Ok(event)
    }
}

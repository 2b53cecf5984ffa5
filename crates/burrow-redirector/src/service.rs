use std::sync::Arc;

use crate::redirector::Redirector;
use async_trait::async_trait;
use burrow_analytics::{AnalyticsError, ClickRecorder};
use burrow_core::{ClickRepository, Clock, Mapping, ReadMappingRepository, ShortCode, SystemClock};
use tracing::{debug, trace, warn};

/// Service for handling URL redirects.
///
/// Looks the mapping up through a read-only repository, then records the
/// click with the current time before handing back the original URL.
#[derive(Debug)]
pub struct RedirectorService<M, C, K = SystemClock> {
    mappings: Arc<M>,
    recorder: ClickRecorder<C>,
    clock: Arc<K>,
}

impl<M, C, K> Clone for RedirectorService<M, C, K> {
    fn clone(&self) -> Self {
        Self {
            mappings: Arc::clone(&self.mappings),
            recorder: self.recorder.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<M: ReadMappingRepository, C: ClickRepository> RedirectorService<M, C, SystemClock> {
    pub fn new(mappings: M, clicks: C) -> Self {
        Self::with_clock(mappings, clicks, SystemClock)
    }
}

impl<M: ReadMappingRepository, C: ClickRepository, K: Clock> RedirectorService<M, C, K> {
    pub fn with_clock(mappings: M, clicks: C, clock: K) -> Self {
        Self {
            mappings: Arc::new(mappings),
            recorder: ClickRecorder::new(clicks),
            clock: Arc::new(clock),
        }
    }

    /// Resolves a short code to its original URL, recording one click.
    ///
    /// * `Ok(Some(url))` - the code exists; a click was recorded (or the
    ///   failure to record it was logged)
    /// * `Ok(None)` - the code doesn't exist; nothing was written
    /// * `Err(e)` - the lookup itself failed
    pub async fn resolve(&self, code: &ShortCode) -> crate::Result<Option<String>> {
        Redirector::resolve(self, code).await
    }

    async fn record_click(&self, mapping: &Mapping) {
        match self.recorder.record(mapping.id, self.clock.now()).await {
            Ok(_) => {}
            Err(AnalyticsError::UnknownMapping(id)) => {
                warn!(code = %mapping.code, mapping_id = %id, "mapping deleted before click was recorded");
            }
            Err(e) => {
                warn!(code = %mapping.code, mapping_id = %mapping.id, error = %e, "failed to record click");
            }
        }
    }
}

#[async_trait]
impl<M: ReadMappingRepository, C: ClickRepository, K: Clock> Redirector
    for RedirectorService<M, C, K>
{
    async fn resolve(&self, code: &ShortCode) -> crate::Result<Option<String>> {
        trace!(code = %code, "resolving short code");

        match self.mappings.find_by_code(code).await? {
            Some(mapping) => {
                self.record_click(&mapping).await;
                debug!(code = %code, url = %mapping.original_url, "Resolved short code");
                Ok(Some(mapping.original_url))
            }
            None => {
                trace!(code = %code, "Short code not found");
                Ok(None)
            }
        }
    }
}

use std::sync::Arc;

use burrow_analytics::ClickAnalytics;
use burrow_core::{ShortCode, Shortener};
use burrow_redirector::Redirector;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    redirector: Arc<dyn Redirector>,
    analytics: Arc<dyn ClickAnalytics>,
    base_url: String,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        redirector: Arc<dyn Redirector>,
        analytics: Arc<dyn ClickAnalytics>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            shortener,
            redirector,
            analytics,
            base_url: public_base_url.into(),
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn redirector(&self) -> &dyn Redirector {
        self.redirector.as_ref()
    }

    pub fn analytics(&self) -> &dyn ClickAnalytics {
        self.analytics.as_ref()
    }

    /// Public URL under which `code` redirects.
    pub fn short_url(&self, code: &ShortCode) -> String {
        code.to_url(&self.base_url)
    }
}

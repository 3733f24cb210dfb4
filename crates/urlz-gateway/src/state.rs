use crate::config::GatewayConfig;
use std::sync::Arc;
use urlz_ratelimit::{Limiter, RateLimitError, RateLimiterRegistry};
use urlz_shortener::Shortener;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    limiters: Arc<RateLimiterRegistry>,
    config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(shortener: Arc<dyn Shortener>, config: GatewayConfig) -> Self {
        Self {
            shortener,
            limiters: Arc::new(RateLimiterRegistry::new()),
            config: Arc::new(config),
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Bucket for `client`, created with the configured quota on first use.
    pub fn limiter_for(&self, client: &str) -> Result<Limiter, RateLimitError> {
        self.limiters.get_or_create(
            client,
            self.config.rate_limit_per_second,
            self.config.rate_limit_burst,
        )
    }
}

//! Per-client rate limiting backed by `governor` keyed limiters

use crate::config::app_config::RateLimitConfig;
use crate::infrastructure::adapters::MonitoringAdapter;
use crate::shared::error::{AppError, AppResult};
use crate::shared::logging::LoggingUtils;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Tracked clients before idle limiter state is pruned
const RETAIN_THRESHOLD: usize = 10_000;

pub struct RateLimitMiddleware {
    limiter: Option<DefaultKeyedRateLimiter<String>>,
    monitoring: Option<Arc<MonitoringAdapter>>,
}

impl RateLimitMiddleware {
    /// Build the limiter; disabled configurations let every request through
    pub fn new(
        config: &RateLimitConfig,
        monitoring: Option<Arc<MonitoringAdapter>>,
    ) -> AppResult<Self> {
        if !config.enabled {
            return Ok(Self { limiter: None, monitoring });
        }

        let per_minute = NonZeroU32::new(config.requests_per_minute)
            .ok_or_else(|| {
                AppError::Config("requests_per_minute must be greater than 0".to_string())
            })?;
        let burst = NonZeroU32::new(config.burst_size)
            .ok_or_else(|| AppError::Config("burst_size must be greater than 0".to_string()))?;

        let quota = Quota::per_minute(per_minute).allow_burst(burst);
        Ok(Self { limiter: Some(RateLimiter::keyed(quota)), monitoring })
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Consume one request for `client_ip`, or fail with `AppError::RateLimit`
    pub fn check_rate_limit(&self, client_ip: &str) -> AppResult<()> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        if limiter.len() > RETAIN_THRESHOLD {
            limiter.retain_recent();
        }

        if limiter.check_key(&client_ip.to_string()).is_err() {
            LoggingUtils::log_rate_limit(client_ip);
            if let Some(monitoring) = &self.monitoring {
                monitoring.record_rate_limited_request();
            }
            return Err(AppError::RateLimit);
        }

        Ok(())
    }
}

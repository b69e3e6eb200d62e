//! Monitoring adapter for metrics and observability
//!
//! Holds the Prometheus registry for the payment flow counters.

use crate::shared::error::{AppError, AppResult};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Label values recorded on `payment_callbacks_total`
pub mod callback_outcome {
    pub const COMPLETED: &str = "completed";
    pub const VERIFICATION_FAILED: &str = "verification_failed";
    pub const NOT_FOUND: &str = "not_found";
    pub const ALREADY_FINALIZED: &str = "already_finalized";
    pub const ERROR: &str = "error";
}

/// Adapter for monitoring and metrics services
pub struct MonitoringAdapter {
    registry: Registry,
    orders_initiated: IntCounter,
    gateway_failures: IntCounter,
    callbacks: IntCounterVec,
    orders_expired: IntCounter,
    orders_orphaned: IntCounter,
    rate_limited: IntCounter,
}

fn metric_error(e: prometheus::Error) -> AppError {
    AppError::Internal(format!("metrics registration failed: {}", e))
}

impl MonitoringAdapter {
    /// Create a new monitoring adapter with its own registry
    pub fn new() -> AppResult<Self> {
        let registry = Registry::new();

        let orders_initiated = IntCounter::new(
            "payment_orders_initiated_total",
            "Payment orders created at the gateway and persisted locally",
        )
        .map_err(metric_error)?;
        let gateway_failures = IntCounter::new(
            "payment_gateway_failures_total",
            "Order creation requests the gateway rejected or never answered",
        )
        .map_err(metric_error)?;
        let callbacks = IntCounterVec::new(
            Opts::new("payment_callbacks_total", "Checkout callbacks by outcome"),
            &["outcome"],
        )
        .map_err(metric_error)?;
        let orders_expired = IntCounter::new(
            "payment_orders_expired_total",
            "Created orders failed by the expiry sweep",
        )
        .map_err(metric_error)?;
        let orders_orphaned = IntCounter::new(
            "payment_orders_orphaned_total",
            "Gateway orders created without a local record",
        )
        .map_err(metric_error)?;
        let rate_limited = IntCounter::new(
            "http_requests_rate_limited_total",
            "Requests rejected by the per-client rate limiter",
        )
        .map_err(metric_error)?;

        registry.register(Box::new(orders_initiated.clone())).map_err(metric_error)?;
        registry.register(Box::new(gateway_failures.clone())).map_err(metric_error)?;
        registry.register(Box::new(callbacks.clone())).map_err(metric_error)?;
        registry.register(Box::new(orders_expired.clone())).map_err(metric_error)?;
        registry.register(Box::new(orders_orphaned.clone())).map_err(metric_error)?;
        registry.register(Box::new(rate_limited.clone())).map_err(metric_error)?;

        Ok(Self {
            registry,
            orders_initiated,
            gateway_failures,
            callbacks,
            orders_expired,
            orders_orphaned,
            rate_limited,
        })
    }

    pub fn record_order_initiated(&self) {
        self.orders_initiated.inc();
    }

    pub fn record_gateway_failure(&self) {
        self.gateway_failures.inc();
    }

    /// Count a callback under one of the `callback_outcome` labels
    pub fn record_callback(&self, outcome: &str) {
        self.callbacks.with_label_values(&[outcome]).inc();
    }

    pub fn record_orders_expired(&self, count: u64) {
        self.orders_expired.inc_by(count);
    }

    pub fn record_orphaned_order(&self) {
        self.orders_orphaned.inc();
    }

    pub fn record_rate_limited_request(&self) {
        self.rate_limited.inc();
    }

    /// Snapshot of the counters, used by tests and the health endpoint
    pub fn summary(&self) -> MetricsSummary {
        let callbacks = |outcome: &str| self.callbacks.with_label_values(&[outcome]).get();
        MetricsSummary {
            orders_initiated: self.orders_initiated.get(),
            gateway_failures: self.gateway_failures.get(),
            callbacks_completed: callbacks(callback_outcome::COMPLETED),
            callbacks_rejected: callbacks(callback_outcome::VERIFICATION_FAILED)
                + callbacks(callback_outcome::NOT_FOUND)
                + callbacks(callback_outcome::ALREADY_FINALIZED),
            orders_expired: self.orders_expired.get(),
            orders_orphaned: self.orders_orphaned.get(),
            rate_limited_requests: self.rate_limited.get(),
        }
    }

    /// Prometheus text exposition of every registered metric
    pub fn render(&self) -> AppResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metric_error)?;
        String::from_utf8(buffer)
            .map_err(|e| AppError::Internal(format!("metrics are not UTF-8: {}", e)))
    }
}

/// Counter snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSummary {
    pub orders_initiated: u64,
    pub gateway_failures: u64,
    pub callbacks_completed: u64,
    pub callbacks_rejected: u64,
    pub orders_expired: u64,
    pub orders_orphaned: u64,
    pub rate_limited_requests: u64,
}

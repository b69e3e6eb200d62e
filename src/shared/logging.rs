//! Logging utilities module
//!
//! This module provides centralized logging functionality and utilities.

use crate::config::app_config::LoggingConfig;
use crate::domain::payments::PaymentOrder;
use crate::shared::error::AppError;
use tracing::{error, info, warn};

/// Logging utilities for the application
pub struct LoggingUtils;

impl LoggingUtils {
    /// Initialize logging with the specified configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured level.
    pub fn initialize(config: &LoggingConfig) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.level));

        let builder = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(config.ansi);

        let result = if config.format == "compact" {
            tracing::subscriber::set_global_default(builder.compact().finish())
        } else {
            tracing::subscriber::set_global_default(builder.finish())
        };

        result.map_err(|e| AppError::Internal(format!("Failed to initialize logging: {}", e)))
    }

    /// Log a request with structured data
    pub fn log_request(request_id: &str, operation: &str, client_ip: &str) {
        info!(
            request_id = %request_id,
            operation = %operation,
            client_ip = %client_ip,
            "Processing payment request"
        );
    }

    /// Log a freshly initiated order
    pub fn log_order_initiated(order: &PaymentOrder) {
        info!(
            order_id = %order.id,
            remote_order_id = %order.remote_order_id,
            receipt = %order.receipt,
            amount_minor_units = order.amount_minor_units,
            currency = %order.currency,
            "Payment order created"
        );
    }

    /// Log a gateway failure during initiation
    pub fn log_gateway_failure(receipt: &str, error: &AppError) {
        error!(
            receipt = %receipt,
            error = %error,
            "Gateway order creation failed"
        );
    }

    /// Log a remote order that exists at the gateway but has no local record
    pub fn log_orphaned_order(remote_order_id: &str, receipt: &str, error: &AppError) {
        error!(
            remote_order_id = %remote_order_id,
            receipt = %receipt,
            error = %error,
            "Remote order created but local record was not persisted; needs reconciliation"
        );
    }

    /// Log the outcome of a callback verification
    pub fn log_callback_outcome(remote_order_id: &str, outcome: &str) {
        info!(
            remote_order_id = %remote_order_id,
            outcome = %outcome,
            "Payment callback processed"
        );
    }

    /// Log security events
    pub fn log_security_event(event_type: &str, details: &str, client_ip: &str) {
        warn!(
            event_type = %event_type,
            details = %details,
            client_ip = %client_ip,
            "Security event detected"
        );
    }

    /// Log rate limiting events
    pub fn log_rate_limit(client_ip: &str) {
        warn!(client_ip = %client_ip, "Rate limit exceeded");
    }

    /// Generate a unique request ID
    pub fn generate_request_id() -> String {
        format!("req_{}", uuid::Uuid::new_v4().simple())
    }
}

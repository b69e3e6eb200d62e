//! Infrastructure adapters module
//!
//! This module contains adapters for the payment gateway, the record stores and metrics.

pub mod monitoring;
pub mod payments_store;
pub mod razorpay_gateway;

// Re-export all adapters
pub use monitoring::{MetricsSummary, MonitoringAdapter};
pub use payments_store::{InMemoryPaymentStore, RedisPaymentStore};
pub use razorpay_gateway::{RazorpayGateway, SignatureVerifier};

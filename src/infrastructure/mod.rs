//! Infrastructure layer - External concerns and adapters
//!
//! This module contains the gateway client, record stores, metrics and HTTP handling.

pub mod adapters;
pub mod http;

// Re-export main adapters
pub use adapters::{InMemoryPaymentStore, MonitoringAdapter, RazorpayGateway, RedisPaymentStore};

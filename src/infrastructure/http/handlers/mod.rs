//! HTTP route handlers module
//!
//! Handlers are grouped by endpoint family and always resolve to a response;
//! failures are rendered through `ResponseFormatter`.

pub mod health;
pub mod metrics;
pub mod payments;

pub use health::handle_health_request;
pub use metrics::handle_prometheus_request;
pub use payments::{handle_initiate_order, handle_order_status, handle_verify_callback};

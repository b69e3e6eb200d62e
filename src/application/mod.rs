//! Application layer - Use cases and application services
//!
//! This module contains the payments service that orchestrates the gateway and
//! the record store, the health check use case, and the expiry worker.

pub mod expiry_worker;
pub mod services;
pub mod use_cases;

pub use expiry_worker::start_expiry_worker;
pub use services::*;
pub use use_cases::*;

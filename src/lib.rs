//! Payment Order Server - hosted-checkout order reconciliation over HTTP
//!
//! Creates remote payment orders through the gateway, keeps a local record per
//! order, verifies the signed checkout callback and completes the record at most once.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod middleware;
pub mod shared;

pub use config::AppConfig;
pub use infrastructure::http::HttpServer;
pub use shared::error::{AppError, AppResult};

/// Application result type
pub type Result<T> = std::result::Result<T, shared::error::AppError>;

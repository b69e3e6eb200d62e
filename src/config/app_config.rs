//! Application configuration structures
//!
//! This module contains the main configuration structures for the application.

use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use validator::Validate;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server address to bind to
    pub bind_address: IpAddr,

    /// Server port
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    /// Maximum request size in bytes
    #[validate(range(min = 1024, max = 10485760))] // 1KB to 10MB
    pub max_request_size: u64,

    /// Trust the X-Forwarded-For header for the client address (set when behind a reverse proxy)
    pub trust_forwarded_for: bool,
}

/// Payment gateway configuration
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct GatewayConfig {
    /// Gateway API base URL
    #[validate(url)]
    pub base_url: String,

    /// Public key id, also handed to the checkout client
    #[validate(length(min = 1))]
    pub key_id: String,

    /// Shared secret for API auth and callback signatures
    #[validate(length(min = 1))]
    pub key_secret: String,

    /// ISO currency code for new orders
    #[validate(length(equal = 3))]
    pub currency: String,

    /// Merchant display name returned to the checkout client
    #[validate(length(min = 1, max = 255))]
    pub merchant_name: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &"****")
            .field("currency", &self.currency)
            .field("merchant_name", &self.merchant_name)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Record store backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Which backend holds payment orders
    pub backend: StoreBackend,

    /// Redis connection URL, used when backend = "redis"
    #[validate(url)]
    pub redis_url: String,

    /// Key prefix for Redis records
    #[validate(length(min = 1, max = 64))]
    pub key_prefix: String,
}

/// Stale order expiry configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExpiryConfig {
    /// Run the background expiry worker
    pub enabled: bool,

    /// Age after which a `created` order is failed as expired
    #[validate(range(min = 1, max = 10080))] // up to one week
    pub order_ttl_minutes: i64,

    /// Interval between sweeps
    #[validate(range(min = 5, max = 86400))]
    pub sweep_interval_seconds: u64,
}

/// Payments configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentsConfig {
    /// Largest accepted order amount, in minor units
    #[validate(range(min = 1))]
    pub max_amount_minor_units: i64,

    #[validate(nested)]
    pub expiry: ExpiryConfig,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SecurityConfig {
    /// Add hardening headers to every JSON response
    pub enable_security_headers: bool,

    /// Development mode - relaxes the HTTPS requirement on the gateway URL
    pub development_mode: bool,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateLimitConfig {
    /// Requests per minute per IP
    #[validate(range(min = 1, max = 10000))]
    pub requests_per_minute: u32,

    /// Burst size
    #[validate(range(min = 1, max = 1000))]
    pub burst_size: u32,

    /// Enable rate limiting
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[validate(length(min = 1))]
    pub level: String,

    /// Log format: "full" or "compact"
    #[validate(length(min = 1))]
    pub format: String,

    /// Colored output
    pub ansi: bool,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Payment gateway configuration
    pub gateway: GatewayConfig,

    /// Record store configuration
    pub store: StoreConfig,

    /// Payments configuration
    pub payments: PaymentsConfig,

    /// Security configuration
    pub security: SecurityConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: IpAddr::from([127, 0, 0, 1]),
                port: 8080,
                max_request_size: 64 * 1024,
                trust_forwarded_for: false,
            },
            gateway: GatewayConfig {
                base_url: "https://api.razorpay.com".to_string(),
                key_id: "rzp_test_key".to_string(),
                key_secret: "change-me".to_string(),
                currency: "INR".to_string(),
                merchant_name: "Payment Order Server".to_string(),
                timeout_seconds: 30,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                redis_url: "redis://127.0.0.1:6379".to_string(),
                key_prefix: "payment_orders".to_string(),
            },
            payments: PaymentsConfig {
                max_amount_minor_units: 100_000_000_000,
                expiry: ExpiryConfig {
                    enabled: false,
                    order_ttl_minutes: 24 * 60,
                    sweep_interval_seconds: 60,
                },
            },
            security: SecurityConfig {
                enable_security_headers: true,
                development_mode: false,
            },
            rate_limit: RateLimitConfig {
                requests_per_minute: 120,
                burst_size: 20,
                enabled: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "full".to_string(),
                ansi: false,
            },
        }
    }
}

impl AppConfig {
    /// Environment variable prefix, e.g. `PAYMENT_ORDERS__GATEWAY__KEY_SECRET`
    pub const ENV_PREFIX: &'static str = "PAYMENT_ORDERS";

    /// Load configuration from defaults, an optional `Conf` file and environment variables
    pub fn load() -> crate::Result<Self> {
        let defaults = config::Config::try_from(&AppConfig::default())
            .map_err(|e| AppError::Config(format!("Failed to encode defaults: {}", e)))?;

        let config = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("Conf").required(false))
            .add_source(config::Environment::with_prefix(Self::ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build configuration: {}", e)))?;

        let config: AppConfig = config
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Failed to deserialize configuration: {}", e)))?;

        // Validate configuration
        config
            .validate_config()
            .map_err(|e| AppError::Config(format!("Configuration validation failed: {}", e)))?;
        crate::config::ConfigValidator::validate_config(&config)?;

        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_config(&self) -> Result<(), validator::ValidationErrors> {
        self.server.validate()?;
        self.gateway.validate()?;
        self.store.validate()?;
        self.payments.validate()?;
        self.security.validate()?;
        self.rate_limit.validate()?;
        self.logging.validate()?;

        Ok(())
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

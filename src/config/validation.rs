//! Configuration validation module
//!
//! This module provides additional validation logic for configuration
//! beyond the basic validator crate validation.

use crate::config::app_config::{GatewayConfig, RateLimitConfig, StoreBackend, StoreConfig};
use crate::config::AppConfig;
use crate::shared::error::AppError;

/// Placeholder secret shipped in the compiled defaults
const PLACEHOLDER_SECRET: &str = "change-me";

/// Configuration validator for additional validation logic
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the complete configuration
    pub fn validate_config(config: &AppConfig) -> crate::Result<()> {
        Self::validate_gateway_url(&config.gateway.base_url, config.security.development_mode)?;
        Self::validate_gateway_credentials(&config.gateway, config.security.development_mode)?;
        Self::validate_store_config(&config.store)?;
        Self::validate_rate_limit_config(&config.rate_limit)?;

        Ok(())
    }

    /// Validate the gateway base URL
    fn validate_gateway_url(url: &str, development_mode: bool) -> crate::Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Config(
                "Gateway base URL must start with http:// or https://".to_string()
            ));
        }

        let local = url.contains("localhost") || url.contains("127.0.0.1");
        if !url.starts_with("https://") && !local && !development_mode {
            return Err(AppError::Config(
                "Production gateway base URL must use HTTPS".to_string()
            ));
        }

        if url.ends_with('/') {
            tracing::warn!("Gateway base URL has a trailing slash; it will be trimmed");
        }

        Ok(())
    }

    /// Validate gateway credentials
    fn validate_gateway_credentials(
        gateway: &GatewayConfig,
        development_mode: bool,
    ) -> crate::Result<()> {
        if gateway.key_secret.trim().is_empty() || gateway.key_id.trim().is_empty() {
            return Err(AppError::Config("Gateway key id and key secret are required".to_string()));
        }

        if gateway.key_secret == PLACEHOLDER_SECRET && !development_mode {
            return Err(AppError::Config(
                "Gateway key secret is still the placeholder value; set PAYMENT_ORDERS__GATEWAY__KEY_SECRET".to_string()
            ));
        }

        Ok(())
    }

    /// Validate store configuration
    fn validate_store_config(store: &StoreConfig) -> crate::Result<()> {
        if store.backend == StoreBackend::Redis
            && !store.redis_url.starts_with("redis://")
            && !store.redis_url.starts_with("rediss://")
        {
            return Err(AppError::Config(
                "Redis URL must start with redis:// or rediss://".to_string()
            ));
        }

        if store.backend == StoreBackend::Memory {
            tracing::warn!("Payment orders are kept in memory and will not survive a restart");
        }

        Ok(())
    }

    /// Validate rate limiting configuration
    fn validate_rate_limit_config(rate_limit: &RateLimitConfig) -> crate::Result<()> {
        if rate_limit.enabled {
            if rate_limit.requests_per_minute == 0 {
                return Err(AppError::Config(
                    "Rate limiting enabled but requests_per_minute is 0".to_string()
                ));
            }

            if rate_limit.burst_size > rate_limit.requests_per_minute {
                return Err(AppError::Config(
                    "Burst size cannot be greater than requests per minute".to_string()
                ));
            }
        }

        Ok(())
    }
}

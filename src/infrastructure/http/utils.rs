//! HTTP utilities - Common helper functions
//!
//! Filters that inject shared state into routes and resolve the client address.

use crate::application::services::PaymentsService;
use crate::application::use_cases::HealthCheckUseCase;
use crate::infrastructure::adapters::MonitoringAdapter;
use crate::middleware::{RateLimitMiddleware, SecurityHeadersMiddleware};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use warp::Filter;

/// Pick the address used for rate limiting and logs.
///
/// `X-Forwarded-For` is only honored when the server sits behind a trusted proxy;
/// the left-most valid entry is the original client.
pub fn resolve_client_ip(
    forwarded_for: Option<&str>,
    remote: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> String {
    if trust_forwarded_for {
        let forwarded = forwarded_for
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    remote
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Extract the client address for the request
pub fn with_client_ip(
    trust_forwarded_for: bool,
) -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("x-forwarded-for")
        .and(warp::addr::remote())
        .map(move |forwarded: Option<String>, remote: Option<SocketAddr>| {
            resolve_client_ip(forwarded.as_deref(), remote, trust_forwarded_for)
        })
}

/// Extract the client address and charge it one request against the rate limiter
pub fn with_rate_limited_client(
    trust_forwarded_for: bool,
    rate_limit: Arc<RateLimitMiddleware>,
) -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    with_client_ip(trust_forwarded_for)
        .and(with_rate_limit_middleware(rate_limit))
        .and_then(|client_ip: String, rate_limit: Arc<RateLimitMiddleware>| async move {
            rate_limit
                .check_rate_limit(&client_ip)
                .map(|_| client_ip)
                .map_err(warp::reject::custom)
        })
}

/// Helper function to inject the payments service into route
pub fn with_payments_service(
    service: Arc<PaymentsService>,
) -> impl Filter<Extract = (Arc<PaymentsService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// Helper function to inject health use case into route
pub fn with_health_use_case(
    health_use_case: Arc<HealthCheckUseCase>,
) -> impl Filter<Extract = (Arc<HealthCheckUseCase>,), Error = Infallible> + Clone {
    warp::any().map(move || health_use_case.clone())
}

/// Helper function to inject the monitoring adapter into route
pub fn with_monitoring(
    monitoring: Arc<MonitoringAdapter>,
) -> impl Filter<Extract = (Arc<MonitoringAdapter>,), Error = Infallible> + Clone {
    warp::any().map(move || monitoring.clone())
}

/// Helper function to inject the security headers layer into route
pub fn with_security_headers(
    security: SecurityHeadersMiddleware,
) -> impl Filter<Extract = (SecurityHeadersMiddleware,), Error = Infallible> + Clone {
    warp::any().map(move || security.clone())
}

/// Helper function to inject rate limiting middleware into route
pub fn with_rate_limit_middleware(
    rate_limit_middleware: Arc<RateLimitMiddleware>,
) -> impl Filter<Extract = (Arc<RateLimitMiddleware>,), Error = Infallible> + Clone {
    warp::any().map(move || rate_limit_middleware.clone())
}

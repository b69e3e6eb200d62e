//! Metrics routes module

use crate::{
    config::AppConfig,
    infrastructure::{
        adapters::MonitoringAdapter,
        http::{
            handlers::handle_prometheus_request,
            utils::{with_monitoring, with_security_headers},
        },
    },
    middleware::SecurityHeadersMiddleware,
};
use std::sync::Arc;
use warp::Filter;

/// Metrics routes configuration
pub struct MetricsRoutes;

impl MetricsRoutes {
    /// Create the Prometheus exposition route
    pub fn create_prometheus_route(
        config: &AppConfig,
        monitoring: Arc<MonitoringAdapter>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path!("metrics")
            .and(warp::get())
            .and(with_monitoring(monitoring))
            .and(with_security_headers(SecurityHeadersMiddleware::new(config)))
            .and_then(handle_prometheus_request)
    }
}

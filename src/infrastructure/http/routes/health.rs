//! Health routes module

use crate::{
    application::{services::PaymentsService, use_cases::HealthCheckUseCase},
    config::AppConfig,
    infrastructure::http::{
        handlers::handle_health_request,
        utils::{with_health_use_case, with_payments_service, with_security_headers},
    },
    middleware::SecurityHeadersMiddleware,
};
use std::sync::Arc;
use warp::Filter;

/// Health routes configuration
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check endpoint route
    pub fn create_health_route(
        config: &AppConfig,
        health_use_case: Arc<HealthCheckUseCase>,
        service: Arc<PaymentsService>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path!("health")
            .and(warp::get())
            .and(with_health_use_case(health_use_case))
            .and(with_payments_service(service))
            .and(with_security_headers(SecurityHeadersMiddleware::new(config)))
            .and_then(handle_health_request)
    }
}

//! Route builder module
//!
//! This module contains the main route builder that orchestrates the creation
//! of all application routes.

use crate::{
    application::{services::PaymentsService, use_cases::HealthCheckUseCase},
    config::AppConfig,
    infrastructure::{
        adapters::MonitoringAdapter,
        http::{
            responses::handle_rejection,
            routes::{HealthRoutes, MetricsRoutes, PaymentsRoutes},
        },
    },
    middleware::{RateLimitMiddleware, SecurityHeadersMiddleware},
};
use std::sync::Arc;
use warp::Filter;

/// Route builder that orchestrates the creation of all application routes
pub struct RouteBuilder;

impl RouteBuilder {
    /// Build all application routes
    pub fn build_routes(
        config: &AppConfig,
        payments_service: Arc<PaymentsService>,
        health_use_case: Arc<HealthCheckUseCase>,
        monitoring: Arc<MonitoringAdapter>,
        rate_limit: Arc<RateLimitMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        let payments_routes =
            PaymentsRoutes::create_routes(config, payments_service.clone(), rate_limit);
        let health_route =
            HealthRoutes::create_health_route(config, health_use_case, payments_service);
        let prometheus_route = MetricsRoutes::create_prometheus_route(config, monitoring);

        let security = SecurityHeadersMiddleware::new(config);

        payments_routes
            .or(health_route)
            .or(prometheus_route)
            .recover(move |err: warp::Rejection| handle_rejection(err, security.clone()))
    }
}

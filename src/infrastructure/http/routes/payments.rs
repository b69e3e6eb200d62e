//! Payments routes

use std::sync::Arc;
use warp::Filter;

use crate::application::services::{InitiateOrderRequest, PaymentsService};
use crate::config::AppConfig;
use crate::infrastructure::http::handlers::{
    handle_initiate_order, handle_order_status, handle_verify_callback,
};
use crate::infrastructure::http::models::VerifyCallbackRequest;
use crate::infrastructure::http::utils::{
    with_payments_service, with_rate_limited_client, with_security_headers,
};
use crate::middleware::{RateLimitMiddleware, SecurityHeadersMiddleware};

pub struct PaymentsRoutes;

impl PaymentsRoutes {
    pub fn create_routes(
        config: &AppConfig,
        service: Arc<PaymentsService>,
        rate_limit: Arc<RateLimitMiddleware>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let security = SecurityHeadersMiddleware::new(config);
        let trust_forwarded_for = config.server.trust_forwarded_for;
        let max_request_size = config.server.max_request_size;

        let initiate = warp::path!("payments" / "initiate-order")
            .and(warp::post())
            .and(with_rate_limited_client(trust_forwarded_for, rate_limit.clone()))
            .and(warp::body::content_length_limit(max_request_size))
            .and(warp::body::json::<InitiateOrderRequest>())
            .and(with_payments_service(service.clone()))
            .and(with_security_headers(security.clone()))
            .and_then(handle_initiate_order);

        let callback_body = warp::body::json::<VerifyCallbackRequest>()
            .or(warp::body::form::<VerifyCallbackRequest>())
            .unify();

        let verify = warp::path!("payments" / "verify-callback")
            .and(warp::post())
            .and(with_rate_limited_client(trust_forwarded_for, rate_limit.clone()))
            .and(warp::body::content_length_limit(max_request_size))
            .and(callback_body)
            .and(with_payments_service(service.clone()))
            .and(with_security_headers(security.clone()))
            .and_then(handle_verify_callback);

        let status = warp::path!("payments" / "order-status" / String)
            .and(warp::get())
            .and(with_rate_limited_client(trust_forwarded_for, rate_limit))
            .and(with_payments_service(service))
            .and(with_security_headers(security))
            .and_then(handle_order_status);

        initiate.or(verify).or(status)
    }
}

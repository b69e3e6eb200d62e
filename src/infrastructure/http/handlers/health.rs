//! Health check handler module

use crate::{
    application::{services::PaymentsService, use_cases::HealthCheckUseCase},
    infrastructure::http::responses::ResponseFormatter,
    middleware::security_headers::{
        create_json_response_with_security_headers, SecurityHeadersMiddleware,
    },
};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;

/// Handle health check requests
pub async fn handle_health_request(
    health_use_case: Arc<HealthCheckUseCase>,
    service: Arc<PaymentsService>,
    security: SecurityHeadersMiddleware,
) -> Result<Response, warp::Rejection> {
    let health = match health_use_case.execute(Some(service)).await {
        Ok(health) => health,
        Err(e) => return Ok(ResponseFormatter::from_app_error(&e, &security)),
    };

    let status =
        StatusCode::from_u16(health.http_status_code()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
    Ok(create_json_response_with_security_headers(&health, status, &security))
}

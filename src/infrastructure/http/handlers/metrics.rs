//! Prometheus exposition handler

use crate::{
    infrastructure::{adapters::MonitoringAdapter, http::responses::ResponseFormatter},
    middleware::SecurityHeadersMiddleware,
};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;

/// Handle Prometheus metrics requests
pub async fn handle_prometheus_request(
    monitoring: Arc<MonitoringAdapter>,
    security: SecurityHeadersMiddleware,
) -> Result<Response, warp::Rejection> {
    let metrics = match monitoring.render() {
        Ok(metrics) => metrics,
        Err(e) => return Ok(ResponseFormatter::from_app_error(&e, &security)),
    };

    Ok(security.apply(warp::reply::with_header(
        warp::reply::with_status(metrics, StatusCode::OK),
        "content-type",
        "text/plain; version=0.0.4; charset=utf-8",
    )))
}

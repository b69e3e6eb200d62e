//! HTTP responses module
//!
//! Error bodies and the rejection recovery handler shared by every route.

use crate::middleware::security_headers::{
    create_json_response_with_security_headers, SecurityHeadersMiddleware,
};
use crate::shared::error::AppError;
use serde::Serialize;
use std::convert::Infallible;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Rejection;

/// Response formatter for HTTP responses
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// 200 with a JSON body
    pub fn success<T: Serialize>(body: &T, security: &SecurityHeadersMiddleware) -> Response {
        create_json_response_with_security_headers(body, StatusCode::OK, security)
    }

    /// Status and public body of an application error
    pub fn from_app_error(err: &AppError, security: &SecurityHeadersMiddleware) -> Response {
        let status = err.http_status_code();
        if status.is_server_error() {
            error!(code = err.code(), "Request failed: {}", err);
        }
        create_json_response_with_security_headers(&err.to_public_json(), status, security)
    }

    fn plain_error(
        status: StatusCode,
        code: &str,
        message: &str,
        security: &SecurityHeadersMiddleware,
    ) -> Response {
        create_json_response_with_security_headers(
            &serde_json::json!({ "error": code, "message": message }),
            status,
            security,
        )
    }
}

/// Turn any rejection into a JSON error response
pub async fn handle_rejection(
    err: Rejection,
    security: SecurityHeadersMiddleware,
) -> Result<Response, Infallible> {
    if let Some(app_error) = err.find::<AppError>() {
        return Ok(ResponseFormatter::from_app_error(app_error, &security));
    }

    let response = if err.is_not_found() {
        ResponseFormatter::plain_error(
            StatusCode::NOT_FOUND,
            "route_not_found",
            "Route not found",
            &security,
        )
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        warn!("Rejected malformed request body: {}", e);
        ResponseFormatter::plain_error(
            StatusCode::BAD_REQUEST,
            "invalid_json",
            "Malformed request body",
            &security,
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        ResponseFormatter::plain_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "Request body too large",
            &security,
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        ResponseFormatter::plain_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_media_type",
            "Unsupported content type",
            &security,
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ResponseFormatter::plain_error(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "Method not allowed",
            &security,
        )
    } else if err.find::<warp::reject::MissingHeader>().is_some()
        || err.find::<warp::reject::InvalidHeader>().is_some()
    {
        ResponseFormatter::plain_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Invalid request headers",
            &security,
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        ResponseFormatter::plain_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal error",
            &security,
        )
    };

    Ok(response)
}

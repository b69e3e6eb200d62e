//! Payments HTTP handlers

use std::sync::Arc;

use validator::Validate;
use warp::reply::Response;

use crate::application::services::{InitiateOrderRequest, PaymentsService};
use crate::domain::payments::PaymentCallback;
use crate::infrastructure::http::models::{
    CallbackResponse, OrderStatusResponse, RequestContext, VerifyCallbackRequest,
};
use crate::infrastructure::http::responses::ResponseFormatter;
use crate::middleware::SecurityHeadersMiddleware;
use crate::shared::error::AppError;
use crate::shared::logging::LoggingUtils;

pub async fn handle_initiate_order(
    client_ip: String,
    body: InitiateOrderRequest,
    service: Arc<PaymentsService>,
    security: SecurityHeadersMiddleware,
) -> Result<Response, warp::Rejection> {
    let _context = RequestContext::new(client_ip, "payments.initiate_order");

    let response = match service.initiate_order(body).await {
        Ok(order) => ResponseFormatter::success(&order, &security),
        Err(e) => ResponseFormatter::from_app_error(&e, &security),
    };
    Ok(response)
}

pub async fn handle_verify_callback(
    client_ip: String,
    body: VerifyCallbackRequest,
    service: Arc<PaymentsService>,
    security: SecurityHeadersMiddleware,
) -> Result<Response, warp::Rejection> {
    let context = RequestContext::new(client_ip, "payments.verify_callback");

    if let Err(errors) = body.validate() {
        return Ok(ResponseFormatter::from_app_error(&AppError::from(errors), &security));
    }

    let callback = PaymentCallback::from(body);
    let response = match service.verify_callback(callback.clone()).await {
        Ok(order) => ResponseFormatter::success(&CallbackResponse::from(&order), &security),
        Err(e) => {
            if matches!(e, AppError::Signature) {
                LoggingUtils::log_security_event(
                    "callback_signature_mismatch",
                    &format!("remote_order_id={}", callback.remote_order_id),
                    &context.client_ip,
                );
            }
            ResponseFormatter::from_app_error(&e, &security)
        }
    };
    Ok(response)
}

pub async fn handle_order_status(
    remote_order_id: String,
    client_ip: String,
    service: Arc<PaymentsService>,
    security: SecurityHeadersMiddleware,
) -> Result<Response, warp::Rejection> {
    let _context = RequestContext::new(client_ip, "payments.order_status");

    let response = match service.order_status(&remote_order_id).await {
        Ok(order) => ResponseFormatter::success(&OrderStatusResponse::from(order), &security),
        Err(e) => ResponseFormatter::from_app_error(&e, &security),
    };
    Ok(response)
}

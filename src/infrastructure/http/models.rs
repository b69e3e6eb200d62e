//! HTTP models - Infrastructure concerns
//!
//! Wire shapes of the payments endpoints. The callback body uses the
//! gateway's own field names so the checkout handler can post it unchanged.

use crate::domain::payments::{OrderStatus, PaymentCallback, PaymentOrder};
use crate::shared::logging::LoggingUtils;
use crate::shared::validation::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Callback relayed by the checkout client, as JSON or form fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VerifyCallbackRequest {
    #[serde(deserialize_with = "lenient::text")]
    #[validate(length(min = 1, max = 255))]
    pub razorpay_payment_id: String,

    #[serde(deserialize_with = "lenient::text")]
    #[validate(length(min = 1, max = 255))]
    pub razorpay_order_id: String,

    #[serde(deserialize_with = "lenient::text")]
    #[validate(length(min = 1, max = 255))]
    pub razorpay_signature: String,
}

impl From<VerifyCallbackRequest> for PaymentCallback {
    fn from(request: VerifyCallbackRequest) -> Self {
        PaymentCallback {
            remote_payment_id: request.razorpay_payment_id.trim().to_string(),
            remote_order_id: request.razorpay_order_id.trim().to_string(),
            remote_signature: request.razorpay_signature.trim().to_string(),
        }
    }
}

/// Successful callback verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub status: OrderStatus,
    pub order_id: String,
    pub payment_id: String,
}

impl From<&PaymentOrder> for CallbackResponse {
    fn from(order: &PaymentOrder) -> Self {
        Self {
            status: order.status,
            order_id: order.remote_order_id.clone(),
            payment_id: order.remote_payment_id.clone().unwrap_or_default(),
        }
    }
}

/// Public view of a stored order; the callback signature is never echoed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    pub id: String,
    pub order_id: String,
    pub status: OrderStatus,
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentOrder> for OrderStatusResponse {
    fn from(order: PaymentOrder) -> Self {
        Self {
            id: order.id.to_string(),
            order_id: order.remote_order_id,
            status: order.status,
            amount: order.amount_minor_units,
            currency: order.currency,
            receipt: order.receipt,
            payment_id: order.remote_payment_id,
            failure_reason: order.failure_reason,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// HTTP request context for tracking and logging
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub client_ip: String,
    pub operation: String,
    pub timestamp: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(client_ip: String, operation: &str) -> Self {
        let context = Self {
            request_id: LoggingUtils::generate_request_id(),
            client_ip,
            operation: operation.to_string(),
            timestamp: Utc::now(),
        };
        LoggingUtils::log_request(&context.request_id, &context.operation, &context.client_ip);
        context
    }
}

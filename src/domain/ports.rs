//! Collaborator contracts consumed by the payments service

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::payments::{OrderStatus, PaymentOrder, StatusTransition, TransitionOutcome};
use crate::shared::error::AppResult;

/// Notes attached to a gateway order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderNotes {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Order-creation request sent to the gateway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayOrderRequest {
    pub receipt: String,
    pub amount: i64,
    pub currency: String,
    pub notes: OrderNotes,
}

/// The gateway's view of a created order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayOrder {
    pub id: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// External payment gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a remote order. Transport and HTTP failures map to `AppError::Gateway`.
    async fn create_order(&self, request: &GatewayOrderRequest) -> AppResult<GatewayOrder>;

    /// Check a checkout callback signature. Mismatch maps to `AppError::Signature`.
    fn verify_payment_signature(
        &self,
        remote_order_id: &str,
        remote_payment_id: &str,
        signature: &str,
    ) -> AppResult<()>;

    /// Public key id handed to the checkout client
    fn key_id(&self) -> &str;
}

/// Persistence for payment orders
#[async_trait]
pub trait PaymentOrderStore: Send + Sync {
    /// Insert a new record. Fails with `AppError::Store` if the remote order id is taken.
    async fn insert(&self, order: &PaymentOrder) -> AppResult<()>;

    async fn find_by_remote_order_id(
        &self,
        remote_order_id: &str,
    ) -> AppResult<Option<PaymentOrder>>;

    /// Apply `transition` only if the record is still `created`, as one atomic step
    async fn transition(
        &self,
        remote_order_id: &str,
        transition: &StatusTransition,
    ) -> AppResult<TransitionOutcome>;

    async fn list_by_status(&self, status: OrderStatus) -> AppResult<Vec<PaymentOrder>>;

    /// Whether the backing store is reachable
    async fn ping(&self) -> bool;
}

//! Payments domain models and types

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a payment order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
        }
    }

    /// A finalized order has left `created` and must not be mutated again
    pub fn is_finalized(&self) -> bool {
        !matches!(self, OrderStatus::Created)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(OrderStatus::Created),
            "completed" => Ok(OrderStatus::Completed),
            "failed" => Ok(OrderStatus::Failed),
            _ => Err(format!("unknown order status: {}", s)),
        }
    }
}

/// Payer details captured at initiation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payer {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// One attempted payment, keyed by the gateway's order id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentOrder {
    pub id: Uuid,
    pub payer_name: String,
    pub payer_email: String,
    pub payer_contact: String,
    pub amount_minor_units: i64,
    pub currency: String,
    pub receipt: String,
    pub remote_order_id: String,
    pub remote_payment_id: Option<String>,
    pub remote_signature: Option<String>,
    pub status: OrderStatus,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentOrder {
    /// Build the local record for an order the gateway has just accepted
    pub fn created(
        payer: Payer,
        amount_minor_units: i64,
        currency: impl Into<String>,
        receipt: impl Into<String>,
        remote_order_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            payer_name: payer.name,
            payer_email: payer.email,
            payer_contact: payer.contact,
            amount_minor_units,
            currency: currency.into(),
            receipt: receipt.into(),
            remote_order_id: remote_order_id.into(),
            remote_payment_id: None,
            remote_signature: None,
            status: OrderStatus::Created,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Produce the record after `transition`, or the current status if already finalized
    pub fn apply(
        &self,
        transition: &StatusTransition,
        at: DateTime<Utc>,
    ) -> Result<PaymentOrder, OrderStatus> {
        if self.status.is_finalized() {
            return Err(self.status);
        }

        let mut next = self.clone();
        match transition {
            StatusTransition::Complete { remote_payment_id, remote_signature } => {
                next.remote_payment_id = Some(remote_payment_id.clone());
                next.remote_signature = Some(remote_signature.clone());
                next.status = OrderStatus::Completed;
            }
            StatusTransition::Fail { reason } => {
                next.failure_reason = Some(reason.clone());
                next.status = OrderStatus::Failed;
            }
        }
        next.updated_at = at;
        Ok(next)
    }

    /// Still `created` and older than `ttl` at `now`
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.status == OrderStatus::Created && self.created_at + ttl <= now
    }
}

/// The only mutations a record ever undergoes, each from `created`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    Complete { remote_payment_id: String, remote_signature: String },
    Fail { reason: String },
}

/// Result of a guarded transition against the record store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied(PaymentOrder),
    AlreadyFinalized(PaymentOrder),
    NotFound,
}

/// Callback relayed by the client after checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCallback {
    pub remote_payment_id: String,
    pub remote_order_id: String,
    pub remote_signature: String,
}

/// Convert a major-unit amount to minor units, `None` if it does not fit an i64
pub fn to_minor_units(amount: f64) -> Option<i64> {
    let minor = (amount * 100.0).round();
    if !minor.is_finite() || minor < i64::MIN as f64 || minor >= i64::MAX as f64 {
        return None;
    }
    Some(minor as i64)
}

/// Receipt token sent to the gateway: `order_<unix ts>_<4 digits>`
pub fn generate_receipt(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::rng().random_range(1000..=9999);
    format_receipt(now.timestamp(), suffix)
}

pub(crate) fn format_receipt(timestamp: i64, suffix: u16) -> String {
    format!("order_{}_{}", timestamp, suffix)
}

//! Payment service orchestrating order initiation, callback verification, status lookup and expiry

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::payments::{
    generate_receipt, to_minor_units, OrderStatus, Payer, PaymentCallback, PaymentOrder,
    StatusTransition, TransitionOutcome,
};
use crate::domain::ports::{GatewayOrderRequest, OrderNotes, PaymentGateway, PaymentOrderStore};
use crate::infrastructure::adapters::monitoring::{callback_outcome, MonitoringAdapter};
use crate::shared::error::{AppError, AppResult};
use crate::shared::logging::LoggingUtils;
use crate::shared::validation::{lenient, FieldViolation, ValidationFailure, ValidationUtils};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use validator::{Validate, ValidationError};

/// Reason recorded on orders failed by the expiry sweep
pub const EXPIRED_REASON: &str = "expired";

fn not_blank(value: &str) -> Result<(), ValidationError> {
    ValidationUtils::validate_not_blank(value)
}

/// Payer details and amount submitted to start a checkout
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct InitiateOrderRequest {
    #[serde(deserialize_with = "lenient::text")]
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    #[validate(email, length(max = 255))]
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    #[validate(length(min = 1, max = 15), custom(function = "not_blank"))]
    pub contact: String,
    /// Major currency units
    #[serde(deserialize_with = "lenient::amount")]
    pub amount: Option<f64>,
}

/// Checkout prefill handed back to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Everything the client needs to open the gateway checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InitiateOrderResponse {
    pub order_id: String,
    /// Minor units
    pub amount: i64,
    pub currency: String,
    pub key: String,
    pub name: String,
    pub description: String,
    pub receipt: String,
    pub prefill: Prefill,
}

/// Runtime settings for the payment flow
#[derive(Debug, Clone)]
pub struct PaymentsSettings {
    pub currency: String,
    pub merchant_name: String,
    pub max_amount_minor_units: i64,
    pub order_ttl: Duration,
}

impl PaymentsSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            currency: config.gateway.currency.clone(),
            merchant_name: config.gateway.merchant_name.clone(),
            max_amount_minor_units: config.payments.max_amount_minor_units,
            order_ttl: Duration::minutes(config.payments.expiry.order_ttl_minutes),
        }
    }
}

impl Default for PaymentsSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

pub struct PaymentsService {
    gateway: Arc<dyn PaymentGateway>,
    store: Arc<dyn PaymentOrderStore>,
    monitoring: Arc<MonitoringAdapter>,
    settings: PaymentsSettings,
}

impl PaymentsService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        store: Arc<dyn PaymentOrderStore>,
        monitoring: Arc<MonitoringAdapter>,
        settings: PaymentsSettings,
    ) -> Self {
        Self { gateway, store, monitoring, settings }
    }

    pub fn settings(&self) -> &PaymentsSettings {
        &self.settings
    }

    /// Check every field, returning the amount in minor units when all pass
    fn validate_initiation(&self, request: &InitiateOrderRequest) -> AppResult<i64> {
        let mut violations: Vec<FieldViolation> = match request.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => ValidationFailure::from(&errors).fields().to_vec(),
        };

        let amount = match request.amount {
            None => Err(FieldViolation::new("amount", "numeric")),
            Some(major) if !major.is_finite() || major <= 0.0 => {
                Err(FieldViolation::new("amount", "range"))
            }
            Some(major) => match to_minor_units(major) {
                Some(minor) if (1..=self.settings.max_amount_minor_units).contains(&minor) => {
                    Ok(minor)
                }
                _ => Err(FieldViolation::new("amount", "range")),
            },
        };

        match amount {
            Ok(minor) if violations.is_empty() => Ok(minor),
            Ok(_) => Err(AppError::Validation(ValidationFailure::new(violations))),
            Err(violation) => {
                violations.push(violation);
                Err(AppError::Validation(ValidationFailure::new(violations)))
            }
        }
    }

    /// Create the remote order and persist the local `created` record
    pub async fn initiate_order(
        &self,
        request: InitiateOrderRequest,
    ) -> AppResult<InitiateOrderResponse> {
        let amount_minor_units = self.validate_initiation(&request)?;

        let now = Utc::now();
        let receipt = generate_receipt(now);
        let payer = Payer {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            contact: request.contact.trim().to_string(),
        };

        let gateway_request = GatewayOrderRequest {
            receipt: receipt.clone(),
            amount: amount_minor_units,
            currency: self.settings.currency.clone(),
            notes: OrderNotes {
                name: payer.name.clone(),
                email: payer.email.clone(),
                contact: payer.contact.clone(),
            },
        };

        let remote = match self.gateway.create_order(&gateway_request).await {
            Ok(remote) => remote,
            Err(e) => {
                self.monitoring.record_gateway_failure();
                LoggingUtils::log_gateway_failure(&receipt, &e);
                return Err(e);
            }
        };

        if remote.amount.is_some_and(|amount| amount != amount_minor_units) {
            warn!(
                remote_order_id = %remote.id,
                requested = amount_minor_units,
                "Gateway echoed a different order amount"
            );
        }

        let order = PaymentOrder::created(
            payer.clone(),
            amount_minor_units,
            self.settings.currency.clone(),
            receipt.clone(),
            remote.id.clone(),
            now,
        );

        if let Err(e) = self.store.insert(&order).await {
            // TODO: hand orphaned remote orders to a reconciliation job that fetches them
            // back from the gateway
            self.monitoring.record_orphaned_order();
            LoggingUtils::log_orphaned_order(&order.remote_order_id, &receipt, &e);
            return Err(e);
        }

        self.monitoring.record_order_initiated();
        LoggingUtils::log_order_initiated(&order);

        Ok(InitiateOrderResponse {
            order_id: order.remote_order_id,
            amount: order.amount_minor_units,
            currency: order.currency,
            key: self.gateway.key_id().to_string(),
            name: self.settings.merchant_name.clone(),
            description: format!("Payment for Order #{}", receipt),
            receipt,
            prefill: Prefill { name: payer.name, email: payer.email, contact: payer.contact },
        })
    }

    /// Verify the callback signature and complete the matching `created` order
    pub async fn verify_callback(&self, callback: PaymentCallback) -> AppResult<PaymentOrder> {
        let outcome = self.complete_verified(&callback).await;

        let label = match &outcome {
            Ok(_) => callback_outcome::COMPLETED,
            Err(AppError::Signature) => callback_outcome::VERIFICATION_FAILED,
            Err(AppError::NotFound { .. }) => callback_outcome::NOT_FOUND,
            Err(AppError::Conflict { .. }) => callback_outcome::ALREADY_FINALIZED,
            Err(_) => callback_outcome::ERROR,
        };
        self.monitoring.record_callback(label);
        LoggingUtils::log_callback_outcome(&callback.remote_order_id, label);

        outcome
    }

    async fn complete_verified(&self, callback: &PaymentCallback) -> AppResult<PaymentOrder> {
        self.gateway.verify_payment_signature(
            &callback.remote_order_id,
            &callback.remote_payment_id,
            &callback.remote_signature,
        )?;

        let transition = StatusTransition::Complete {
            remote_payment_id: callback.remote_payment_id.clone(),
            remote_signature: callback.remote_signature.clone(),
        };

        match self.store.transition(&callback.remote_order_id, &transition).await? {
            TransitionOutcome::Applied(order) => Ok(order),
            TransitionOutcome::AlreadyFinalized(order) => Err(AppError::Conflict {
                remote_order_id: order.remote_order_id,
                status: order.status,
            }),
            TransitionOutcome::NotFound => Err(AppError::NotFound {
                remote_order_id: callback.remote_order_id.clone(),
            }),
        }
    }

    /// Read-only lookup by the gateway's order id
    pub async fn order_status(&self, remote_order_id: &str) -> AppResult<PaymentOrder> {
        let not_found = || AppError::NotFound { remote_order_id: remote_order_id.to_string() };

        if !ValidationUtils::is_plausible_identifier(remote_order_id) {
            return Err(not_found());
        }

        self.store
            .find_by_remote_order_id(remote_order_id)
            .await?
            .ok_or_else(not_found)
    }

    /// Fail every `created` order older than the configured TTL at `now`
    pub async fn expire_stale_orders(&self, now: DateTime<Utc>) -> AppResult<Vec<PaymentOrder>> {
        let candidates = self.store.list_by_status(OrderStatus::Created).await?;
        let transition = StatusTransition::Fail { reason: EXPIRED_REASON.to_string() };

        let mut expired = Vec::new();
        for order in candidates.iter().filter(|o| o.is_stale(now, self.settings.order_ttl)) {
            match self.store.transition(&order.remote_order_id, &transition).await {
                Ok(TransitionOutcome::Applied(order)) => expired.push(order),
                Ok(TransitionOutcome::AlreadyFinalized(order)) => {
                    debug!(
                        remote_order_id = %order.remote_order_id,
                        status = %order.status,
                        "Order finalized before expiry"
                    );
                }
                Ok(TransitionOutcome::NotFound) => {}
                Err(e) => {
                    error!(
                        remote_order_id = %order.remote_order_id,
                        "Failed to expire payment order: {}",
                        e
                    );
                }
            }
        }

        if !expired.is_empty() {
            self.monitoring.record_orders_expired(expired.len() as u64);
            info!(count = expired.len(), "Expired stale payment orders");
        }
        Ok(expired)
    }

    /// Whether the record store is reachable
    pub async fn store_available(&self) -> bool {
        self.store.ping().await
    }

    pub fn monitoring(&self) -> &Arc<MonitoringAdapter> {
        &self.monitoring
    }
}

//! Razorpay gateway adapter
//!
//! Creates remote orders over the gateway's REST API and verifies checkout
//! callback signatures with the shared key secret.

use crate::{
    config::app_config::GatewayConfig,
    domain::ports::{GatewayOrder, GatewayOrderRequest, PaymentGateway},
    shared::error::{AppError, AppResult},
};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, error, info};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signer/verifier for `order_id|payment_id` callback payloads
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl SignatureVerifier {
    pub fn new(secret: &str) -> Self {
        Self { secret: secret.as_bytes().to_vec() }
    }

    fn mac(&self, remote_order_id: &str, remote_payment_id: &str) -> AppResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(format!("invalid HMAC key: {}", e)))?;
        mac.update(remote_order_id.as_bytes());
        mac.update(b"|");
        mac.update(remote_payment_id.as_bytes());
        Ok(mac)
    }

    /// Hex-encoded signature the gateway would issue for this pair
    pub fn sign(&self, remote_order_id: &str, remote_payment_id: &str) -> AppResult<String> {
        let mac = self.mac(remote_order_id, remote_payment_id)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time check of a hex signature
    pub fn verify(
        &self,
        remote_order_id: &str,
        remote_payment_id: &str,
        signature: &str,
    ) -> AppResult<()> {
        let expected = hex::decode(signature.trim()).map_err(|_| AppError::Signature)?;
        self.mac(remote_order_id, remote_payment_id)?
            .verify_slice(&expected)
            .map_err(|_| AppError::Signature)
    }
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Map a non-success gateway response to a `Gateway` error with the gateway's own description
pub fn parse_gateway_error(status: u16, body: &str) -> AppError {
    match serde_json::from_str::<GatewayErrorBody>(body) {
        Ok(parsed) => {
            let code = parsed.error.code.unwrap_or_else(|| "UNKNOWN_ERROR".to_string());
            let description =
                parsed.error.description.unwrap_or_else(|| "no description".to_string());
            AppError::Gateway(format!("{} {}: {}", status, code, description))
        }
        Err(_) => AppError::Gateway(format!("{} unexpected response from gateway", status)),
    }
}

/// Adapter for the Razorpay orders API
pub struct RazorpayGateway {
    config: GatewayConfig,
    http_client: Client,
    verifier: SignatureVerifier,
}

impl RazorpayGateway {
    /// Create a new gateway adapter
    pub fn new(config: &GatewayConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            http_client,
            verifier: SignatureVerifier::new(&config.key_secret),
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: &GatewayOrderRequest) -> AppResult<GatewayOrder> {
        let url = self.orders_url();
        debug!(
            receipt = %request.receipt,
            amount = request.amount,
            "Creating gateway order at {}",
            url
        );

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach payment gateway: {}", e);
                AppError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_gateway_error(status.as_u16(), &body));
        }

        let order: GatewayOrder = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("Invalid gateway response: {}", e)))?;

        if order.id.trim().is_empty() {
            return Err(AppError::Gateway("Gateway returned an empty order id".to_string()));
        }

        info!(remote_order_id = %order.id, receipt = %request.receipt, "Gateway order created");
        Ok(order)
    }

    fn verify_payment_signature(
        &self,
        remote_order_id: &str,
        remote_payment_id: &str,
        signature: &str,
    ) -> AppResult<()> {
        self.verifier.verify(remote_order_id, remote_payment_id, signature)
    }

    fn key_id(&self) -> &str {
        &self.config.key_id
    }
}

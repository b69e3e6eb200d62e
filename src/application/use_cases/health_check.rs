use crate::{
    application::services::PaymentsService,
    domain::health::*,
    shared::error::AppResult,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

/// Health check use case
pub struct HealthCheckUseCase {
    started_at: Instant,
}

impl HealthCheckUseCase {
    /// Create a new health check use case
    pub fn new() -> Self {
        Self { started_at: Instant::now() }
    }

    /// Execute health check, probing the record store
    pub async fn execute(
        &self,
        payments: Option<Arc<PaymentsService>>,
    ) -> AppResult<HealthResponse> {
        let mut status = HealthStatus::Healthy;
        let mut details = json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION"),
            "uptime": self.get_uptime(),
        });

        match payments {
            Some(service) => {
                let store_available = service.store_available().await;
                details["store"] = json!({
                    "available": store_available,
                    "status": if store_available { "connected" } else { "disconnected" }
                });

                if !store_available {
                    status = HealthStatus::Unhealthy;
                    details["warnings"] = json!([
                        "Payment order store is unreachable",
                        "Order initiation and callback verification will fail"
                    ]);
                }

                details["payments"] = json!(service.monitoring().summary());
            }
            None => {
                details["store"] = json!({
                    "available": false,
                    "status": "no_service",
                });
                status = HealthStatus::Degraded;
            }
        }

        Ok(HealthResponse { status, details })
    }

    fn get_uptime(&self) -> String {
        let secs = self.started_at.elapsed().as_secs();
        let days = secs / 86400;
        let hours = (secs % 86400) / 3600;
        let minutes = (secs % 3600) / 60;
        format!("{}d {}h {}m", days, hours, minutes)
    }
}

impl Default for HealthCheckUseCase {
    fn default() -> Self {
        Self::new()
    }
}

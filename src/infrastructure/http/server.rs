//! HTTP server implementation for reverse proxy deployment
//!
//! Wires the gateway client, the record store and the payments service into the
//! warp routes. TLS termination and CORS are left to the reverse proxy.

use crate::{
    application::{
        expiry_worker::start_expiry_worker,
        services::{PaymentsService, PaymentsSettings},
        use_cases::HealthCheckUseCase,
    },
    config::{AppConfig, StoreBackend},
    domain::ports::{PaymentGateway, PaymentOrderStore},
    infrastructure::{
        adapters::{InMemoryPaymentStore, MonitoringAdapter, RazorpayGateway, RedisPaymentStore},
        http::routes::RouteBuilder,
    },
    middleware::RateLimitMiddleware,
    shared::error::{AppError, AppResult},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use warp::{Filter, Reply};

/// HTTP server implementation optimized for reverse proxy deployment
pub struct HttpServer {
    config: AppConfig,
    payments_service: Arc<PaymentsService>,
    health_use_case: Arc<HealthCheckUseCase>,
    monitoring: Arc<MonitoringAdapter>,
    rate_limit: Arc<RateLimitMiddleware>,
}

impl HttpServer {
    /// Create the server with the configured gateway and record store
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayGateway::new(&config.gateway)?);

        let store: Arc<dyn PaymentOrderStore> = match config.store.backend {
            StoreBackend::Memory => {
                info!("Using in-memory payment order store");
                Arc::new(InMemoryPaymentStore::new())
            }
            StoreBackend::Redis => {
                info!("Using Redis payment order store");
                let store =
                    RedisPaymentStore::connect(&config.store.redis_url, &config.store.key_prefix)
                        .await?;
                Arc::new(store)
            }
        };

        Self::with_components(config, gateway, store)
    }

    /// Create the server around explicit collaborators
    pub fn with_components(
        config: AppConfig,
        gateway: Arc<dyn PaymentGateway>,
        store: Arc<dyn PaymentOrderStore>,
    ) -> AppResult<Self> {
        let monitoring = Arc::new(MonitoringAdapter::new()?);
        let payments_service = Arc::new(PaymentsService::new(
            gateway,
            store,
            monitoring.clone(),
            PaymentsSettings::from_config(&config),
        ));
        let rate_limit =
            Arc::new(RateLimitMiddleware::new(&config.rate_limit, Some(monitoring.clone()))?);

        Ok(Self {
            config,
            payments_service,
            health_use_case: Arc::new(HealthCheckUseCase::new()),
            monitoring,
            rate_limit,
        })
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn payments_service(&self) -> Arc<PaymentsService> {
        self.payments_service.clone()
    }

    /// Run the HTTP server, and the expiry worker when enabled
    #[instrument(skip(self))]
    pub async fn run(self) -> AppResult<()> {
        let addr: std::net::SocketAddr = self
            .config
            .server_address()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;

        let expiry = &self.config.payments.expiry;
        let _expiry_worker = if expiry.enabled {
            Some(start_expiry_worker(
                self.payments_service.clone(),
                Duration::from_secs(expiry.sweep_interval_seconds),
            ))
        } else {
            info!("Payment order expiry worker disabled");
            None
        };

        info!("Starting HTTP server on {}", addr);
        warp::serve(self.routes()).run(addr).await;

        Ok(())
    }

    /// All application routes, with rejection recovery applied
    pub fn routes(
        &self,
    ) -> impl Filter<Extract = impl Reply, Error = std::convert::Infallible> + Clone {
        RouteBuilder::build_routes(
            &self.config,
            self.payments_service.clone(),
            self.health_use_case.clone(),
            self.monitoring.clone(),
            self.rate_limit.clone(),
        )
    }
}

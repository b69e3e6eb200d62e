use crate::application::services::PaymentsService;
use crate::domain::payments::PaymentOrder;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Starts the stale order expiry worker. The returned handle runs until aborted.
pub fn start_expiry_worker(
    service: Arc<PaymentsService>,
    sweep_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(sweep_interval);
        info!(
            interval_secs = sweep_interval.as_secs(),
            ttl_minutes = service.settings().order_ttl.num_minutes(),
            "Payment order expiry worker started"
        );
        loop {
            timer.tick().await;
            debug!("Running payment order expiry sweep");
            match service.expire_stale_orders(Utc::now()).await {
                Ok(expired) if expired.is_empty() => {}
                Ok(expired) => {
                    info!("{} payment orders expired", expired.len());
                    debug!("Expired orders: {}", order_list(&expired));
                }
                Err(e) => error!("Error running payment order expiry sweep: {}", e),
            }
        }
    })
}

fn order_list(orders: &[PaymentOrder]) -> String {
    orders
        .iter()
        .map(|o| {
            format!("[{}] remote_order_id: {} receipt: {}", o.id, o.remote_order_id, o.receipt)
        })
        .collect::<Vec<String>>()
        .join(", ")
}

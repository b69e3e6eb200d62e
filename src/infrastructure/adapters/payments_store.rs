//! Payment order stores (in-memory and Redis-backed)

use crate::domain::payments::{OrderStatus, PaymentOrder, StatusTransition, TransitionOutcome};
use crate::domain::ports::PaymentOrderStore;
use crate::shared::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Process-local store; the write lock makes each transition a single atomic step
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    orders: Arc<RwLock<HashMap<String, PaymentOrder>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentOrderStore for InMemoryPaymentStore {
    async fn insert(&self, order: &PaymentOrder) -> AppResult<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.remote_order_id) {
            return Err(AppError::Store(format!(
                "duplicate remote order id {}",
                order.remote_order_id
            )));
        }
        orders.insert(order.remote_order_id.clone(), order.clone());
        Ok(())
    }

    async fn find_by_remote_order_id(
        &self,
        remote_order_id: &str,
    ) -> AppResult<Option<PaymentOrder>> {
        Ok(self.orders.read().await.get(remote_order_id).cloned())
    }

    async fn transition(
        &self,
        remote_order_id: &str,
        transition: &StatusTransition,
    ) -> AppResult<TransitionOutcome> {
        let mut orders = self.orders.write().await;
        let Some(current) = orders.get(remote_order_id) else {
            return Ok(TransitionOutcome::NotFound);
        };

        match current.apply(transition, Utc::now()) {
            Ok(next) => {
                orders.insert(remote_order_id.to_string(), next.clone());
                Ok(TransitionOutcome::Applied(next))
            }
            Err(_) => Ok(TransitionOutcome::AlreadyFinalized(current.clone())),
        }
    }

    async fn list_by_status(&self, status: OrderStatus) -> AppResult<Vec<PaymentOrder>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<PaymentOrder> =
            orders.values().filter(|o| o.status == status).cloned().collect();
        matching.sort_by_key(|o| o.created_at);
        Ok(matching)
    }

    async fn ping(&self) -> bool {
        true
    }
}

/// Store ARGV[1] at KEYS[1] unless it exists, indexing ARGV[2] in the status set KEYS[2]
const INSERT_IF_ABSENT: &str = r#"
if redis.call('SET', KEYS[1], ARGV[1], 'NX') then
    redis.call('SADD', KEYS[2], ARGV[2])
    return 1
end
return 0
"#;

/// Replace KEYS[1] with ARGV[2] only if it still equals ARGV[1], moving ARGV[3]
/// from status set KEYS[2] to KEYS[3]
const COMPARE_AND_SWAP: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    redis.call('SET', KEYS[1], ARGV[2])
    redis.call('SREM', KEYS[2], ARGV[3])
    redis.call('SADD', KEYS[3], ARGV[3])
    return 1
end
return 0
"#;

/// Attempts before a contended transition is reported as a store error
const MAX_CAS_ATTEMPTS: usize = 5;

/// Redis-backed store: one JSON value per order plus one id set per status
#[derive(Clone)]
pub struct RedisPaymentStore {
    redis: ConnectionManager,
    key_prefix: String,
    insert: Arc<redis::Script>,
    cas: Arc<redis::Script>,
}

impl RedisPaymentStore {
    /// Connect to Redis and build the store
    pub async fn connect(redis_url: &str, key_prefix: &str) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Config(format!("Invalid Redis URL: {}", e)))?;
        let redis = ConnectionManager::new(client).await?;
        Ok(Self::new(redis, key_prefix))
    }

    pub fn new(redis: ConnectionManager, key_prefix: &str) -> Self {
        Self {
            redis,
            key_prefix: key_prefix.to_string(),
            insert: Arc::new(redis::Script::new(INSERT_IF_ABSENT)),
            cas: Arc::new(redis::Script::new(COMPARE_AND_SWAP)),
        }
    }

    fn key(&self, remote_order_id: &str) -> String {
        format!("{}:order:{}", self.key_prefix, remote_order_id)
    }

    fn status_key(&self, status: OrderStatus) -> String {
        format!("{}:status:{}", self.key_prefix, status.as_str())
    }

    async fn read_raw(&self, remote_order_id: &str) -> AppResult<Option<String>> {
        let mut conn = self.redis.clone();
        let raw: Option<String> = conn.get(self.key(remote_order_id)).await?;
        Ok(raw)
    }
}

#[async_trait]
impl PaymentOrderStore for RedisPaymentStore {
    async fn insert(&self, order: &PaymentOrder) -> AppResult<()> {
        let serialized = serde_json::to_string(order)
            .map_err(|e| AppError::Internal(format!("serialize payment order: {}", e)))?;

        let mut conn = self.redis.clone();
        let created: i32 = self
            .insert
            .key(self.key(&order.remote_order_id))
            .key(self.status_key(order.status))
            .arg(&serialized)
            .arg(&order.remote_order_id)
            .invoke_async(&mut conn)
            .await?;

        if created == 0 {
            return Err(AppError::Store(format!(
                "duplicate remote order id {}",
                order.remote_order_id
            )));
        }
        Ok(())
    }

    async fn find_by_remote_order_id(
        &self,
        remote_order_id: &str,
    ) -> AppResult<Option<PaymentOrder>> {
        match self.read_raw(remote_order_id).await? {
            Some(raw) => {
                let order = serde_json::from_str(&raw)
                    .map_err(|e| AppError::Store(format!("deserialize payment order: {}", e)))?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    async fn transition(
        &self,
        remote_order_id: &str,
        transition: &StatusTransition,
    ) -> AppResult<TransitionOutcome> {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let Some(raw) = self.read_raw(remote_order_id).await? else {
                return Ok(TransitionOutcome::NotFound);
            };
            let current: PaymentOrder = serde_json::from_str(&raw)
                .map_err(|e| AppError::Store(format!("deserialize payment order: {}", e)))?;

            let next = match current.apply(transition, Utc::now()) {
                Ok(next) => next,
                Err(_) => return Ok(TransitionOutcome::AlreadyFinalized(current)),
            };
            let serialized = serde_json::to_string(&next)
                .map_err(|e| AppError::Internal(format!("serialize payment order: {}", e)))?;

            let mut conn = self.redis.clone();
            let swapped: i32 = self
                .cas
                .key(self.key(remote_order_id))
                .key(self.status_key(current.status))
                .key(self.status_key(next.status))
                .arg(&raw)
                .arg(&serialized)
                .arg(remote_order_id)
                .invoke_async(&mut conn)
                .await?;

            if swapped == 1 {
                return Ok(TransitionOutcome::Applied(next));
            }
            debug!(
                remote_order_id = %remote_order_id,
                attempt,
                "Concurrent update detected, re-reading order"
            );
        }

        warn!(remote_order_id = %remote_order_id, "Transition abandoned after repeated contention");
        Err(AppError::Store(format!("contention on payment order {}", remote_order_id)))
    }

    async fn list_by_status(&self, status: OrderStatus) -> AppResult<Vec<PaymentOrder>> {
        let mut conn = self.redis.clone();
        let ids: Vec<String> = conn.smembers(self.status_key(status)).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| self.key(id)).collect();
        let values: Vec<Option<String>> =
            redis::cmd("MGET").arg(&keys).query_async(&mut conn).await?;

        let mut matching = Vec::new();
        for raw in values.into_iter().flatten() {
            match serde_json::from_str::<PaymentOrder>(&raw) {
                Ok(order) if order.status == status => matching.push(order),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable payment order record: {}", e),
            }
        }
        matching.sort_by_key(|o| o.created_at);
        Ok(matching)
    }

    async fn ping(&self) -> bool {
        let mut conn = self.redis.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await.is_ok()
    }
}

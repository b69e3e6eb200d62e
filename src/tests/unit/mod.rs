//! Unit tests for the payment order flow
//!
//! Exercised against the in-memory store and the mock gateway.

use crate::{
    application::services::payments_service::EXPIRED_REASON,
    domain::payments::{OrderStatus, Payer, PaymentCallback, PaymentOrder},
    domain::ports::PaymentOrderStore,
    infrastructure::adapters::MonitoringAdapter,
    application::services::{PaymentsService, PaymentsSettings},
    shared::error::AppError,
    tests::{
        common::{fixtures::*, FailingInsertStore, FailingTransitionStore, MockGateway, TestHarness},
        config::init,
    },
};
use chrono::{Duration, Utc};
use futures::future::join_all;
use std::sync::Arc;

mod initiation {
    use super::*;

    #[tokio::test]
    async fn test_valid_initiation_creates_one_record() {
        init();
        let harness = TestHarness::new();

        let response = harness.service.initiate_order(ram_request()).await.unwrap();

        let orders = harness.all_orders().await;
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.remote_order_id, response.order_id);
        assert_eq!(order.amount_minor_units, 50_000);
        assert!(order.remote_payment_id.is_none());
        assert!(order.remote_signature.is_none());
        assert_eq!(harness.gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_initiation_response_and_gateway_request() {
        let harness = TestHarness::new();

        let response = harness.service.initiate_order(ram_request()).await.unwrap();
        assert_eq!(response.amount, 50_000);
        assert_eq!(response.currency, "INR");
        assert_eq!(response.key, "rzp_test_ABC");
        assert_eq!(response.name, "Payment Order Server");
        assert_eq!(response.description, format!("Payment for Order #{}", response.receipt));
        assert_eq!(response.prefill.email, "ram@x.com");
        assert_eq!(response.prefill.contact, "9999999999");

        let sent = harness.gateway.last_request().unwrap();
        assert_eq!(sent.amount, 50_000);
        assert_eq!(sent.receipt, response.receipt);
        assert_eq!(sent.notes.name, "Ram");
        assert!(sent.receipt.starts_with("order_"));
    }

    #[tokio::test]
    async fn test_invalid_initiation_lists_every_field_and_skips_gateway() {
        let harness = TestHarness::new();

        let err = harness
            .service
            .initiate_order(initiate_request("", "not-an-email", "9999999999", 0.0))
            .await
            .unwrap_err();

        match err {
            AppError::Validation(failure) => {
                assert_eq!(failure.field_names(), vec!["amount", "email", "name"]);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert_eq!(harness.gateway.call_count(), 0);
        assert!(harness.all_orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_negative_and_missing_amounts_rejected() {
        let harness = TestHarness::new();

        for amount in [-5.0, 0.004, f64::NAN] {
            let err = harness
                .service
                .initiate_order(initiate_request("Ram", "ram@x.com", "9999999999", amount))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                AppError::Validation(ref f) if f.field_names() == vec!["amount"]
            ));
        }

        let mut missing = ram_request();
        missing.amount = None;
        assert!(matches!(
            harness.service.initiate_order(missing).await,
            Err(AppError::Validation(ref f)) if f.contains("amount")
        ));
        assert_eq!(harness.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_body_reports_all_fields() {
        let harness = TestHarness::new();
        let request = serde_json::from_str("{}").unwrap();

        match harness.service.initiate_order(request).await {
            Err(AppError::Validation(failure)) => {
                assert_eq!(failure.field_names(), vec!["amount", "contact", "email", "name"]);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_amount_above_maximum_rejected() {
        let mut config = crate::tests::config::test_config();
        config.payments.max_amount_minor_units = 100_000;
        let harness = TestHarness::with_config(&config);

        let err = harness
            .service
            .initiate_order(initiate_request("Ram", "ram@x.com", "9999999999", 1000.01))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f.contains("amount")));
        let request = initiate_request("Ram", "ram@x.com", "9999999999", 1000.0);
        assert!(harness.service.initiate_order(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_no_record() {
        let harness = TestHarness::new();
        harness
            .gateway
            .fail_with(AppError::Gateway("400 BAD_REQUEST_ERROR: invalid amount".into()));

        let err = harness.service.initiate_order(ram_request()).await.unwrap_err();
        assert!(matches!(err, AppError::Gateway(ref msg) if msg.contains("invalid amount")));
        assert!(harness.all_orders().await.is_empty());
        assert_eq!(harness.gateway.call_count(), 1);
        assert_eq!(harness.monitoring.summary().gateway_failures, 1);
        assert_eq!(harness.monitoring.summary().orders_initiated, 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_counted_as_orphan() {
        let gateway = Arc::new(MockGateway::new());
        let monitoring = Arc::new(MonitoringAdapter::new().unwrap());
        let service = PaymentsService::new(
            gateway.clone(),
            Arc::new(FailingInsertStore::default()),
            monitoring.clone(),
            PaymentsSettings::default(),
        );

        let err = service.initiate_order(ram_request()).await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(monitoring.summary().orders_orphaned, 1);
        assert!(!service.store_available().await);
    }
}

mod callbacks {
    use super::*;

    #[tokio::test]
    async fn test_reference_scenario_complete_then_replay() {
        init();
        let harness = TestHarness::new();
        let initiated = harness.service.initiate_order(ram_request()).await.unwrap();
        let order_id = initiated.order_id.clone();

        let created = harness.service.order_status(&order_id).await.unwrap();
        assert_eq!(created.amount_minor_units, 50_000);
        assert_eq!(created.status, OrderStatus::Created);

        let completed =
            harness.service.verify_callback(signed_callback(&order_id, "pay_001")).await.unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        assert_eq!(completed.remote_payment_id.as_deref(), Some("pay_001"));
        assert_eq!(completed.remote_signature, Some(sign(&order_id, "pay_001")));

        let replay = harness.service.verify_callback(signed_callback(&order_id, "pay_001")).await;
        assert!(matches!(
            replay,
            Err(AppError::Conflict { ref remote_order_id, status: OrderStatus::Completed })
                if *remote_order_id == order_id
        ));

        let after = harness.service.order_status(&order_id).await.unwrap();
        assert_eq!(after, completed);
    }

    #[tokio::test]
    async fn test_second_payment_id_does_not_overwrite() {
        let harness = TestHarness::new();
        let order_id = harness.service.initiate_order(ram_request()).await.unwrap().order_id;

        harness.service.verify_callback(signed_callback(&order_id, "pay_first")).await.unwrap();
        let second =
            harness.service.verify_callback(signed_callback(&order_id, "pay_second")).await;
        assert!(matches!(second, Err(AppError::Conflict { .. })));

        let stored = harness.service.order_status(&order_id).await.unwrap();
        assert_eq!(stored.remote_payment_id.as_deref(), Some("pay_first"));
    }

    #[tokio::test]
    async fn test_concurrent_deliveries_complete_once() {
        let harness = TestHarness::new();
        let order_id = harness.service.initiate_order(ram_request()).await.unwrap().order_id;

        let deliveries = (0..12).map(|i| {
            let service = harness.service.clone();
            let callback = signed_callback(&order_id, &format!("pay_{:03}", i));
            async move { service.verify_callback(callback).await }
        });
        let results = join_all(deliveries).await;

        let completed = results.iter().filter(|r| r.is_ok()).count();
        let conflicts =
            results.iter().filter(|r| matches!(r, Err(AppError::Conflict { .. }))).count();
        assert_eq!(completed, 1);
        assert_eq!(conflicts, 11);

        let winner = results.into_iter().find_map(|r| r.ok()).unwrap();
        let stored = harness.service.order_status(&order_id).await.unwrap();
        assert_eq!(stored.remote_payment_id, winner.remote_payment_id);
        assert_eq!(harness.monitoring.summary().callbacks_completed, 1);
    }

    #[tokio::test]
    async fn test_bad_signature_never_mutates() {
        let harness = TestHarness::new();
        let order_id = harness.service.initiate_order(ram_request()).await.unwrap().order_id;
        let before = harness.service.order_status(&order_id).await.unwrap();

        let forged = PaymentCallback {
            remote_payment_id: "pay_001".into(),
            remote_order_id: order_id.clone(),
            remote_signature: sign(&order_id, "pay_other"),
        };
        for _ in 0..5 {
            let result = harness.service.verify_callback(forged.clone()).await;
            assert!(matches!(result, Err(AppError::Signature)));
        }

        let after = harness.service.order_status(&order_id).await.unwrap();
        assert_eq!(after, before);
        assert_eq!(after.status, OrderStatus::Created);

        // A correctly signed callback still completes afterwards
        let callback = signed_callback(&order_id, "pay_001");
        assert!(harness.service.verify_callback(callback).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found_and_creates_nothing() {
        let harness = TestHarness::new();

        let result =
            harness.service.verify_callback(signed_callback("order_UNKNOWN", "pay_001")).await;
        assert!(matches!(
            result,
            Err(AppError::NotFound { ref remote_order_id }) if remote_order_id == "order_UNKNOWN"
        ));
        assert!(harness.all_orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_signature_checked_before_lookup() {
        let harness = TestHarness::new();
        let callback = PaymentCallback {
            remote_payment_id: "pay_001".into(),
            remote_order_id: "order_UNKNOWN".into(),
            remote_signature: "deadbeef".into(),
        };
        assert!(matches!(
            harness.service.verify_callback(callback).await,
            Err(AppError::Signature)
        ));
        assert_eq!(harness.monitoring.summary().callbacks_rejected, 1);
    }
}

mod status {
    use super::*;

    #[tokio::test]
    async fn test_status_lookup() {
        let harness = TestHarness::new();
        let order_id = harness.service.initiate_order(ram_request()).await.unwrap().order_id;

        let stored = harness.service.order_status(&order_id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Created);
        assert!(matches!(
            harness.service.order_status("order_missing").await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(harness.service.order_status("").await, Err(AppError::NotFound { .. })));
        assert!(matches!(
            harness.service.order_status("bad id").await,
            Err(AppError::NotFound { .. })
        ));
    }
}

mod expiry {
    use super::*;

    fn aged_order(remote_order_id: &str, age: Duration) -> PaymentOrder {
        PaymentOrder::created(
            Payer { name: "Sita".into(), email: "sita@x.com".into(), contact: "8888888888".into() },
            1_000,
            "INR",
            "order_1_1000",
            remote_order_id,
            Utc::now() - age,
        )
    }

    #[tokio::test]
    async fn test_only_stale_created_orders_expire() {
        let harness = TestHarness::new();
        let ttl = harness.service.settings().order_ttl;

        harness.store.insert(&aged_order("order_STALE", ttl + Duration::minutes(5))).await.unwrap();
        harness.store.insert(&aged_order("order_PAID", ttl + Duration::minutes(5))).await.unwrap();
        harness.service.verify_callback(signed_callback("order_PAID", "pay_001")).await.unwrap();
        let fresh_id = harness.service.initiate_order(ram_request()).await.unwrap().order_id;

        let expired = harness.service.expire_stale_orders(Utc::now()).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].remote_order_id, "order_STALE");
        assert_eq!(expired[0].status, OrderStatus::Failed);
        assert_eq!(expired[0].failure_reason.as_deref(), Some(EXPIRED_REASON));

        let paid = harness.service.order_status("order_PAID").await.unwrap();
        let fresh = harness.service.order_status(&fresh_id).await.unwrap();
        assert_eq!(paid.status, OrderStatus::Completed);
        assert_eq!(fresh.status, OrderStatus::Created);
        assert_eq!(harness.monitoring.summary().orders_expired, 1);

        let again = harness.service.expire_stale_orders(Utc::now()).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_callback_after_expiry_is_already_finalized() {
        let harness = TestHarness::new();
        let ttl = harness.service.settings().order_ttl;
        harness.store.insert(&aged_order("order_LATE", ttl * 2)).await.unwrap();

        harness.service.expire_stale_orders(Utc::now()).await.unwrap();

        let result =
            harness.service.verify_callback(signed_callback("order_LATE", "pay_001")).await;
        assert!(matches!(result, Err(AppError::Conflict { status: OrderStatus::Failed, .. })));
        let stored = harness.service.order_status("order_LATE").await.unwrap();
        assert!(stored.remote_payment_id.is_none());
    }

    #[tokio::test]
    async fn test_sweep_continues_past_store_errors() {
        let store = Arc::new(FailingTransitionStore::new("order_BROKEN"));
        let monitoring = Arc::new(MonitoringAdapter::new().unwrap());
        let service = PaymentsService::new(
            Arc::new(MockGateway::new()),
            store.clone(),
            monitoring.clone(),
            PaymentsSettings::default(),
        );
        let ttl = service.settings().order_ttl;

        store.insert(&aged_order("order_FIRST", ttl + Duration::minutes(30))).await.unwrap();
        store.insert(&aged_order("order_BROKEN", ttl + Duration::minutes(20))).await.unwrap();
        store.insert(&aged_order("order_LAST", ttl + Duration::minutes(10))).await.unwrap();

        let expired = service.expire_stale_orders(Utc::now()).await.unwrap();
        let ids: Vec<&str> = expired.iter().map(|o| o.remote_order_id.as_str()).collect();
        assert_eq!(ids, vec!["order_FIRST", "order_LAST"]);
        assert_eq!(monitoring.summary().orders_expired, 2);

        let broken = store.find_by_remote_order_id("order_BROKEN").await.unwrap().unwrap();
        assert_eq!(broken.status, OrderStatus::Created);
    }
}

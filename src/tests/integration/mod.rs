//! Integration tests for the payment order server
//!
//! Requests go through the full warp filter stack (routes, rate limiting,
//! rejection recovery) with the mock gateway behind the service.

use crate::{
    config::AppConfig,
    domain::payments::OrderStatus,
    domain::ports::PaymentOrderStore,
    infrastructure::{adapters::InMemoryPaymentStore, http::server::HttpServer},
    shared::error::AppError,
    tests::{
        common::{fixtures::*, MockGateway},
        config::{init, rate_limited_config, test_config},
    },
};
use serde_json::{json, Value};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::test::request;

struct TestApp {
    server: HttpServer,
    gateway: Arc<MockGateway>,
    store: Arc<InMemoryPaymentStore>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(test_config())
    }

    fn with_config(config: AppConfig) -> Self {
        init();
        let gateway = Arc::new(MockGateway::new());
        let store = Arc::new(InMemoryPaymentStore::new());
        let server = HttpServer::with_components(config, gateway.clone(), store.clone()).unwrap();
        Self { server, gateway, store }
    }

    async fn initiate(&self, body: &Value) -> (StatusCode, Value) {
        let res = request()
            .method("POST")
            .path("/payments/initiate-order")
            .json(body)
            .reply(&self.server.routes())
            .await;
        (res.status(), serde_json::from_slice(res.body()).unwrap())
    }

    async fn callback(&self, body: &Value) -> (StatusCode, Value) {
        let res = request()
            .method("POST")
            .path("/payments/verify-callback")
            .json(body)
            .reply(&self.server.routes())
            .await;
        (res.status(), serde_json::from_slice(res.body()).unwrap())
    }

    async fn status(&self, remote_order_id: &str) -> (StatusCode, Value) {
        let res = request()
            .method("GET")
            .path(&format!("/payments/order-status/{}", remote_order_id))
            .reply(&self.server.routes())
            .await;
        (res.status(), serde_json::from_slice(res.body()).unwrap())
    }
}

fn ram_body() -> Value {
    json!({"name": "Ram", "email": "ram@x.com", "contact": "9999999999", "amount": 500})
}

#[tokio::test]
async fn test_initiate_order_endpoint() {
    let app = TestApp::new();

    let (status, body) = app.initiate(&ram_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 50_000);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["key"], "rzp_test_ABC");
    assert_eq!(body["prefill"]["name"], "Ram");

    let order_id = body["order_id"].as_str().unwrap();
    let stored = app.store.find_by_remote_order_id(order_id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Created);
}

#[tokio::test]
async fn test_initiate_order_validation_error() {
    let app = TestApp::new();

    let (status, body) = app
        .initiate(&json!({"name": "", "email": "nope", "contact": "9999999999", "amount": -1}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");

    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["amount", "email", "name"]);
    assert_eq!(app.gateway.call_count(), 0);
}

fn field_names(body: &Value) -> Vec<String> {
    body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_wrong_typed_fields_are_listed_as_validation_errors() {
    let app = TestApp::new();

    let (status, body) = app
        .initiate(&json!({"name": "Ram", "email": "nope", "contact": 9999999999u64, "amount": 500}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(field_names(&body), vec!["contact", "email"]);

    let (status, body) = app
        .initiate(&json!({"name": 42, "email": "nope", "contact": "9999999999", "amount": 500}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(field_names(&body), vec!["email", "name"]);

    let (status, body) = app
        .initiate(&json!({
            "name": "Ram",
            "email": "ram@x.com",
            "contact": "9999999999",
            "amount": true
        }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(field_names(&body), vec!["amount"]);

    assert_eq!(app.gateway.call_count(), 0);
    assert!(app.store.list_by_status(OrderStatus::Created).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_typed_callback_field_is_validation_error() {
    let app = TestApp::new();

    let (status, body) = app
        .callback(&json!({
            "razorpay_payment_id": 12345,
            "razorpay_order_id": "order_TEST000001",
            "razorpay_signature": "abcd"
        }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(field_names(&body), vec!["razorpay_payment_id"]);
}

#[tokio::test]
async fn test_initiate_order_gateway_error() {
    let app = TestApp::new();
    app.gateway.fail_with(AppError::Gateway("503 unexpected response from gateway".into()));

    let (status, body) = app.initiate(&ram_body()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "gateway_error");
    assert!(body["message"].as_str().unwrap().contains("503"));
    assert!(app.store.list_by_status(OrderStatus::Created).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let res = request()
        .method("POST")
        .path("/payments/initiate-order")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&app.server.routes())
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.gateway.call_count(), 0);
}

#[tokio::test]
async fn test_callback_flow_over_http() {
    let app = TestApp::new();
    let (_, initiated) = app.initiate(&ram_body()).await;
    let order_id = initiated["order_id"].as_str().unwrap().to_string();

    let (status, body) = app.callback(&callback_json(&order_id, "pay_001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["payment_id"], "pay_001");

    let (status, body) = app.callback(&callback_json(&order_id, "pay_001")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_finalized");

    let (status, body) = app.status(&order_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["payment_id"], "pay_001");
    assert!(body.get("remote_signature").is_none());
}

#[tokio::test]
async fn test_callback_bad_signature_is_generic() {
    let app = TestApp::new();
    let (_, initiated) = app.initiate(&ram_body()).await;
    let order_id = initiated["order_id"].as_str().unwrap().to_string();

    let mut forged = callback_json(&order_id, "pay_001");
    forged["razorpay_signature"] = json!(sign(&order_id, "pay_999"));

    let (status, body) = app.callback(&forged).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "verification_failed");
    assert!(!body.to_string().contains(&order_id));

    let (_, stored) = app.status(&order_id).await;
    assert_eq!(stored["status"], "created");
}

#[tokio::test]
async fn test_callback_unknown_order() {
    let app = TestApp::new();
    let (status, body) = app.callback(&callback_json("order_NOPE", "pay_001")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(!body.to_string().contains("order_NOPE"));
}

#[tokio::test]
async fn test_callback_missing_fields() {
    let app = TestApp::new();
    let (status, body) = app.callback(&json!({"razorpay_order_id": "order_1"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_callback_form_encoded() {
    let app = TestApp::new();
    let (_, initiated) = app.initiate(&ram_body()).await;
    let order_id = initiated["order_id"].as_str().unwrap().to_string();
    let signature = sign(&order_id, "pay_form");

    let res = request()
        .method("POST")
        .path("/payments/verify-callback")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(format!(
            "razorpay_payment_id=pay_form&razorpay_order_id={}&razorpay_signature={}",
            order_id, signature
        ))
        .reply(&app.server.routes())
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn test_status_not_found() {
    let app = TestApp::new();
    let (status, body) = app.status("order_missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = TestApp::new();
    app.initiate(&ram_body()).await;

    let res = request().method("GET").path("/health").reply(&app.server.routes()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("content-security-policy"));
    let body: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["details"]["store"]["available"], true);

    let res = request().method("GET").path("/metrics").reply(&app.server.routes()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let text = String::from_utf8(res.body().to_vec()).unwrap();
    assert!(text.contains("payment_orders_initiated_total 1"));
}

#[tokio::test]
async fn test_rate_limit_rejects_burst_overflow() {
    let app = TestApp::with_config(rate_limited_config(2));
    let routes = app.server.routes();

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let res = request()
            .method("GET")
            .path("/payments/order-status/order_missing")
            .remote_addr("203.0.113.9:40000".parse().unwrap())
            .reply(&routes)
            .await;
        statuses.push(res.status());
    }

    assert_eq!(
        statuses,
        vec![StatusCode::NOT_FOUND, StatusCode::NOT_FOUND, StatusCode::TOO_MANY_REQUESTS]
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();
    let res = request()
        .method("GET")
        .path("/payments/nothing-here")
        .reply(&app.server.routes())
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["error"], "route_not_found");
}

use actix_web::{
    http::{header::ContentType, StatusCode},
    test::TestRequest,
};
use chrono::{Duration, Utc};
use elementpay_engine::{
    events::EventProducers,
    lifecycle::terminal_outcome,
    order_objects::OrderRequest,
    MemoryStore,
    OrderFlowApi,
    StoreError,
    WebhookApi,
};
use epg_common::Secret;
use serde_json::json;

use super::{
    helpers::{call, call_with, json, orders_api, post_json, webhook_api},
    mocks::MockStore,
};

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let (status, body) = call(&store, TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn create_and_fetch_order() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let req = post_json("/orders", &json!({"amount": 10.5, "currency": "USD", "token": "USDC", "note": "coffee"}));
    let (status, body) = call(&store, req).await;
    assert_eq!(status, StatusCode::OK);
    let order = json(&body);
    let order_id = order["order_id"].as_str().unwrap().to_string();
    assert!(order_id.starts_with("ord_"));
    assert_eq!(order["status"], "created");
    assert_eq!(order["amount"], 10.5);
    assert_eq!(order["currency"], "USD");
    assert_eq!(order["token"], "USDC");
    assert_eq!(order["note"], "coffee");
    assert!(order["created_at"].is_string());

    let (status, body) = call(&store, TestRequest::get().uri(&format!("/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), order);
}

#[actix_web::test]
async fn whole_amounts_stay_whole() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let (status, body) = call(&store, post_json("/orders", &json!({"amount": 12, "currency": "KES", "token": "cUSD"}))).await;
    assert_eq!(status, StatusCode::OK);
    let order = json(&body);
    assert_eq!(order["amount"], 12);
    assert!(order.get("note").is_none());
}

#[actix_web::test]
async fn validation_failures() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let cases = [
        (json!({"amount": -1, "currency": "USD", "token": "USDC"}), "invalid_amount"),
        (json!({"amount": 10, "token": "USDC"}), "invalid_currency"),
        (json!({"amount": 10, "currency": "USD", "token": " "}), "invalid_token"),
        (json!({"amount": 10.123, "currency": "USD", "token": "USDC"}), "invalid_amount_precision"),
        (json!({"amount": 10, "currency": "usd", "token": "USDC"}), "invalid_currency_format"),
        (json!({"amount": 10, "currency": "USD", "token": "USDC", "note": ["x"]}), "invalid_note"),
    ];
    for (body, code) in cases {
        let (status, res) = call(&store, post_json("/orders", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        let res = json(&res);
        assert_eq!(res["error"], code);
        assert!(res["message"].is_string());
    }
    let (_, res) = call(&store, post_json("/orders", &json!({"amount": 10.123, "currency": "USD", "token": "USDC"}))).await;
    assert_eq!(json(&res)["message"], "Amount can have at most 2 decimal places");
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn content_type_must_be_json() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let body = json!({"amount": 10, "currency": "USD", "token": "USDC"}).to_string();
    let req = TestRequest::post().uri("/orders").insert_header(ContentType::plaintext()).set_payload(body.clone());
    let (status, res) = call(&store, req).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json(&res)["error"], "invalid_content_type");

    let req = TestRequest::post().uri("/orders").set_payload(body.clone());
    let (status, _) = call(&store, req).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let req = TestRequest::post()
        .uri("/orders")
        .insert_header(("Content-Type", "application/json; charset=utf-8"))
        .set_payload(body);
    let (status, _) = call(&store, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn body_must_be_a_json_object() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    for payload in ["not json", "[1, 2, 3]", "42", "null"] {
        let req = TestRequest::post().uri("/orders").insert_header(ContentType::json()).set_payload(payload);
        let (status, res) = call(&store, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(json(&res)["error"], "invalid_payload");
    }
}

#[actix_web::test]
async fn bad_and_unknown_ids() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let (status, res) = call(&store, TestRequest::get().uri("/orders/12345")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&res)["error"], "invalid_order_id");

    let (status, res) = call(&store, TestRequest::get().uri("/orders/ord_does_not_exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let res = json(&res);
    assert_eq!(res["error"], "order_not_found");
    assert_eq!(res["message"], "No order with id ord_does_not_exist");
}

#[actix_web::test]
async fn old_orders_are_resolved_on_read() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let new_order = OrderRequest::new(json!(10.5), "USD", "USDC").validate().unwrap();
    let order = orders_api(&store).process_new_order(new_order, Utc::now() - Duration::seconds(20)).await.unwrap();
    let (status, res) = call(&store, TestRequest::get().uri(&format!("/orders/{}", order.order_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&res)["status"], terminal_outcome(&order.order_id).as_str());
}

#[actix_web::test]
async fn mock_route_aliases() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let req = post_json("/api/mock/orders/create", &json!({"amount": 5, "currency": "USD", "token": "USDC"}));
    let (status, res) = call(&store, req).await;
    assert_eq!(status, StatusCode::OK);
    let order_id = json(&res)["order_id"].as_str().unwrap().to_string();
    let (status, res) = call(&store, TestRequest::get().uri(&format!("/api/mock/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&res)["order_id"], order_id.as_str());

    // Disabled aliases are simply not routed
    let req = TestRequest::get().uri(&format!("/api/mock/orders/{order_id}"));
    let (status, _) = call_with(orders_api(&store), webhook_api(&store), false, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn storage_failures_are_opaque() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_order().returning(|_| Err(StoreError::BackendError("connection reset".into())));
    let orders = OrderFlowApi::new(store, EventProducers::default());
    let webhooks = WebhookApi::new(MockStore::new(), Secret::from("unused"), EventProducers::default());
    let (status, res) = call_with(orders, webhooks, true, TestRequest::get().uri("/orders/ord_abc")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let res = json(&res);
    assert_eq!(res["error"], "server_error");
    assert!(!res["message"].as_str().unwrap().contains("connection reset"));
}

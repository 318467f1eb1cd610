use actix_web::{
    http::{header::ContentType, StatusCode},
    test::TestRequest,
};
use chrono::Utc;
use elementpay_engine::{
    db_types::OrderStatusType,
    helpers::{signature_header, SIGNATURE_HEADER},
    order_objects::OrderRequest,
    MemoryStore,
    OrderStore,
};
use serde_json::json;

use super::helpers::{call, json, orders_api, signed_webhook, TEST_SECRET};

async fn new_order(store: &MemoryStore) -> String {
    let order = orders_api(store).create_order(OrderRequest::new(json!(10.5), "USD", "USDC")).await.unwrap();
    order.order_id.to_string()
}

async fn status_of(store: &MemoryStore, order_id: &str) -> OrderStatusType {
    store.fetch_order(&order_id.into()).await.unwrap().unwrap().status
}

#[actix_web::test]
async fn settled_webhook_then_replay() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let order_id = new_order(&store).await;
    let req = signed_webhook(&order_id, "settled");
    let (status, body) = call(&store, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"success": true}));

    let (status, body) = call(&store, TestRequest::get().uri(&format!("/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "settled");

    let (status, body) = call(&store, signed_webhook(&order_id, "settled")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"success": true}));
    let (status, _) = call(&store, signed_webhook(&order_id, "failed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(status_of(&store, &order_id).await, OrderStatusType::Settled);
}

#[actix_web::test]
async fn processing_claim_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let order_id = new_order(&store).await;
    let (status, _) = call(&store, signed_webhook(&order_id, "processing")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(status_of(&store, &order_id).await, OrderStatusType::Created);
}

#[actix_web::test]
async fn unknown_order_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let (status, body) = call(&store, signed_webhook("ord_never_created", "failed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"success": true}));
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn missing_signature() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let order_id = new_order(&store).await;
    let body = json!({"type": "order.settled", "data": {"order_id": order_id, "status": "settled"}}).to_string();
    let req = TestRequest::post().uri("/webhooks/elementpay").insert_header(ContentType::json()).set_payload(body);
    let (status, res) = call(&store, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let res = json(&res);
    assert_eq!(res["error"], "missing_signature");
    assert_eq!(res["message"], "X-Webhook-Signature header required");
    assert_eq!(status_of(&store, &order_id).await, OrderStatusType::Created);
}

#[actix_web::test]
async fn bad_signatures() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let order_id = new_order(&store).await;
    let body = json!({"type": "order.settled", "data": {"order_id": order_id, "status": "settled"}}).to_string();
    let now = Utc::now().timestamp();
    let headers = [
        signature_header(now, body.as_bytes(), "wrong_secret"),
        signature_header(now - 301, body.as_bytes(), TEST_SECRET),
        signature_header(now, b"{}", TEST_SECRET),
        "t=abc,v1=xyz".to_string(),
        "garbage".to_string(),
    ];
    for header in headers {
        let req = TestRequest::post()
            .uri("/webhooks/elementpay")
            .insert_header(ContentType::json())
            .insert_header((SIGNATURE_HEADER, header.clone()))
            .set_payload(body.clone());
        let (status, res) = call(&store, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{header}");
        assert_eq!(json(&res)["error"], "invalid_signature");
    }
    assert_eq!(status_of(&store, &order_id).await, OrderStatusType::Created);
}

#[actix_web::test]
async fn malformed_payloads() {
    let _ = env_logger::try_init().ok();
    let store = MemoryStore::new();
    let order_id = new_order(&store).await;
    let cases = [
        (json!({"type": "order.settled", "data": {"status": "settled"}}), "invalid_payload"),
        (json!({"type": "order.settled", "data": {"order_id": order_id}}), "invalid_payload"),
        (json!({"type": "order.settled"}), "invalid_payload"),
        (json!({"type": "order.refunded", "data": {"order_id": order_id, "status": "refunded"}}), "invalid_status"),
        (json!({"type": "order.created", "data": {"order_id": order_id, "status": "created"}}), "invalid_status"),
    ];
    for (payload, code) in cases {
        let body = payload.to_string();
        let header = signature_header(Utc::now().timestamp(), body.as_bytes(), TEST_SECRET);
        let req = TestRequest::post()
            .uri("/webhooks/elementpay")
            .insert_header(ContentType::json())
            .insert_header((SIGNATURE_HEADER, header))
            .set_payload(body);
        let (status, res) = call(&store, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(json(&res)["error"], code);
    }
    assert_eq!(status_of(&store, &order_id).await, OrderStatusType::Created);
}

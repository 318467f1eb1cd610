use actix_web::{
    body::MessageBody,
    http::{header::ContentType, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use chrono::Utc;
use elementpay_engine::{
    events::EventProducers,
    helpers::{signature_header, SIGNATURE_HEADER},
    order_objects::WebhookPayload,
    MemoryStore,
    OrderFlowApi,
    OrderStore,
    WebhookApi,
};
use epg_common::Secret;
use log::debug;
use serde_json::Value;

use crate::routes::configure_routes;

pub const TEST_SECRET: &str = "endpoint_test_secret";

/// Send `req` to an app built from the given engine APIs and return the status and body.
pub async fn call_with<B: OrderStore + 'static>(
    orders: OrderFlowApi<B>,
    webhooks: WebhookApi<B>,
    mock_routes: bool,
    req: TestRequest,
) -> (StatusCode, String) {
    let app = App::new()
        .app_data(web::Data::new(orders))
        .app_data(web::Data::new(webhooks))
        .configure(|cfg| configure_routes::<B>(cfg, mock_routes));
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = res.into_body().try_into_bytes().unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

/// Send `req` to an app backed by `store`, with the mock routes enabled.
pub async fn call(store: &MemoryStore, req: TestRequest) -> (StatusCode, String) {
    call_with(orders_api(store), webhook_api(store), true, req).await
}

pub fn orders_api(store: &MemoryStore) -> OrderFlowApi<MemoryStore> {
    OrderFlowApi::new(store.clone(), EventProducers::default())
}

pub fn webhook_api(store: &MemoryStore) -> WebhookApi<MemoryStore> {
    WebhookApi::new(store.clone(), Secret::from(TEST_SECRET), EventProducers::default())
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON: {e}. {body}"))
}

pub fn post_json(path: &str, body: &Value) -> TestRequest {
    TestRequest::post().uri(path).insert_header(ContentType::json()).set_payload(body.to_string())
}

pub fn signed_webhook(order_id: &str, status: &str) -> TestRequest {
    let body = serde_json::to_vec(&WebhookPayload::new(order_id, status)).unwrap();
    let header = signature_header(Utc::now().timestamp(), &body, TEST_SECRET);
    TestRequest::post()
        .uri("/webhooks/elementpay")
        .insert_header(ContentType::json())
        .insert_header((SIGNATURE_HEADER, header))
        .set_payload(body)
}

//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, http::header::CONTENT_TYPE, web, HttpRequest, HttpResponse, Responder};
use elementpay_engine::{
    helpers::SIGNATURE_HEADER,
    order_objects::OrderRequest,
    OrderFlowApi,
    OrderStore,
    WebhookApi,
    WebhookOutcome,
};
use log::*;
use serde_json::{json, Value};

use crate::errors::ServerError;

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// Register every gateway route on `cfg`. The engine APIs must be supplied separately as app data.
pub fn configure_routes<B: OrderStore + 'static>(cfg: &mut web::ServiceConfig, mock_routes: bool) {
    cfg.service(health)
        .service(CreateOrderRoute::<B>::new())
        .service(OrderByIdRoute::<B>::new())
        .service(ElementpayWebhookRoute::<B>::new());
    if mock_routes {
        cfg.service(MockCreateOrderRoute::<B>::new()).service(MockOrderByIdRoute::<B>::new());
    }
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderStore);
/// Route handler for order creation.
///
/// The body must be a JSON object `{amount, currency, token, note?}` sent with a JSON content type. On success the
/// stored order is returned, with status `created`.
pub async fn create_order<B: OrderStore>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST create_order");
    let request = parse_order_request(&req, &body)?;
    let order = api.create_order(request).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderStore);
/// Route handler for reading an order. Non-terminal orders are advanced according to the clock before being returned.
pub async fn order_by_id<B: OrderStore>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order_by_id({order_id})");
    let order = api.fetch_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(mock_create_order => Post "/api/mock/orders/create" impl OrderStore);
pub async fn mock_create_order<B: OrderStore>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    create_order(req, body, api).await
}

route!(mock_order_by_id => Get "/api/mock/orders/{order_id}" impl OrderStore);
pub async fn mock_order_by_id<B: OrderStore>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    order_by_id(path, api).await
}

fn parse_order_request(req: &HttpRequest, body: &[u8]) -> Result<OrderRequest, ServerError> {
    let is_json = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|s| s.to_ascii_lowercase().contains("application/json"));
    if !is_json {
        return Err(ServerError::InvalidContentType);
    }
    let value = serde_json::from_slice::<Value>(body).map_err(|e| {
        debug!("💻️ Order request body is not valid JSON. {e}");
        ServerError::InvalidPayload(format!("Request body is not valid JSON. {e}"))
    })?;
    if !value.is_object() {
        return Err(ServerError::InvalidPayload("Request body must be a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| ServerError::InvalidPayload(e.to_string()))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(elementpay_webhook => Post "/webhooks/elementpay" impl OrderStore);
/// Route handler for payment processor status pushes.
///
/// The request must carry an `X-Webhook-Signature` header over the exact body bytes. Any authenticated, well-formed
/// push gets `{"success": true}`, whether or not it changed the order.
pub async fn elementpay_webhook<B: OrderStore>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<WebhookApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST elementpay_webhook");
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .map(|v| v.to_str().map_err(|_| ServerError::InvalidSignature))
        .transpose()?;
    match api.handle(&body, signature).await? {
        WebhookOutcome::Applied(order) => debug!("💻️ Webhook applied. Order [{}] is {}", order.order_id, order.status),
        WebhookOutcome::Ignored(order) => debug!("💻️ Webhook ignored. Order [{}] is {}", order.order_id, order.status),
        WebhookOutcome::UnknownOrder(id) => debug!("💻️ Webhook for unknown order [{id}] dropped"),
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

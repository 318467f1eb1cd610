use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use elementpay_engine::{
    events::{EventHandlers, EventProducers},
    MemoryStore,
    OrderFlowApi,
    WebhookApi,
};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    hooks::create_event_hooks,
    routes::configure_routes,
    status_worker::start_status_worker,
};

const EVENT_BUFFER_SIZE: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;
    // One store for the whole process. Every worker's APIs get a handle to it.
    let db = MemoryStore::new();
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, create_event_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    if let Some(interval) = config.status_worker_interval {
        let _worker = start_status_worker(db.clone(), producers.clone(), interval);
    } else {
        info!("🕰️ Background status worker is disabled. Orders advance when they are read.");
    }
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::InitializeError(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: MemoryStore,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let mock_routes = config.mock_routes;
    let webhook_secret = config.webhook_secret.clone();
    let tolerance = config.signature_tolerance;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let webhook_api = WebhookApi::new(db.clone(), webhook_secret.clone(), producers.clone()).with_tolerance(tolerance);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("epg::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(webhook_api))
            .configure(|cfg| configure_routes::<MemoryStore>(cfg, mock_routes))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

//! # ElementPay gateway server
//! This crate hosts the HTTP server for the ElementPay order gateway. It is responsible for:
//! Accepting order creation requests from front-ends and returning the stored order.
//! Serving order status reads, which advance each order along its lifecycle.
//! Receiving signed status pushes from the payment processor.
//!
//! All order logic lives in `elementpay_engine`; this crate only translates between HTTP and the engine APIs.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /orders`: Create a new order.
//! * `GET /orders/{order_id}`: Fetch an order, with its current status.
//! * `POST /webhooks/elementpay`: Signed order status pushes.
//! * `/api/mock/orders/create` and `/api/mock/orders/{order_id}`: aliases of the two order routes.

pub mod cli;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod routes;
pub mod server;
pub mod status_worker;

#[cfg(test)]
mod endpoint_tests;

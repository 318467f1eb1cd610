//! # Gateway public API
//!
//! The `gateway_api` module exposes the programmatic API for the order gateway. It is split by caller:
//!
//! * [`order_flow_api`] serves the order owner: creating orders and reading them back. Reads lazily advance the order
//!   along its time-based lifecycle.
//! * [`webhook_api`] serves the upstream payment provider: it authenticates webhook deliveries and applies the status
//!   they claim.
//!
//! [`order_objects`] holds the request and payload types both APIs accept, and [`errors`] the error types they return.
//!
//! # API usage
//!
//! Every API is created by supplying a storage backend that implements [`crate::traits::OrderStore`]. Give each API a
//! clone of the same store so that they all see the same orders:
//!
//! ```rust,ignore
//! use elementpay_engine::{events::EventProducers, MemoryStore, OrderFlowApi, WebhookApi};
//! let store = MemoryStore::new();
//! let orders = OrderFlowApi::new(store.clone(), EventProducers::default());
//! let webhooks = WebhookApi::new(store, secret, EventProducers::default());
//! let order = orders.create_order(request).await?;
//! ```

pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod webhook_api;

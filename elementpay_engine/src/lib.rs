//! ElementPay Payment Engine
//!
//! The engine holds the core logic of the ElementPay order gateway: payment orders, the lifecycle that moves them
//! from `created` to a terminal `settled` or `failed` status, and the authenticated webhook path that lets the payment
//! processor push a terminal status early. It has no knowledge of HTTP.
//!
//! The library is divided into these sections:
//! 1. Storage ([`mod@traits`] and [`mod@db`]). Backends implement [`OrderStore`]. [`MemoryStore`] is the in-process
//!    implementation used by the server.
//! 2. The lifecycle rules ([`mod@lifecycle`]). Pure functions; no storage access.
//! 3. The public API ([`OrderFlowApi`] and [`WebhookApi`]). These validate input, apply the lifecycle rules, and
//!    persist the results through an [`OrderStore`].
//!
//! The engine also emits events when orders change status. See [`mod@events`] for how to hook into them.
mod db;
mod gateway_api;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod lifecycle;
pub mod traits;

pub use db::MemoryStore;
pub use gateway_api::{
    errors::{OrderFlowError, ValidationError, WebhookError},
    order_flow_api::{OrderFlowApi, MAX_ID_ATTEMPTS},
    order_objects,
    webhook_api::{WebhookApi, WebhookOutcome},
};
pub use traits::{OrderStore, StatusUpdate, StoreError};

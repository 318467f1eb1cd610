//! # Storage contracts
//!
//! This module defines the interface that order storage *backends* must expose to the gateway.
//!
//! The gateway only ever needs single-key operations: fetch an order, store an order, list the ids, and atomically
//! change one order's status. Backends are free to be as simple as a map behind a lock ([`crate::MemoryStore`]) or a
//! real database, as long as [`OrderStore::update_status_if`] is atomic per key.
mod order_store;

pub use order_store::{OrderStore, StatusUpdate, StoreError};

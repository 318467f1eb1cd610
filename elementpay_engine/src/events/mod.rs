//! # Order events
//!
//! Components outside the engine learn about order progress by subscribing to events rather than polling the store.
//! Two events are emitted:
//!
//! * [`OrderStatusChangedEvent`] whenever either mutation path writes a new status.
//! * [`OrderFinalizedEvent`] when an order first reaches a terminal status. Terminal states absorb, so this fires at
//!   most once per order.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};

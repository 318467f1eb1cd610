use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::{
    db_types::{Order, OrderStatusType},
    events::{EventHandler, EventProducer, Handler, OrderFinalizedEvent, OrderStatusChangedEvent, TransitionSource},
};

/// The set of producers handed to the engine APIs. Cheap to clone; an empty set (the default) publishes nothing.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub status_changed_producer: Vec<EventProducer<OrderStatusChangedEvent>>,
    pub order_finalized_producer: Vec<EventProducer<OrderFinalizedEvent>>,
}

impl EventProducers {
    /// Publish the events for an order that has just moved from `old_status` to its current status.
    pub async fn publish_transition(&self, old_status: OrderStatusType, order: &Order, source: TransitionSource) {
        for emitter in &self.status_changed_producer {
            trace!("📬️ Notifying status changed subscribers for {}", order.order_id);
            let event = OrderStatusChangedEvent::new(order.order_id.clone(), old_status, order.status, source);
            emitter.publish_event(event).await;
        }
        if order.is_terminal() {
            for emitter in &self.order_finalized_producer {
                trace!("📬️ Notifying order finalized subscribers for {}", order.order_id);
                emitter.publish_event(OrderFinalizedEvent::new(order.clone(), source)).await;
            }
        }
    }
}

pub struct EventHandlers {
    pub on_status_changed: Option<EventHandler<OrderStatusChangedEvent>>,
    pub on_order_finalized: Option<EventHandler<OrderFinalizedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_status_changed = hooks.on_status_changed.map(|f| EventHandler::new(buffer_size, f));
        let on_order_finalized = hooks.on_order_finalized.map(|f| EventHandler::new(buffer_size, f));
        Self { on_status_changed, on_order_finalized }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_status_changed {
            result.status_changed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_finalized {
            result.order_finalized_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawn a task for each configured handler. Each task ends once every producer for it has been dropped.
    pub fn start_handlers(self) {
        if let Some(handler) = self.on_status_changed {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_finalized {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_status_changed: Option<Handler<OrderStatusChangedEvent>>,
    pub on_order_finalized: Option<Handler<OrderFinalizedEvent>>,
}

impl EventHooks {
    pub fn on_status_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderStatusChangedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_status_changed = Some(Arc::new(f));
        self
    }

    pub fn on_order_finalized<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderFinalizedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_finalized = Some(Arc::new(f));
        self
    }
}

//! Event hooks registered by the server.
//!
//! Front-ends learn about terminal statuses by polling, so the only subscriber the server needs is the audit log.
use elementpay_engine::events::{EventHooks, OrderFinalizedEvent, OrderStatusChangedEvent};
use log::*;

pub fn create_event_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_status_changed(|ev: OrderStatusChangedEvent| {
            Box::pin(async move {
                debug!("📬️ Order [{}]: {} → {} ({})", ev.order_id, ev.old_status, ev.new_status, ev.source);
            })
        })
        .on_order_finalized(|ev: OrderFinalizedEvent| {
            Box::pin(async move {
                let order = ev.order;
                info!(
                    "📬️ Order [{}] for {} {} ({}) is final: {}. Resolved by {}.",
                    order.order_id, order.amount, order.currency, order.token, order.status, ev.source
                );
            })
        });
    hooks
}

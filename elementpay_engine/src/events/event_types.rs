use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderId, OrderStatusType};

/// Which of the two mutation paths produced a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionSource {
    /// The clock-driven advance that runs when an order is read.
    Lifecycle,
    /// An authenticated webhook push.
    Webhook,
}

impl Display for TransitionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lifecycle => write!(f, "lifecycle"),
            Self::Webhook => write!(f, "webhook"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order_id: OrderId,
    pub old_status: OrderStatusType,
    pub new_status: OrderStatusType,
    pub source: TransitionSource,
}

impl OrderStatusChangedEvent {
    pub fn new(
        order_id: OrderId,
        old_status: OrderStatusType,
        new_status: OrderStatusType,
        source: TransitionSource,
    ) -> Self {
        Self { order_id, old_status, new_status, source }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFinalizedEvent {
    /// The order, as it was immediately after reaching its terminal status.
    pub order: Order,
    pub source: TransitionSource,
}

impl OrderFinalizedEvent {
    pub fn new(order: Order, source: TransitionSource) -> Self {
        Self { order, source }
    }
}

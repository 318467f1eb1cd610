//! Volatile, process-lifetime order storage.
//!
//! Orders are never evicted. That is fine for a demonstration gateway, but a long-running deployment would need a
//! persistent backend with expiry.

use std::{collections::HashMap, fmt::Debug, sync::Arc};

use log::*;
use tokio::sync::RwLock;

use crate::{
    db_types::{Order, OrderId, OrderStatusType},
    traits::{OrderStore, StatusUpdate, StoreError},
};

/// An in-memory [`OrderStore`].
///
/// `MemoryStore` is a handle: clones share the same underlying map. Construct one at startup and hand clones to every
/// API that needs it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryStore")
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

impl OrderStore for MemoryStore {
    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(order_id).cloned())
    }

    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.order_id) {
            return Err(StoreError::OrderAlreadyExists(order.order_id));
        }
        trace!("🗃️ Inserting order {}", order.order_id);
        orders.insert(order.order_id.clone(), order.clone());
        Ok(order)
    }

    async fn save_order(&self, order: Order) -> Result<(), StoreError> {
        trace!("🗃️ Saving order {}", order.order_id);
        self.orders.write().await.insert(order.order_id.clone(), order);
        Ok(())
    }

    async fn order_ids(&self) -> Result<Vec<OrderId>, StoreError> {
        Ok(self.orders.read().await.keys().cloned().collect())
    }

    async fn update_status_if(
        &self,
        order_id: &OrderId,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<StatusUpdate, StoreError> {
        let mut orders = self.orders.write().await;
        let result = match orders.get_mut(order_id) {
            None => StatusUpdate::NotFound,
            Some(order) if order.status == expected => {
                order.status = new_status;
                StatusUpdate::Updated(order.clone())
            },
            Some(order) => StatusUpdate::Conflict(order.clone()),
        };
        Ok(result)
    }
}

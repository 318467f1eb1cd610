use thiserror::Error;

use crate::db_types::{Order, OrderId, OrderStatusType};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("An order with id {0} already exists")]
    OrderAlreadyExists(OrderId),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// The outcome of a conditional status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The order had the expected status and now carries the new one. Contains the updated order.
    Updated(Order),
    /// The order's status was no longer the expected one, so nothing was written. Contains the order as it is now.
    Conflict(Order),
    /// There is no order with that id.
    NotFound,
}

/// The `OrderStore` trait defines the behaviour for storing and retrieving orders.
///
/// All instances handed out by a backend must observe the same data, so that every request handler in the process sees
/// the same orders.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Fetch the order with the given id, if it exists.
    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Store a brand-new order. Fails with [`StoreError::OrderAlreadyExists`] if the id is taken, so an id collision can
    /// never overwrite another order.
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError>;

    /// Store `order` under its id, replacing whatever was there.
    async fn save_order(&self, order: Order) -> Result<(), StoreError>;

    /// The ids of every order in the store, in no particular order.
    async fn order_ids(&self) -> Result<Vec<OrderId>, StoreError>;

    /// Atomically set the status of the order to `new_status`, but only if its status is currently `expected`.
    ///
    /// This is a compare-and-set on the status field. The check and the write happen under the same lock (or inside
    /// the same transaction), so two concurrent writers cannot both observe a non-terminal status and both write.
    async fn update_status_if(
        &self,
        order_id: &OrderId,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<StatusUpdate, StoreError>;
}

use elementpay_engine::{
    db_types::{Order, OrderId, OrderStatusType},
    OrderStore,
    StatusUpdate,
    StoreError,
};
use mockall::mock;

mock! {
    pub Store {}
    impl OrderStore for Store {
        async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;
        async fn insert_order(&self, order: Order) -> Result<Order, StoreError>;
        async fn save_order(&self, order: Order) -> Result<(), StoreError>;
        async fn order_ids(&self) -> Result<Vec<OrderId>, StoreError>;
        async fn update_status_if(
            &self,
            order_id: &OrderId,
            expected: OrderStatusType,
            new_status: OrderStatusType,
        ) -> Result<StatusUpdate, StoreError>;
    }
}

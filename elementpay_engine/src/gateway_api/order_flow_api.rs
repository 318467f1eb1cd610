use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId},
    events::{EventProducers, TransitionSource},
    gateway_api::{errors::OrderFlowError, order_objects::OrderRequest},
    helpers::generate_order_id,
    lifecycle::time_based_transition,
    traits::{OrderStore, StatusUpdate, StoreError},
};

/// How many fresh ids are tried before giving up on an insert.
pub const MAX_ID_ATTEMPTS: usize = 5;
/// Upper bound on compare-and-set retries while advancing a single order.
const MAX_ADVANCE_ATTEMPTS: usize = 8;

/// `OrderFlowApi` is the primary API for creating orders and reading them back.
///
/// Reading an order is not passive: every read of a non-terminal order applies the time-based lifecycle rule first,
/// so callers always see the status the clock calls for.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderStore
{
    /// Validate a creation request and store the resulting order.
    pub async fn create_order(&self, request: OrderRequest) -> Result<Order, OrderFlowError> {
        let new_order = request.validate().map_err(|e| {
            debug!("🔄️📦️ Order request rejected. {e}");
            e
        })?;
        self.process_new_order(new_order, Utc::now()).await
    }

    /// Allocate an id for a validated order and insert it with status `created`.
    ///
    /// The store refuses to overwrite an existing id, so in the (very unlikely) event of a collision a new id is drawn.
    pub async fn process_new_order(&self, order: NewOrder, now: DateTime<Utc>) -> Result<Order, OrderFlowError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let order_id = generate_order_id(now);
            match self.db.insert_order(order.clone().into_order(order_id, now)).await {
                Ok(order) => {
                    info!(
                        "🔄️📦️ Order [{}] created for {} {} ({})",
                        order.order_id, order.amount, order.currency, order.token
                    );
                    return Ok(order);
                },
                Err(StoreError::OrderAlreadyExists(id)) => {
                    warn!("🔄️📦️ Order id {id} is already taken (attempt {attempt}/{MAX_ID_ATTEMPTS}). Retrying.");
                },
                Err(e) => return Err(e.into()),
            }
        }
        error!("🔄️📦️ Could not allocate a unique order id after {MAX_ID_ATTEMPTS} attempts");
        Err(OrderFlowError::IdAllocationFailed(MAX_ID_ATTEMPTS))
    }

    /// Fetch an order by id, advancing its status according to the clock.
    pub async fn fetch_order(&self, order_id: &str) -> Result<Order, OrderFlowError> {
        self.fetch_order_at(order_id, Utc::now()).await
    }

    /// As [`Self::fetch_order`], but with an explicit clock.
    pub async fn fetch_order_at(&self, order_id: &str, now: DateTime<Utc>) -> Result<Order, OrderFlowError> {
        let order_id = OrderId::from(order_id);
        if !order_id.is_well_formed() {
            return Err(OrderFlowError::InvalidIdentifier(order_id.0));
        }
        let order = self.db.fetch_order(&order_id).await?.ok_or_else(|| OrderFlowError::NotFound(order_id.clone()))?;
        self.advance_order(order, now).await
    }

    /// Apply the time-based lifecycle rule to `order` and persist the result.
    ///
    /// The write is a compare-and-set against the status that was read. If another writer changed the order in the
    /// meantime, the rule is re-evaluated against the fresh record. Terminal orders are returned untouched.
    pub async fn advance_order(&self, mut order: Order, now: DateTime<Utc>) -> Result<Order, OrderFlowError> {
        for _ in 0..MAX_ADVANCE_ATTEMPTS {
            let Some(next) = time_based_transition(&order, now) else {
                return Ok(order);
            };
            let old_status = order.status;
            match self.db.update_status_if(&order.order_id, old_status, next).await? {
                StatusUpdate::Updated(updated) => {
                    debug!("🔄️⏱️ Order [{}] advanced from {old_status} to {next}", updated.order_id);
                    self.producers.publish_transition(old_status, &updated, TransitionSource::Lifecycle).await;
                    order = updated;
                },
                StatusUpdate::Conflict(current) => {
                    trace!(
                        "🔄️⏱️ Order [{}] changed to {} while advancing from {old_status}. Re-evaluating.",
                        current.order_id,
                        current.status
                    );
                    order = current;
                },
                StatusUpdate::NotFound => return Err(OrderFlowError::NotFound(order.order_id)),
            }
        }
        warn!("🔄️⏱️ Order [{}] is under heavy contention. Returning the last status seen.", order.order_id);
        Ok(order)
    }

    /// Advance every non-terminal order in the store. Returns the number of orders whose status changed.
    ///
    /// Failures on individual orders are logged and skipped.
    pub async fn advance_all(&self, now: DateTime<Utc>) -> Result<usize, OrderFlowError> {
        let mut changed = 0;
        for order_id in self.db.order_ids().await? {
            let order = match self.db.fetch_order(&order_id).await {
                Ok(Some(order)) if !order.is_terminal() => order,
                Ok(_) => continue,
                Err(e) => {
                    warn!("🔄️⏱️ Could not fetch order [{order_id}]. {e}");
                    continue;
                },
            };
            let old_status = order.status;
            match self.advance_order(order, now).await {
                Ok(order) if order.status != old_status => changed += 1,
                Ok(_) => {},
                Err(e) => warn!("🔄️⏱️ Could not advance order [{order_id}]. {e}"),
            }
        }
        Ok(changed)
    }
}

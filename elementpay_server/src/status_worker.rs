use std::time::Duration;

use chrono::Utc;
use elementpay_engine::{events::EventProducers, MemoryStore, OrderFlowApi};
use log::*;
use tokio::task::JoinHandle;

/// Starts the background status worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Each tick applies the time-based lifecycle rule to every open order, exactly as a read would. Orders therefore
/// reach their terminal status (and fire their finalized hooks) even if no client ever polls them.
pub fn start_status_worker(db: MemoryStore, producers: EventProducers, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = OrderFlowApi::new(db, producers);
        info!("🕰️ Order status worker started. Running every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            trace!("🕰️ Running order status job");
            match api.advance_all(Utc::now()).await {
                Ok(0) => trace!("🕰️ No orders changed status"),
                Ok(n) => debug!("🕰️ {n} orders changed status"),
                Err(e) => error!("🕰️ Error running order status job: {e}"),
            }
        }
    })
}

//! # Order lifecycle
//!
//! Pure transition logic for the order state machine. Nothing in this module touches storage; callers feed it the
//! current order (and clock) and persist whatever it returns.
//!
//! ```text
//!                 ┌─────────┐  8s   ┌────────────┐  18s  ┌─────────┐
//!   create ──────►│ created ├──────►│ processing ├──┬───►│ settled │ (terminal)
//!                 └────┬────┘       └─────┬──────┘  │    └─────────┘
//!                      │                  │         │    ┌─────────┐
//!                      │   webhook push   │         └───►│ failed  │ (terminal)
//!                      └──────────────────┴─────────────►└─────────┘
//! ```
//!
//! There are two independent ways to move an order forward:
//!
//! * **Time**: [`time_based_transition`] is evaluated whenever a non-terminal order is read. The status is a function
//!   of the whole seconds elapsed since `created_at`. Once the final threshold passes, the outcome is derived from the
//!   order id by [`terminal_outcome`], so a given order always lands in the same terminal state.
//! * **Push**: [`push_transition`] applies a status claimed by an authenticated webhook. Only terminal claims are
//!   applied; a `processing` claim is accepted but ignored, leaving the transient states to the clock.
//!
//! Terminal states absorb: neither path ever moves an order out of `settled` or `failed`.

use chrono::{DateTime, Utc};

use crate::db_types::{Order, OrderId, OrderStatusType};

/// Orders stay `created` for this many seconds.
pub const PROCESSING_AFTER_SECS: i64 = 8;
/// Orders reach their terminal state after this many seconds.
pub const FINAL_AFTER_SECS: i64 = 18;

/// The signed 32-bit rolling hash of an order id: `h = h * 31 + c` over the UTF-16 code units of the id, wrapping on
/// overflow.
///
/// Other implementations of the gateway use this exact function, so it must not be changed, even though it is not a
/// good hash.
pub fn order_id_hash(order_id: &str) -> i32 {
    order_id.encode_utf16().fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// The terminal status that the time-based path resolves `order_id` to. Roughly 80% of ids settle and 20% fail.
pub fn terminal_outcome(order_id: &OrderId) -> OrderStatusType {
    // Widen before abs() so that i32::MIN has a representable magnitude
    let bucket = i64::from(order_id_hash(order_id.as_str())).abs() % 10;
    if bucket < 8 {
        OrderStatusType::Settled
    } else {
        OrderStatusType::Failed
    }
}

/// The status an order with the given id should have after `elapsed_secs` whole seconds.
pub fn status_for_elapsed(order_id: &OrderId, elapsed_secs: i64) -> OrderStatusType {
    if elapsed_secs < PROCESSING_AFTER_SECS {
        OrderStatusType::Created
    } else if elapsed_secs < FINAL_AFTER_SECS {
        OrderStatusType::Processing
    } else {
        terminal_outcome(order_id)
    }
}

/// Whole seconds between `since` and `now`, rounded down.
pub fn elapsed_secs(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_milliseconds().div_euclid(1000)
}

/// Evaluate the time-based rule for `order` at `now`.
///
/// Returns the new status if the order should change, or `None` if it is terminal or already has the status the clock
/// calls for.
pub fn time_based_transition(order: &Order, now: DateTime<Utc>) -> Option<OrderStatusType> {
    if order.is_terminal() {
        return None;
    }
    let next = status_for_elapsed(&order.order_id, elapsed_secs(order.created_at, now));
    (next != order.status).then_some(next)
}

/// Evaluate a webhook claim against the order's `current` status.
///
/// Returns the status to write, or `None` if the claim is not applied: either the claim is not terminal, or the order
/// already is.
pub fn push_transition(current: OrderStatusType, claim: OrderStatusType) -> Option<OrderStatusType> {
    (claim.is_terminal() && !current.is_terminal()).then_some(claim)
}

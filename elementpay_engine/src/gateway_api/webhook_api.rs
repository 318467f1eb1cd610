use std::fmt::Debug;

use chrono::Utc;
use epg_common::Secret;
use log::*;

use crate::{
    db_types::{Order, OrderId},
    events::{EventProducers, TransitionSource},
    gateway_api::{errors::WebhookError, order_objects::WebhookPayload},
    helpers::{verify_webhook_signature, DEFAULT_SIGNATURE_TOLERANCE},
    lifecycle::push_transition,
    traits::{OrderStore, StatusUpdate},
};

const MAX_PUSH_ATTEMPTS: usize = 8;

/// What happened to an authenticated webhook delivery. Every variant is a success from the sender's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The claimed status was written. Contains the updated order.
    Applied(Order),
    /// The claim was valid but did not change anything: it was not terminal, or the order already was.
    Ignored(Order),
    /// No order has the claimed id. The delivery is acknowledged and dropped.
    UnknownOrder(OrderId),
}

/// `WebhookApi` authenticates and applies status pushes from the payment processor.
pub struct WebhookApi<B> {
    db: B,
    secret: Secret<String>,
    tolerance: u64,
    producers: EventProducers,
}

impl<B> Debug for WebhookApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookApi (tolerance: {}s)", self.tolerance)
    }
}

impl<B> WebhookApi<B> {
    pub fn new(db: B, secret: Secret<String>, producers: EventProducers) -> Self {
        Self { db, secret, tolerance: DEFAULT_SIGNATURE_TOLERANCE, producers }
    }

    /// Override the signature freshness window, in seconds.
    pub fn with_tolerance(mut self, tolerance: u64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> WebhookApi<B>
where B: OrderStore
{
    /// Handle a webhook delivery. `raw_body` must be exactly the bytes received, since the signature covers them.
    pub async fn handle(&self, raw_body: &[u8], signature: Option<&str>) -> Result<WebhookOutcome, WebhookError> {
        self.handle_at(raw_body, signature, Utc::now().timestamp()).await
    }

    /// As [`Self::handle`], with the receiver's clock given in Unix seconds.
    pub async fn handle_at(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<WebhookOutcome, WebhookError> {
        let signature = signature.filter(|s| !s.is_empty()).ok_or(WebhookError::MissingSignature)?;
        if !verify_webhook_signature(signature, raw_body, self.secret.reveal(), now, self.tolerance) {
            warn!("🔐️ Webhook signature verification failed");
            return Err(WebhookError::InvalidSignature);
        }
        let claim = WebhookPayload::from_slice(raw_body)?.into_claim()?;
        debug!(
            "🔄️📨️ Webhook {} claims order [{}] is {}",
            claim.event_type.as_deref().unwrap_or("(untyped)"),
            claim.order_id,
            claim.status
        );
        let Some(mut order) = self.db.fetch_order(&claim.order_id).await? else {
            warn!("🔄️📨️ Webhook for unknown order [{}]. Ignoring.", claim.order_id);
            return Ok(WebhookOutcome::UnknownOrder(claim.order_id));
        };
        for _ in 0..MAX_PUSH_ATTEMPTS {
            let Some(next) = push_transition(order.status, claim.status) else {
                trace!("🔄️📨️ Order [{}] is {}. Claim of {} is not applied.", order.order_id, order.status, claim.status);
                return Ok(WebhookOutcome::Ignored(order));
            };
            let old_status = order.status;
            match self.db.update_status_if(&order.order_id, old_status, next).await? {
                StatusUpdate::Updated(updated) => {
                    info!("🔄️📨️ Order [{}] moved from {old_status} to {next} by webhook", updated.order_id);
                    self.producers.publish_transition(old_status, &updated, TransitionSource::Webhook).await;
                    return Ok(WebhookOutcome::Applied(updated));
                },
                StatusUpdate::Conflict(current) => order = current,
                StatusUpdate::NotFound => {
                    warn!("🔄️📨️ Order [{}] disappeared while applying webhook. Ignoring.", order.order_id);
                    return Ok(WebhookOutcome::UnknownOrder(order.order_id));
                },
            }
        }
        warn!("🔄️📨️ Order [{}] is under heavy contention. Webhook claim dropped.", order.order_id);
        Ok(WebhookOutcome::Ignored(order))
    }
}

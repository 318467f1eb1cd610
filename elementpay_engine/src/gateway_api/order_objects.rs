use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    db_types::{NewOrder, OrderId, OrderStatusType},
    gateway_api::errors::{ValidationError, WebhookError},
};
use epg_common::{decimal_places, Amount, AmountConversionError, MAX_DECIMAL_PLACES};

//--------------------------------------     OrderRequest    ---------------------------------------------------------
/// An order creation request as received from a client, before validation.
///
/// Fields are kept as raw JSON values so that a wrong type is reported as a validation failure on that field, rather
/// than as an opaque deserialization error for the whole body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<Value>,
    #[serde(default)]
    pub token: Option<Value>,
    #[serde(default)]
    pub note: Option<Value>,
}

impl OrderRequest {
    pub fn new(amount: Value, currency: &str, token: &str) -> Self {
        Self {
            amount: Some(amount),
            currency: Some(Value::String(currency.into())),
            token: Some(Value::String(token.into())),
            note: None,
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(Value::String(note.into()));
        self
    }

    /// Check every field and produce a [`NewOrder`].
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// 1. amount is a number greater than zero
    /// 2. currency is a non-blank string
    /// 3. token is a non-blank string
    /// 4. amount has at most two decimal places
    /// 5. currency is a three-letter uppercase code
    /// 6. note, if present, is a string
    pub fn validate(self) -> Result<NewOrder, ValidationError> {
        let amount = match &self.amount {
            Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v > 0.0) => n.clone(),
            _ => return Err(ValidationError::InvalidAmount),
        };
        let currency = non_blank_string(self.currency).ok_or(ValidationError::InvalidCurrency)?;
        let token = non_blank_string(self.token).ok_or(ValidationError::InvalidToken)?;
        if decimal_places(&amount) > MAX_DECIMAL_PLACES {
            return Err(ValidationError::InvalidAmountPrecision);
        }
        if !is_currency_code(&currency) {
            return Err(ValidationError::InvalidCurrencyFormat);
        }
        let note = match self.note {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => return Err(ValidationError::InvalidNote),
        };
        let amount = Amount::from_number(&amount).map_err(|e| match e {
            AmountConversionError::TooPrecise(_) => ValidationError::InvalidAmountPrecision,
            AmountConversionError::OutOfRange(_) => ValidationError::InvalidAmount,
        })?;
        Ok(NewOrder::new(amount, currency, token, note))
    }
}

fn non_blank_string(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn is_currency_code(s: &str) -> bool {
    s.len() == 3 && s.bytes().all(|b| b.is_ascii_uppercase())
}

//--------------------------------------    WebhookPayload   ---------------------------------------------------------
/// The body of a webhook delivery: `{"type": "order.settled", "data": {"order_id": "...", "status": "settled"}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub data: Option<WebhookData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A status claim extracted from a well-formed webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookClaim {
    pub order_id: OrderId,
    pub status: OrderStatusType,
    pub event_type: Option<String>,
}

impl WebhookPayload {
    pub fn new(order_id: &str, status: &str) -> Self {
        Self {
            event_type: Some(format!("order.{status}")),
            data: Some(WebhookData { order_id: Some(order_id.into()), status: Some(status.into()) }),
        }
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(raw).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
    }

    /// Extract the claim. Webhooks may claim `processing`, `settled` or `failed`; anything else is rejected.
    pub fn into_claim(self) -> Result<WebhookClaim, WebhookError> {
        let data = self.data.unwrap_or_default();
        let (order_id, status) = match (data.order_id, data.status) {
            (Some(id), Some(status)) if !id.is_empty() && !status.is_empty() => (id, status),
            _ => return Err(WebhookError::MalformedPayload("Missing order_id or status in payload".into())),
        };
        let status = match status.parse::<OrderStatusType>() {
            Ok(s @ (OrderStatusType::Processing | OrderStatusType::Settled | OrderStatusType::Failed)) => s,
            _ => return Err(WebhookError::InvalidStatus(status)),
        };
        Ok(WebhookClaim { order_id: OrderId(order_id), status, event_type: self.event_type })
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn request(body: Value) -> OrderRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn valid_request() {
        let order = request(json!({"amount": 10.5, "currency": "USD", "token": "USDC", "note": "coffee"}))
            .validate()
            .unwrap();
        assert_eq!(order.amount, Amount::from_cents(1050));
        assert_eq!(order.currency, "USD");
        assert_eq!(order.token, "USDC");
        assert_eq!(order.note.as_deref(), Some("coffee"));
        let order = request(json!({"amount": 3, "currency": "KES", "token": "cUSD", "note": null})).validate().unwrap();
        assert_eq!(order.amount, Amount::from_cents(300));
        assert!(order.note.is_none());
    }

    #[test]
    fn each_field_has_its_own_reason() {
        let cases = [
            (json!({"currency": "USD", "token": "USDC"}), ValidationError::InvalidAmount),
            (json!({"amount": "10", "currency": "USD", "token": "USDC"}), ValidationError::InvalidAmount),
            (json!({"amount": 0, "currency": "USD", "token": "USDC"}), ValidationError::InvalidAmount),
            (json!({"amount": -4.5, "currency": "USD", "token": "USDC"}), ValidationError::InvalidAmount),
            (json!({"amount": 10.123, "currency": "USD", "token": "USDC"}), ValidationError::InvalidAmountPrecision),
            (json!({"amount": 10, "token": "USDC"}), ValidationError::InvalidCurrency),
            (json!({"amount": 10, "currency": "  ", "token": "USDC"}), ValidationError::InvalidCurrency),
            (json!({"amount": 10, "currency": 840, "token": "USDC"}), ValidationError::InvalidCurrency),
            (json!({"amount": 10, "currency": "usd", "token": "USDC"}), ValidationError::InvalidCurrencyFormat),
            (json!({"amount": 10, "currency": "USDT", "token": "USDC"}), ValidationError::InvalidCurrencyFormat),
            (json!({"amount": 10, "currency": "US1", "token": "USDC"}), ValidationError::InvalidCurrencyFormat),
            (json!({"amount": 10, "currency": "USD"}), ValidationError::InvalidToken),
            (json!({"amount": 10, "currency": "USD", "token": ""}), ValidationError::InvalidToken),
            (json!({"amount": 10, "currency": "USD", "token": "USDC", "note": 5}), ValidationError::InvalidNote),
        ];
        for (body, expected) in cases {
            let err = request(body.clone()).validate().unwrap_err();
            assert_eq!(err, expected, "for {body}");
        }
    }

    #[test]
    fn checks_run_in_order() {
        // Both the amount precision and the currency format are wrong; precision is checked first
        let err = request(json!({"amount": 1.001, "currency": "usd", "token": "USDC"})).validate().unwrap_err();
        assert_eq!(err, ValidationError::InvalidAmountPrecision);
        // Token presence is checked before amount precision
        let err = request(json!({"amount": 1.001, "currency": "USD"})).validate().unwrap_err();
        assert_eq!(err, ValidationError::InvalidToken);
        assert_eq!(err.code(), "invalid_token");
        assert_eq!(err.field(), "token");
    }

    #[test]
    fn webhook_claims() {
        let claim = WebhookPayload::new("ord_abc", "settled").into_claim().unwrap();
        assert_eq!(claim.order_id, OrderId::from("ord_abc"));
        assert_eq!(claim.status, OrderStatusType::Settled);
        assert_eq!(claim.event_type.as_deref(), Some("order.settled"));

        let claim = WebhookPayload::new("ord_abc", "processing").into_claim().unwrap();
        assert_eq!(claim.status, OrderStatusType::Processing);

        let err = WebhookPayload::new("ord_abc", "created").into_claim().unwrap_err();
        assert!(matches!(err, WebhookError::InvalidStatus(s) if s == "created"));
        let err = WebhookPayload::new("ord_abc", "refunded").into_claim().unwrap_err();
        assert!(matches!(err, WebhookError::InvalidStatus(s) if s == "refunded"));
        let err = WebhookPayload::new("", "settled").into_claim().unwrap_err();
        assert!(matches!(err, WebhookError::MalformedPayload(_)));
        let err = WebhookPayload::default().into_claim().unwrap_err();
        assert!(matches!(err, WebhookError::MalformedPayload(_)));
    }

    #[test]
    fn webhook_payload_parsing() {
        let raw = br#"{"type":"order.failed","data":{"order_id":"ord_x","status":"failed"}}"#;
        let claim = WebhookPayload::from_slice(raw).unwrap().into_claim().unwrap();
        assert_eq!(claim.status, OrderStatusType::Failed);
        assert!(matches!(WebhookPayload::from_slice(b"not json"), Err(WebhookError::MalformedPayload(_))));
        let raw = br#"{"type":"order.failed","data":{"status":"failed"}}"#;
        let err = WebhookPayload::from_slice(raw).unwrap().into_claim().unwrap_err();
        assert!(matches!(err, WebhookError::MalformedPayload(_)));
    }
}

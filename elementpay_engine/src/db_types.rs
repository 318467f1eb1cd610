use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use epg_common::Amount;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------       OrderId       ---------------------------------------------------------
/// The prefix carried by every order identifier issued by the gateway.
pub const ORDER_ID_PREFIX: &str = "ord_";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// True if the identifier has the shape of one the gateway could have issued. This is a cheap syntactic check;
    /// it says nothing about whether the order exists.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() > ORDER_ID_PREFIX.len() && self.0.starts_with(ORDER_ID_PREFIX)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been accepted and nothing has happened to it yet.
    Created,
    /// Payment is in flight. This is a transient state.
    Processing,
    /// Payment completed. Terminal.
    Settled,
    /// Payment did not complete. Terminal.
    Failed,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Processing => "processing",
            Self::Settled => "settled",
            Self::Failed => "failed",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status: {0}")]
pub struct ConversionError(pub String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "processing" => Ok(Self::Processing),
            "settled" => Ok(Self::Settled),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub status: OrderStatusType,
    pub amount: Amount,
    pub currency: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
/// A creation request that has passed validation. The only way to build one outside this crate is via
/// [`crate::order_objects::OrderRequest::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub amount: Amount,
    pub currency: String,
    pub token: String,
    pub note: Option<String>,
}

impl NewOrder {
    pub(crate) fn new(amount: Amount, currency: String, token: String, note: Option<String>) -> Self {
        Self { amount, currency, token, note }
    }

    pub fn into_order(self, order_id: OrderId, created_at: DateTime<Utc>) -> Order {
        Order {
            order_id,
            status: OrderStatusType::Created,
            amount: self.amount,
            currency: self.currency,
            token: self.token,
            note: self.note,
            created_at,
        }
    }
}

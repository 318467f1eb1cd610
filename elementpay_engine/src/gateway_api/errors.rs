use thiserror::Error;

use crate::{db_types::OrderId, traits::StoreError};

/// The reason an order creation request was rejected. Each variant names exactly one offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Amount must be a positive number")]
    InvalidAmount,
    #[error("Currency is required and must be a non-empty string")]
    InvalidCurrency,
    #[error("Token is required and must be a non-empty string")]
    InvalidToken,
    #[error("Amount can have at most 2 decimal places")]
    InvalidAmountPrecision,
    #[error("Currency must be a 3-letter uppercase code")]
    InvalidCurrencyFormat,
    #[error("Note must be a string")]
    InvalidNote,
}

impl ValidationError {
    /// A stable, machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidCurrency => "invalid_currency",
            Self::InvalidToken => "invalid_token",
            Self::InvalidAmountPrecision => "invalid_amount_precision",
            Self::InvalidCurrencyFormat => "invalid_currency_format",
            Self::InvalidNote => "invalid_note",
        }
    }

    /// The request field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidAmount | Self::InvalidAmountPrecision => "amount",
            Self::InvalidCurrency | Self::InvalidCurrencyFormat => "currency",
            Self::InvalidToken => "token",
            Self::InvalidNote => "note",
        }
    }
}

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid order ID format: '{0}'")]
    InvalidIdentifier(String),
    #[error("No order with id {0}")]
    NotFound(OrderId),
    #[error("Could not allocate a unique order id after {0} attempts")]
    IdAllocationFailed(usize),
    #[error("Storage error: {0}")]
    StoreError(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("X-Webhook-Signature header required")]
    MissingSignature,
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("Malformed webhook payload. {0}")]
    MalformedPayload(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Storage error: {0}")]
    StoreError(#[from] StoreError),
}

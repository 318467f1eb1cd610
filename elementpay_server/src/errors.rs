use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use elementpay_engine::{OrderFlowError, ValidationError, WebhookError};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    ValidationError(#[from] ValidationError),
    #[error("Content-Type must be application/json")]
    InvalidContentType,
    #[error("{0}")]
    InvalidPayload(String),
    #[error("Invalid order ID format")]
    InvalidOrderId(String),
    #[error("No order with id {0}")]
    OrderNotFound(String),
    #[error("X-Webhook-Signature header required")]
    MissingSignature,
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
}

impl ServerError {
    /// The machine-readable code sent in the `error` field of the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError(e) => e.code(),
            Self::InvalidContentType => "invalid_content_type",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::InvalidOrderId(_) => "invalid_order_id",
            Self::OrderNotFound(_) => "order_not_found",
            Self::MissingSignature => "missing_signature",
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidStatus(_) => "invalid_status",
            Self::InitializeError(_) | Self::ConfigurationError(_) | Self::IOError(_) | Self::BackendError(_) => {
                "server_error"
            },
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::InvalidOrderId(_) => StatusCode::BAD_REQUEST,
            Self::OrderNotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingSignature => StatusCode::UNAUTHORIZED,
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            // The details stay in the server log
            error!("💻️ Request failed with an internal error. {self}");
            "An internal error occurred. Please try again later.".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(json!({ "error": self.code(), "message": message }).to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::Validation(e) => Self::ValidationError(e),
            OrderFlowError::InvalidIdentifier(id) => Self::InvalidOrderId(id),
            OrderFlowError::NotFound(id) => Self::OrderNotFound(id.to_string()),
            OrderFlowError::IdAllocationFailed(_) => Self::BackendError(e.to_string()),
            OrderFlowError::StoreError(e) => Self::BackendError(format!("Storage error: {e}")),
        }
    }
}

impl From<WebhookError> for ServerError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::MissingSignature => Self::MissingSignature,
            WebhookError::InvalidSignature => Self::InvalidSignature,
            WebhookError::MalformedPayload(msg) => Self::InvalidPayload(msg),
            WebhookError::InvalidStatus(status) => Self::InvalidStatus(status),
            WebhookError::StoreError(e) => Self::BackendError(format!("Storage error: {e}")),
        }
    }
}

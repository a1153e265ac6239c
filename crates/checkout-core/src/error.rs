//! Error Types

use thiserror::Error;

/// Result type alias for checkout flow operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Checkout flow error types
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// A required input field was missing or empty
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-2xx from an upstream call outside the order pipeline
    #[error("Upstream error: {status}")]
    Upstream { status: u16, body: serde_json::Value },

    /// Checkout to order conversion rejected upstream
    #[error("Failed to create order: upstream returned {status}")]
    OrderCreationFailed { status: u16, body: serde_json::Value },

    /// Conversion succeeded but the response carried no `data.id`
    #[error("Order response did not contain an order ID")]
    MissingOrderId,

    /// Order detail lookup rejected upstream
    #[error("Failed to fetch order details: upstream returned {status}")]
    OrderDetailsUnavailable { status: u16, body: serde_json::Value },

    /// Order update rejected upstream
    #[error("Failed to update order: upstream returned {status}")]
    OrderUpdateFailed { status: u16, body: serde_json::Value },

    /// 2xx response with an unexpected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Network failure, upstream unreachable
    #[error("Transport error: {0}")]
    Transport(String),

    /// Stage did not resolve within its time budget
    #[error("Stage '{stage}' timed out after {millis}ms")]
    Timeout { stage: String, millis: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CheckoutError {
    /// Upstream HTTP status carried by this error, if any
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. }
            | Self::OrderCreationFailed { status, .. }
            | Self::OrderDetailsUnavailable { status, .. }
            | Self::OrderUpdateFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream response body carried by this error, if any
    pub const fn upstream_body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Upstream { body, .. }
            | Self::OrderCreationFailed { body, .. }
            | Self::OrderDetailsUnavailable { body, .. }
            | Self::OrderUpdateFailed { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            _ => self.upstream_status().is_some_and(|s| s >= 500 || s == 429),
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => "Missing required parameters".into(),
            Self::Transport(_) => "The BigCommerce API could not be reached. Please try again.".into(),
            Self::Timeout { stage, .. } => format!("The '{stage}' step took too long to respond."),
            Self::Config(_) => "Service configuration error.".into(),
            other => other.to_string(),
        }
    }
}

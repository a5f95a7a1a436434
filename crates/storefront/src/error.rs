//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Responses carry a JSON body of the form `{"message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{CheckoutError, GatewayError};
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Checkout pipeline failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Storage operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart
                | CheckoutError::AmountBelowMinimum
                | CheckoutError::PaymentVerificationFailed
                | CheckoutError::InvalidPaymentMethodForRoute
                | CheckoutError::InvalidStatus => StatusCode::BAD_REQUEST,
                CheckoutError::DuplicatePayment | CheckoutError::AlreadyCancelled => {
                    StatusCode::CONFLICT
                }
                CheckoutError::NotFound => StatusCode::NOT_FOUND,
                CheckoutError::Unauthorized => StatusCode::FORBIDDEN,
                CheckoutError::Gateway(_) => StatusCode::BAD_GATEWAY,
                CheckoutError::SequencerUnavailable(_) | CheckoutError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Store(err) => match err {
                StoreError::DuplicateItem | StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::ItemNotFound | StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::Database(_) | StoreError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal details stay out of responses.
    fn message(&self) -> String {
        match self {
            Self::Checkout(err) => match err {
                CheckoutError::SequencerUnavailable(_) | CheckoutError::Store(_) => {
                    "Internal server error".to_string()
                }
                CheckoutError::Gateway(GatewayError::Api { message, .. }) => message.clone(),
                CheckoutError::Gateway(_) => "Payment gateway error".to_string(),
                other => other.to_string(),
            },
            Self::Store(err) => match err {
                StoreError::Database(_) | StoreError::DataCorruption(_) => {
                    "Internal server error".to_string()
                }
                other => other.to_string(),
            },
            Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "message": self.message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

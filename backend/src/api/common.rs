//! Response envelope and error translation for the HTTP layer.
//!
//! Every endpoint answers with an `ApiResponse`. Failures carry a
//! machine-readable `error_type` next to the human-readable message.
//!
//! # Error Handling Flow
//! 1. Services return a `ServiceError`
//! 2. `service_error_to_http` picks the status code and a client-safe message
//! 3. Internal detail (store errors, hashing errors) is logged, never returned
//!
//! All token failures collapse to one `unauthenticated` response, and both
//! halves of a failed login share one `invalid_credentials` response.

use crate::errors::ServiceError;
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Response timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
}

/// Error half of every handler's return type.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>, error_type: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with no payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> ApiError {
    let (status, error_type, message) = match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message)
        }
        ServiceError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            ServiceError::InvalidCredentials.to_string(),
        ),
        ServiceError::EmailAlreadyRegistered { .. } => (
            StatusCode::CONFLICT,
            "email_already_registered",
            "Email already registered".to_string(),
        ),
        ServiceError::UserNotFound { .. } => (
            StatusCode::NOT_FOUND,
            "user_not_found",
            "User not found".to_string(),
        ),
        ServiceError::MalformedToken { .. }
        | ServiceError::ExpiredToken
        | ServiceError::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "Authentication required".to_string(),
        ),
        ServiceError::Timeout { operation } => {
            tracing::error!("Timed out: {}", operation);
            (
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                "Request timed out".to_string(),
            )
        }
        ServiceError::StoreUnavailable { source } => {
            tracing::error!("User store error: {:#}", source);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "Service temporarily unavailable".to_string(),
            )
        }
        error @ (ServiceError::HashingFailure { .. } | ServiceError::SigningFailure { .. }) => {
            tracing::error!("Internal error: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
    };

    (status, Json(ApiResponse::<()>::error(message, error_type)))
}

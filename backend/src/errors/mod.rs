//! Global application error types.
//!
//! `ServiceError` is shared by every layer of the identity backend. The
//! credential manager and token codec produce the precise kinds
//! (`HashingFailure`, `MalformedToken`, `ExpiredToken`, ...); the token
//! service and auth service fold them into the user-safe kinds
//! (`Unauthenticated`, `InvalidCredentials`) before anything reaches the
//! HTTP boundary.

use thiserror::Error;

/// Errors raised by a `UserStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend could not serve the request.
    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered: {email}")]
    EmailAlreadyRegistered { email: String },

    #[error("User not found: {identifier}")]
    UserNotFound { identifier: String },

    #[error("Malformed token: {reason}")]
    MalformedToken { reason: String },

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Password hashing failed: {message}")]
    HashingFailure { message: String },

    #[error("Token signing failed: {message}")]
    SigningFailure { message: String },

    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("User store unavailable: {source}")]
    StoreUnavailable {
        #[from]
        source: anyhow::Error,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn email_already_registered(email: impl Into<String>) -> Self {
        Self::EmailAlreadyRegistered {
            email: email.into(),
        }
    }

    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::UserNotFound {
            identifier: identifier.into(),
        }
    }

    pub fn malformed_token(reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            reason: reason.into(),
        }
    }

    pub fn hashing_failure(message: impl Into<String>) -> Self {
        Self::HashingFailure {
            message: message.into(),
        }
    }

    pub fn signing_failure(message: impl Into<String>) -> Self {
        Self::SigningFailure {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(email) => Self::email_already_registered(email),
            StoreError::Unavailable(source) => Self::StoreUnavailable { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflict_maps_to_email_already_registered() {
        let error: ServiceError = StoreError::Conflict("a@x.com".to_string()).into();
        assert!(matches!(
            error,
            ServiceError::EmailAlreadyRegistered { ref email } if email == "a@x.com"
        ));
    }

    #[test]
    fn store_failure_maps_to_store_unavailable() {
        let error: ServiceError = StoreError::Unavailable(anyhow::anyhow!("pool closed")).into();
        assert!(matches!(error, ServiceError::StoreUnavailable { .. }));
    }

    #[test]
    fn invalid_credentials_message_does_not_say_which_half_failed() {
        let message = ServiceError::InvalidCredentials.to_string();
        assert_eq!(message, "Invalid email or password");
    }
}

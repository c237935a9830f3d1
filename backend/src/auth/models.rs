//! Request and response payloads for the authentication endpoints.
//!
//! Requests carry plaintext passwords and are therefore `Deserialize` only;
//! none of them implements `Serialize` or a field-revealing `Debug`.

use crate::database::models::{User, UserUpdate};
use crate::errors::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration payload
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1-255 characters"))]
    pub name: String,

    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl RegisterRequest {
    /// Trims the name and normalizes the email so validation sees the stored values.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

/// Login request payload
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

/// Profile update; absent fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1-255 characters"))]
    pub name: Option<String>,

    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|name| name.trim().to_string()),
            email: self.email.map(|email| normalize_email(&email)),
        }
    }

    pub fn into_update(self) -> UserUpdate {
        UserUpdate {
            name: self.name,
            email: self.email,
        }
    }
}

/// Password change payload. `old_password` must match the stored hash.
#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,

    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Result of a successful login. Tokens leave the service as cookies.
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for LoginOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOutcome")
            .field("user", &self.user)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Login response body
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub expires_in: u64, // Access token lifetime in seconds
}

/// Token refresh response body
#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub expires_in: u64,
}

/// Token validation response body
#[derive(Debug, Serialize)]
pub struct TokenStatus {
    pub valid: bool,
    pub user_id: String,
}

/// Emails are the login key; compare them case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Runs `validator` rules and flattens failures into one message.
pub fn validate_request<T: Validate>(request: &T) -> ServiceResult<()> {
    if let Err(validation_errors) = request.validate() {
        let mut error_messages: Vec<String> = validation_errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();
        error_messages.sort();
        return Err(ServiceError::validation(error_messages.join(", ")));
    }
    Ok(())
}

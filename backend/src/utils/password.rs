//! Password hashing and verification.
//!
//! Wraps bcrypt: every hash carries its own random salt and cost factor, and
//! verification compares digests in constant time. bcrypt only reads the first
//! 72 bytes of input, so longer passwords are rejected rather than silently
//! truncated. Password strength is not judged here.

use crate::errors::{ServiceError, ServiceResult};
use crate::utils::blocking::spawn_with_deadline;
use bcrypt::BcryptError;
use std::sync::Arc;
use std::time::Duration;

/// Plaintext verified against when a login names an unknown email, so both
/// failure paths pay for one bcrypt verification.
const DUMMY_PASSWORD: &str = "identity-backend-dummy-password";

#[derive(Clone)]
pub struct PasswordManager {
    cost: u32,
    timeout: Duration,
    dummy_hash: Arc<str>,
}

impl PasswordManager {
    /// Create a manager hashing at `cost` with `timeout` per async call.
    ///
    /// # Errors
    /// Returns `ServiceError::HashingFailure` if the cost is out of range.
    pub fn new(cost: u32, timeout: Duration) -> ServiceResult<Self> {
        let dummy_hash = hash_with_cost(DUMMY_PASSWORD, cost)?;
        Ok(Self {
            cost,
            timeout,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Hash a plaintext password.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` for a password bcrypt would truncate and
    /// `ServiceError::HashingFailure` if bcrypt fails
    pub fn hash(&self, plaintext: &str) -> ServiceResult<String> {
        hash_with_cost(plaintext, self.cost)
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// # Returns
    /// `true` if the password matches, `false` otherwise
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` for a password bcrypt would truncate and
    /// `ServiceError::HashingFailure` if `hashed` is not a bcrypt hash
    pub fn verify(&self, hashed: &str, plaintext: &str) -> ServiceResult<bool> {
        bcrypt::non_truncating_verify(plaintext, hashed)
            .map_err(|e| map_bcrypt_error("Password verification failed", e))
    }

    /// `hash` on the blocking pool, bounded by the configured timeout.
    pub async fn hash_async(&self, plaintext: String) -> ServiceResult<String> {
        let manager = self.clone();
        spawn_with_deadline("password hash", self.timeout, move || manager.hash(&plaintext)).await
    }

    /// `verify` on the blocking pool, bounded by the configured timeout.
    pub async fn verify_async(&self, hashed: String, plaintext: String) -> ServiceResult<bool> {
        let manager = self.clone();
        spawn_with_deadline("password verify", self.timeout, move || {
            manager.verify(&hashed, &plaintext)
        })
        .await
    }

    /// Burns one verification against a throwaway hash. Always `false`.
    pub async fn verify_dummy(&self, plaintext: String) -> ServiceResult<bool> {
        let hashed = self.dummy_hash.to_string();
        self.verify_async(hashed, plaintext).await.map(|_| false)
    }
}

fn hash_with_cost(plaintext: &str, cost: u32) -> ServiceResult<String> {
    bcrypt::non_truncating_hash(plaintext, cost)
        .map_err(|e| map_bcrypt_error("Password hashing failed", e))
}

fn map_bcrypt_error(context: &str, error: BcryptError) -> ServiceError {
    match error {
        BcryptError::Truncation(_) => {
            ServiceError::validation("password: Password is too long")
        }
        other => ServiceError::hashing_failure(format!("{context}: {other}")),
    }
}

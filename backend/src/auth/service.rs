//! Core business logic for the authentication system.
//!
//! `AuthService` composes the user store, the password manager and the token
//! service into the registration, login, profile and password-change flows.
//! Store calls run under the configured deadline; hashing runs on the
//! blocking pool under the same deadline.

use crate::auth::models::*;
use crate::auth::token_service::TokenService;
use crate::database::models::{NewUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::UserStore;
use crate::utils::blocking::with_deadline;
use crate::utils::password::PasswordManager;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Authentication service for handling registration, login and profile management
pub struct AuthService {
    store: Arc<dyn UserStore>,
    passwords: PasswordManager,
    tokens: Arc<TokenService>,
    store_timeout: Duration,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(
        store: Arc<dyn UserStore>,
        passwords: PasswordManager,
        tokens: Arc<TokenService>,
        store_timeout: Duration,
    ) -> Self {
        AuthService {
            store,
            passwords,
            tokens,
            store_timeout,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user.
    ///
    /// # Errors
    /// - `ServiceError::Validation` for malformed input
    /// - `ServiceError::EmailAlreadyRegistered` if the email is taken
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<User> {
        let request = request.normalized();
        validate_request(&request)?;
        let email = request.email;

        if self.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::email_already_registered(email));
        }

        let password_hash = self.passwords.hash_async(request.password).await?;
        let new_user = NewUser::new(request.name, email, password_hash);

        // The store re-checks uniqueness, which covers a concurrent registration.
        let user = with_deadline("insert user", self.store_timeout, async {
            self.store.insert(new_user).await.map_err(ServiceError::from)
        })
        .await?;

        info!(user_id = %user.id, backend = self.store.backend_name(), "user registered");
        Ok(user)
    }

    /// Authenticate a user and mint an access/refresh token pair.
    ///
    /// An unknown email and a wrong password both yield
    /// `ServiceError::InvalidCredentials`, and both pay for one bcrypt check.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginOutcome> {
        let request = request.normalized();
        validate_request(&request)?;

        let Some(user) = self.find_by_email(&request.email).await? else {
            self.passwords.verify_dummy(request.password).await?;
            warn!("login rejected: unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        let verified = self
            .passwords
            .verify_async(user.password_hash.clone(), request.password)
            .await?;
        if !verified {
            warn!(user_id = %user.id, "login rejected: password mismatch");
            return Err(ServiceError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_access_token(&user.id)?;
        let refresh_token = self.tokens.issue_refresh_token(&user.id)?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Apply the supplied profile fields to the authenticated user.
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> ServiceResult<User> {
        let request = request.normalized();
        validate_request(&request)?;
        let update = request.into_update();
        if update.is_empty() {
            return self.get_profile(user_id).await;
        }

        let updated = with_deadline("update user", self.store_timeout, async {
            self.store
                .update_fields(user_id, &update)
                .await
                .map_err(ServiceError::from)
        })
        .await?;

        if !updated {
            return Err(ServiceError::user_not_found(user_id));
        }

        info!(user_id, "profile updated");
        self.get_profile(user_id).await
    }

    /// Fetch the profile of `user_id`.
    pub async fn get_profile(&self, user_id: &str) -> ServiceResult<User> {
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::user_not_found(user_id))
    }

    /// Replace the password of `user_id`.
    ///
    /// `old_password` is verified against the currently stored hash before
    /// `new_password` is hashed and stored. The argument order is
    /// (user, old, new).
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let user = self.get_profile(user_id).await?;

        let verified = self
            .passwords
            .verify_async(user.password_hash, old_password.to_string())
            .await?;
        if !verified {
            warn!(user_id, "password change rejected: old password mismatch");
            return Err(ServiceError::InvalidCredentials);
        }

        let new_hash = self.passwords.hash_async(new_password.to_string()).await?;

        let updated = with_deadline("update password", self.store_timeout, async {
            self.store
                .update_password_hash(user_id, &new_hash)
                .await
                .map_err(ServiceError::from)
        })
        .await?;

        if !updated {
            return Err(ServiceError::user_not_found(user_id));
        }

        info!(user_id, "password changed");
        Ok(())
    }

    /// Exchange a refresh token for a new access token.
    pub fn refresh(&self, refresh_token: &str) -> ServiceResult<String> {
        self.tokens.refresh(refresh_token)
    }

    /// Revoke whichever tokens the client presented. Undecodable tokens are
    /// skipped: logging out must always succeed for the client.
    pub fn logout(&self, access_token: Option<&str>, refresh_token: Option<&str>) {
        for token in [access_token, refresh_token].into_iter().flatten() {
            if self.tokens.revoke(token).is_err() {
                warn!("logout skipped an invalid token");
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        with_deadline("find user by email", self.store_timeout, async {
            self.store.find_by_email(email).await.map_err(ServiceError::from)
        })
        .await
    }

    async fn find_by_id(&self, user_id: &str) -> ServiceResult<Option<User>> {
        with_deadline("find user by id", self.store_timeout, async {
            self.store.find_by_id(user_id).await.map_err(ServiceError::from)
        })
        .await
    }
}

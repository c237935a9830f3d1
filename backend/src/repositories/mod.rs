//! Persistence layer for user identity records.
//!
//! `UserStore` is the seam the auth service talks to. Lookups report a missing
//! user as `None` (or `false` for updates) rather than as an error, so callers
//! can tell "not found" apart from "backend failed".

use crate::database::models::{NewUser, User, UserUpdate};
use crate::errors::StoreResult;
use async_trait::async_trait;

pub mod memory;
pub mod user_repository;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    /// Inserts a user. A duplicate email yields `StoreError::Conflict`.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;

    /// Applies the supplied fields. Returns `false` when no user has `id`.
    async fn update_fields(&self, id: &str, update: &UserUpdate) -> StoreResult<bool>;

    /// Replaces the stored hash. Returns `false` when no user has `id`.
    async fn update_password_hash(&self, id: &str, password_hash: &str) -> StoreResult<bool>;

    fn backend_name(&self) -> &'static str;
}

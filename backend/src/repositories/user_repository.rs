//! Database repository for user management operations.
//!
//! SQLite-backed `UserStore`. Email uniqueness is enforced by the
//! `idx_users_email` unique index, so two racing registrations for the same
//! address cannot both succeed.

use crate::database::models::{NewUser, User, UserUpdate};
use crate::errors::{StoreError, StoreResult};
use crate::repositories::UserStore;
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool (cheap to clone)
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Maps a failed write to a conflict when the email index rejected it.
fn map_write_error(error: sqlx::Error, email: Option<&str>) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return StoreError::Conflict(email.unwrap_or_default().to_string());
        }
    }
    StoreError::Unavailable(anyhow::Error::new(error).context("user write failed"))
}

#[async_trait]
impl UserStore for UserRepository {
    /// Retrieves a user by their email.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("failed to look up user by email")?;

        Ok(user)
    }

    /// Retrieves a user by their unique identifier.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to look up user by id")?;

        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let now = Utc::now();
        let email = user.email.clone();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, Some(&email)))
    }

    async fn update_fields(&self, id: &str, update: &UserUpdate) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.name.as_deref())
        .bind(update.email.as_deref())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, update.email.as_deref()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to update password hash")?;

        Ok(result.rows_affected() > 0)
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

//! Rust structs that represent database table mappings.
//!
//! `User` is the stored identity record. Its password hash is skipped by
//! serde and redacted from `Debug`, so handing a `User` to the HTTP layer or a
//! log line never exposes it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// A user about to be inserted. The hash has already been computed.
#[derive(Clone)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name,
            email,
            password_hash,
        }
    }

    /// Materialises the stored record with both timestamps set to `now`.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of the mutable profile fields.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    pub fn apply(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        user.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        NewUser::new(
            "Ana".to_string(),
            "a@x.com".to_string(),
            "$2b$04$abcdefghijklmnopqrstuu".to_string(),
        )
        .into_user(Utc::now())
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("$2b$"));
        assert_eq!(json["email"], "a@x.com");
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let rendered = format!("{:?}", sample_user());
        assert!(!rendered.contains("$2b$"));
    }

    #[test]
    fn test_update_applies_only_supplied_fields() {
        let mut user = sample_user();
        let update = UserUpdate {
            name: Some("Ana Maria".to_string()),
            email: None,
        };
        update.apply(&mut user, Utc::now());
        assert_eq!(user.name, "Ana Maria");
        assert_eq!(user.email, "a@x.com");
    }

    #[test]
    fn test_new_users_get_distinct_ids() {
        assert_ne!(sample_user().id, sample_user().id);
    }
}

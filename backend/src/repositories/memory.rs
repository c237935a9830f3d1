//! In-memory implementation of the user store.
//!
//! Users live in a `HashMap` keyed by id behind a `tokio::sync::RwLock`.
//! Not durable: state is lost on restart. Used by tests and local runs that do
//! not need a database file. Email uniqueness is checked under the write lock,
//! which gives the same guarantee as the SQLite unique index.

use crate::database::models::{NewUser, User, UserUpdate};
use crate::errors::{StoreError, StoreResult};
use crate::repositories::UserStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

fn email_taken(users: &HashMap<String, User>, email: &str, except_id: Option<&str>) -> bool {
    users
        .values()
        .any(|user| user.email == email && Some(user.id.as_str()) != except_id)
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(StoreError::Conflict(user.email));
        }

        let user = user.into_user(Utc::now());
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update_fields(&self, id: &str, update: &UserUpdate) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        if let Some(email) = &update.email {
            if email_taken(&users, email, Some(id)) {
                return Err(StoreError::Conflict(email.clone()));
            }
        }

        match users.get_mut(id) {
            Some(user) => {
                update.apply(user, Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser::new("Ana".to_string(), email.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("a@x.com")).await.unwrap();

        let result = store.insert(new_user("a@x.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_user_may_keep_own_email_on_update() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("a@x.com")).await.unwrap();

        let update = UserUpdate {
            name: Some("Ana Maria".to_string()),
            email: Some("a@x.com".to_string()),
        };
        assert!(store.update_fields(&user.id, &update).await.unwrap());
    }

    #[tokio::test]
    async fn test_updates_on_missing_user_return_false() {
        let store = InMemoryUserStore::new();
        let update = UserUpdate {
            name: Some("Ghost".to_string()),
            email: None,
        };
        assert!(!store.update_fields("missing", &update).await.unwrap());
        assert!(!store.update_password_hash("missing", "h").await.unwrap());
    }
}

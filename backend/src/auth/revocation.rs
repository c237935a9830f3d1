//! In-process deny-list of revoked token ids.
//!
//! Signed tokens stay cryptographically valid until they expire, so revocation
//! needs state. Each entry maps a `jti` to the token's own `exp`; once that
//! moment passes the codec rejects the token anyway and the entry is pruned.
//! The list lives in this process only. Replicas do not share it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct RevocationList {
    entries: RwLock<HashMap<String, i64>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `jti` as revoked until `expires_at`, pruning stale entries.
    pub fn revoke(&self, jti: &str, expires_at: i64, now: i64) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, exp| *exp >= now);
        if expires_at >= now {
            entries.insert(jti.to_string(), expires_at);
        }
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(jti)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoked_until_expiry() {
        let list = RevocationList::new();
        list.revoke("jti-1", 200, 100);

        assert!(list.is_revoked("jti-1"));
        assert!(!list.is_revoked("jti-2"));
    }

    #[test]
    fn test_expired_entries_are_pruned() {
        let list = RevocationList::new();
        list.revoke("short", 150, 100);
        list.revoke("long", 500, 100);
        list.revoke("later", 600, 200);

        assert_eq!(list.len(), 2);
        assert!(!list.is_revoked("short"));
        assert!(list.is_revoked("long"));
    }

    #[test]
    fn test_revoke_prunes_as_it_goes() {
        let list = RevocationList::new();
        list.revoke("old", 150, 100);
        list.revoke("new", 900, 300);

        assert_eq!(list.len(), 1);
        assert!(list.is_revoked("new"));
    }

    #[test]
    fn test_already_expired_token_is_not_stored() {
        let list = RevocationList::new();
        list.revoke("dead", 50, 100);
        assert_eq!(list.len(), 0);
    }
}

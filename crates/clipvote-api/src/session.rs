//! In-process bearer-token denylist.
//!
//! Contention is many readers (every authenticated request) against rare
//! writers (logouts), so a reader-preferred `RwLock` fits. Being
//! in-process, the denylist does not survive restarts and does not share
//! state across API replicas; a deployment that scales horizontally swaps
//! this for a shared TTL store behind the same interface.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

/// Thread-safe set of revoked tokens with expiry times.
#[derive(Debug, Default)]
pub struct SessionStore {
    revoked: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a token until its expiry time.
    pub fn revoke(&self, token: impl Into<String>, expiry: DateTime<Utc>) {
        let mut revoked = self.revoked.write().expect("session store lock poisoned");
        revoked.insert(token.into(), expiry);
    }

    /// Whether a token is currently revoked. Finding an expired entry
    /// removes it (lazy eviction) and reports the token as not revoked.
    pub fn is_revoked(&self, token: &str) -> bool {
        let expired = {
            let revoked = self.revoked.read().expect("session store lock poisoned");
            match revoked.get(token) {
                None => return false,
                Some(expiry) if Utc::now() > *expiry => true,
                Some(_) => return true,
            }
        };

        if expired {
            let mut revoked = self.revoked.write().expect("session store lock poisoned");
            // Re-check under the write lock; another thread may have raced.
            if revoked.get(token).is_some_and(|expiry| Utc::now() > *expiry) {
                revoked.remove(token);
            }
        }
        false
    }

    /// Remove every expired entry.
    pub fn sweep(&self) {
        let now = Utc::now();
        let mut revoked = self.revoked.write().expect("session store lock poisoned");
        revoked.retain(|_, expiry| now <= *expiry);
    }

    /// Number of tracked tokens (expired entries included until evicted).
    pub fn len(&self) -> usize {
        self.revoked.read().expect("session store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_unknown_token_is_not_revoked() {
        let store = SessionStore::new();
        assert!(!store.is_revoked("token-a"));
    }

    #[test]
    fn test_revoked_token_until_expiry() {
        let store = SessionStore::new();
        store.revoke("token-a", Utc::now() + Duration::hours(24));
        assert!(store.is_revoked("token-a"));
        assert!(!store.is_revoked("token-b"));
    }

    #[test]
    fn test_expired_entry_lazily_evicted() {
        let store = SessionStore::new();
        store.revoke("token-a", Utc::now() - Duration::seconds(1));

        assert!(!store.is_revoked("token-a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = SessionStore::new();
        store.revoke("live", Utc::now() + Duration::hours(1));
        store.revoke("dead", Utc::now() - Duration::hours(1));

        store.sweep();
        assert_eq!(store.len(), 1);
        assert!(store.is_revoked("live"));
    }
}

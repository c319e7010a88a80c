//! Logout tracking via per-subject issued-after watermarks.
//!
//! Tokens are stateless, so logout needs one piece of shared mutable state:
//! a map from subject to the instant of its last logout. A token is revoked
//! iff it was issued at or before that instant. This keeps memory bounded by
//! the number of recently logged-out subjects instead of the number of
//! outstanding tokens.

use std::collections::HashMap;
use std::sync::RwLock;

use userhub_core::AccountId;

/// Concurrent watermark map: many readers during validation, a single short
/// write on logout. No global lock is held across any storage call.
pub struct RevocationWatermarks {
    inner: RwLock<HashMap<AccountId, i64>>,
    /// Seconds after which a watermark can no longer affect any live token
    /// (the longest token lifetime) and is pruned.
    retention_secs: i64,
}

impl RevocationWatermarks {
    pub fn new(retention_secs: i64) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            retention_secs,
        }
    }

    /// Stamp `subject` as logged out at `now` (unix seconds).
    ///
    /// Watermarks only move forward; piggybacks pruning of entries that can
    /// no longer match any unexpired token.
    pub fn revoke(&self, subject: AccountId, now: i64) {
        let mut map = self.inner.write().expect("revocation lock poisoned");
        let entry = map.entry(subject).or_insert(now);
        *entry = (*entry).max(now);

        let horizon = now - self.retention_secs;
        map.retain(|_, wm| *wm >= horizon);
    }

    /// Is a token issued at `iat` (unix seconds) revoked for `subject`?
    pub fn is_revoked(&self, subject: AccountId, iat: i64) -> bool {
        let map = self.inner.read().expect("revocation lock poisoned");
        map.get(&subject).is_some_and(|wm| iat <= *wm)
    }
}

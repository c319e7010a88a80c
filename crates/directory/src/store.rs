//! Persistence port for the directory engine.

use std::sync::Arc;

use async_trait::async_trait;

use userhub_core::{AccountId, StoreError};

use crate::account::{AccountWithGroups, BriefAccount};
use crate::draft::NewAccount;
use crate::patch::AccountChanges;

/// Storage contract for account records and group memberships.
///
/// Multi-step operations (`insert`, `apply_patch`) must execute inside a
/// single transaction; the username unique constraint is the authoritative
/// guard against concurrent creators and must surface as
/// [`StoreError::UniqueViolation`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch an active account with its current group set (one consistent
    /// snapshot). Inactive accounts read as absent.
    async fn fetch_active(&self, id: AccountId) -> Result<Option<AccountWithGroups>, StoreError>;

    /// Brief projection of active accounts, `LIMIT limit OFFSET offset`.
    async fn list_active(&self, limit: i64, offset: i64)
        -> Result<Vec<BriefAccount>, StoreError>;

    /// Username lookup across active *and* inactive accounts (usernames stay
    /// reserved through deactivation).
    async fn find_id_by_username(&self, username: &str) -> Result<Option<AccountId>, StoreError>;

    /// Insert the account and its group rows atomically.
    async fn insert(&self, record: NewAccount) -> Result<AccountWithGroups, StoreError>;

    /// Apply a field mask to an active account: scalar update (or plain fetch
    /// when the mask has no scalar fields) plus whole-set group replacement
    /// when `changes.groups` is present, all-or-nothing. `None` when the
    /// account is missing or inactive.
    async fn apply_patch(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountWithGroups>, StoreError>;

    /// Conditional transition `is_active: !active → active`. False when zero
    /// rows matched (missing id or already in the target state — the two are
    /// indistinguishable by design).
    async fn set_active(&self, id: AccountId, active: bool) -> Result<bool, StoreError>;
}

#[async_trait]
impl<T: AccountStore + ?Sized> AccountStore for Arc<T> {
    async fn fetch_active(&self, id: AccountId) -> Result<Option<AccountWithGroups>, StoreError> {
        (**self).fetch_active(id).await
    }

    async fn list_active(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BriefAccount>, StoreError> {
        (**self).list_active(limit, offset).await
    }

    async fn find_id_by_username(&self, username: &str) -> Result<Option<AccountId>, StoreError> {
        (**self).find_id_by_username(username).await
    }

    async fn insert(&self, record: NewAccount) -> Result<AccountWithGroups, StoreError> {
        (**self).insert(record).await
    }

    async fn apply_patch(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountWithGroups>, StoreError> {
        (**self).apply_patch(id, changes).await
    }

    async fn set_active(&self, id: AccountId, active: bool) -> Result<bool, StoreError> {
        (**self).set_active(id, active).await
    }
}

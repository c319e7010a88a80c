//! In-memory store (dev/test).
//!
//! One mutex over the whole state gives every multi-step operation the same
//! all-or-nothing behavior the Postgres adapter gets from transactions. Not a
//! cache: when this store is selected it *is* the source of truth.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use userhub_auth::{CredentialStore, Permission, PermissionSource, StoredCredentials};
use userhub_core::{AccountId, GroupId, StoreError};
use userhub_directory::{
    Account, AccountChanges, AccountStore, AccountWithGroups, BriefAccount, Group, NewAccount,
};

#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    password_hash: String,
    group_ids: Vec<GroupId>,
}

#[derive(Debug, Clone)]
struct StoredGroup {
    name: String,
    permissions: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<AccountId, StoredAccount>,
    groups: HashMap<GroupId, StoredGroup>,
}

/// Mutex-guarded account/group state implementing the full store surface.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: Mutex<State>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group and the permissions it grants. Seeding hook for dev
    /// bootstrap and tests; Postgres deployments manage this via SQL.
    pub fn add_group(&self, name: &str, permissions: &[&str]) -> GroupId {
        let id = GroupId::new();
        let mut state = self.inner.lock().expect("store lock poisoned");
        state.groups.insert(
            id,
            StoredGroup {
                name: name.to_string(),
                permissions: permissions.iter().map(|p| p.to_string()).collect(),
            },
        );
        id
    }
}

impl State {
    fn groups_of(&self, stored: &StoredAccount) -> Vec<Group> {
        stored
            .group_ids
            .iter()
            .filter_map(|gid| {
                self.groups.get(gid).map(|g| Group {
                    id: *gid,
                    name: g.name.clone(),
                })
            })
            .collect()
    }

    fn with_groups(&self, stored: &StoredAccount) -> AccountWithGroups {
        AccountWithGroups {
            account: stored.account.clone(),
            groups: self.groups_of(stored),
        }
    }

    fn username_owner(&self, username: &str) -> Option<AccountId> {
        self.accounts
            .values()
            .find(|s| s.account.username == username)
            .map(|s| s.account.id)
    }

    fn ensure_groups_exist(&self, ids: &[GroupId]) -> Result<(), StoreError> {
        for gid in ids {
            if !self.groups.contains_key(gid) {
                return Err(StoreError::backend(anyhow::anyhow!(
                    "unknown group id {gid}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn fetch_active(&self, id: AccountId) -> Result<Option<AccountWithGroups>, StoreError> {
        let state = self.inner.lock().expect("store lock poisoned");
        Ok(state
            .accounts
            .get(&id)
            .filter(|s| s.account.is_active)
            .map(|s| state.with_groups(s)))
    }

    async fn list_active(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BriefAccount>, StoreError> {
        let state = self.inner.lock().expect("store lock poisoned");
        let mut active: Vec<&StoredAccount> = state
            .accounts
            .values()
            .filter(|s| s.account.is_active)
            .collect();
        // Stable, restartable order: ids are time-ordered UUIDv7.
        active.sort_by_key(|s| *s.account.id.as_uuid());

        Ok(active
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|s| BriefAccount {
                id: s.account.id,
                username: s.account.username.clone(),
                first_name: s.account.first_name.clone(),
                second_name: s.account.second_name.clone(),
            })
            .collect())
    }

    async fn find_id_by_username(&self, username: &str) -> Result<Option<AccountId>, StoreError> {
        let state = self.inner.lock().expect("store lock poisoned");
        Ok(state.username_owner(username))
    }

    async fn insert(&self, record: NewAccount) -> Result<AccountWithGroups, StoreError> {
        let mut state = self.inner.lock().expect("store lock poisoned");

        if state.username_owner(&record.username).is_some() {
            return Err(StoreError::UniqueViolation("username"));
        }
        state.ensure_groups_exist(&record.group_ids)?;

        let stored = StoredAccount {
            account: Account {
                id: AccountId::new(),
                username: record.username,
                first_name: record.first_name,
                second_name: record.second_name,
                patronymic: record.patronymic,
                birth: record.birth,
                email: record.email,
                phone: record.phone,
                is_active: true,
            },
            password_hash: record.password_hash,
            group_ids: record.group_ids,
        };

        let result = state.with_groups(&stored);
        state.accounts.insert(stored.account.id, stored);
        Ok(result)
    }

    async fn apply_patch(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountWithGroups>, StoreError> {
        let mut state = self.inner.lock().expect("store lock poisoned");

        if let Some(username) = &changes.username {
            if state.username_owner(username).is_some_and(|owner| owner != id) {
                return Err(StoreError::UniqueViolation("username"));
            }
        }
        if let Some(group_ids) = &changes.groups {
            state.ensure_groups_exist(group_ids)?;
        }

        let Some(stored) = state.accounts.get_mut(&id).filter(|s| s.account.is_active) else {
            return Ok(None);
        };

        if let Some(username) = changes.username {
            stored.account.username = username;
        }
        if let Some(hash) = changes.password_hash {
            stored.password_hash = hash;
        }
        if let Some(v) = changes.first_name {
            stored.account.first_name = Some(v);
        }
        if let Some(v) = changes.second_name {
            stored.account.second_name = Some(v);
        }
        if let Some(v) = changes.patronymic {
            stored.account.patronymic = Some(v);
        }
        if let Some(v) = changes.birth {
            stored.account.birth = Some(v);
        }
        if let Some(v) = changes.email {
            stored.account.email = Some(v);
        }
        if let Some(v) = changes.phone {
            stored.account.phone = Some(v);
        }
        if let Some(group_ids) = changes.groups {
            stored.group_ids = group_ids;
        }

        let stored = stored.clone();
        Ok(Some(state.with_groups(&stored)))
    }

    async fn set_active(&self, id: AccountId, active: bool) -> Result<bool, StoreError> {
        let mut state = self.inner.lock().expect("store lock poisoned");
        match state.accounts.get_mut(&id) {
            Some(s) if s.account.is_active != active => {
                s.account.is_active = active;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryAccountStore {
    async fn credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, StoreError> {
        let state = self.inner.lock().expect("store lock poisoned");
        Ok(state
            .accounts
            .values()
            .find(|s| s.account.username == username && s.account.is_active)
            .map(|s| StoredCredentials {
                account_id: s.account.id,
                password_hash: s.password_hash.clone(),
            }))
    }
}

#[async_trait]
impl PermissionSource for InMemoryAccountStore {
    async fn permissions_for(&self, account: AccountId) -> Result<Vec<Permission>, StoreError> {
        let state = self.inner.lock().expect("store lock poisoned");

        // A deactivated subject holds no permissions, even with a live token.
        let Some(stored) = state
            .accounts
            .get(&account)
            .filter(|s| s.account.is_active)
        else {
            return Ok(Vec::new());
        };

        let mut names: Vec<String> = stored
            .group_ids
            .iter()
            .filter_map(|gid| state.groups.get(gid))
            .flat_map(|g| g.permissions.iter().cloned())
            .collect();
        names.sort();
        names.dedup();
        Ok(names.into_iter().map(Permission::new).collect())
    }
}

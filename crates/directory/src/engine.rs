//! The directory engine: business semantics over the [`AccountStore`] port.

use std::collections::HashSet;

use userhub_core::{AccountId, GroupId, ServiceError, ServiceResult};

use crate::account::{AccountWithGroups, BriefAccount};
use crate::draft::{AccountDraft, NewAccount};
use crate::patch::AccountPatch;
use crate::store::AccountStore;

/// Repeated group ids in a request collapse to one membership row; the
/// stores expect a set (the join table's primary key would reject dupes).
fn dedup_groups(ids: &mut Vec<GroupId>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

/// Create/read/update/deactivate/reactivate over account records.
///
/// Account state machine: `Active ⇄ Inactive`, explicit transitions only;
/// create always yields Active.
pub struct DirectoryEngine<S> {
    store: S,
    page_size: i64,
}

impl<S: AccountStore> DirectoryEngine<S> {
    pub fn new(store: S, page_size: i64) -> Self {
        Self { store, page_size }
    }

    /// Full record including groups. Inactive accounts are not found.
    pub async fn get_by_id(&self, id: AccountId) -> ServiceResult<AccountWithGroups> {
        self.store
            .fetch_active(id)
            .await?
            .ok_or(ServiceError::NotFoundOrInactive)
    }

    /// Brief projection of active accounts for a zero-based page index.
    pub async fn list_page(&self, page: i64) -> ServiceResult<Vec<BriefAccount>> {
        if page < 0 {
            return Err(ServiceError::validation("page index must be non-negative"));
        }
        // An offset too large to represent points past every record anyway.
        let Some(offset) = page.checked_mul(self.page_size) else {
            return Ok(Vec::new());
        };
        let accounts = self.store.list_active(self.page_size, offset).await?;
        Ok(accounts)
    }

    /// Create an account associated with exactly `group_ids`.
    ///
    /// The username pre-check gives a friendly early conflict, but it is not
    /// atomic against concurrent creators; the storage unique constraint is
    /// the authoritative guard and surfaces as the same conflict.
    pub async fn create(
        &self,
        draft: AccountDraft,
        mut group_ids: Vec<GroupId>,
    ) -> ServiceResult<AccountWithGroups> {
        draft.validate(&group_ids)?;
        dedup_groups(&mut group_ids);

        if self
            .store
            .find_id_by_username(&draft.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::conflict("username already exists"));
        }

        let password_hash = userhub_auth::password::hash(&draft.password)?;
        let record = NewAccount {
            username: draft.username,
            password_hash,
            first_name: draft.first_name,
            second_name: draft.second_name,
            patronymic: draft.patronymic,
            birth: draft.birth,
            email: draft.email,
            phone: draft.phone,
            group_ids,
        };

        let created = self.store.insert(record).await?;
        tracing::info!(account = %created.account.id, "account created");
        Ok(created)
    }

    /// Partial update. Only fields present in the patch are modified; a group
    /// list, when present, replaces the whole membership set in the same
    /// transaction. An empty patch returns current state unchanged.
    pub async fn update(
        &self,
        id: AccountId,
        patch: AccountPatch,
    ) -> ServiceResult<AccountWithGroups> {
        patch.validate()?;

        if let Some(username) = &patch.username {
            match self.store.find_id_by_username(username).await? {
                Some(owner) if owner != id => {
                    return Err(ServiceError::conflict("username already exists"));
                }
                _ => {}
            }
        }

        let mut changes = patch.into_changes()?;
        if let Some(groups) = &mut changes.groups {
            dedup_groups(groups);
        }
        self.store
            .apply_patch(id, changes)
            .await?
            .ok_or(ServiceError::NotFoundOrInactive)
    }

    /// `Active → Inactive`. Fails as not-found when the id is missing *or*
    /// already inactive; the engine cannot (and must not) tell which.
    pub async fn deactivate(&self, id: AccountId) -> ServiceResult<()> {
        if self.store.set_active(id, false).await? {
            tracing::info!(account = %id, "account deactivated");
            Ok(())
        } else {
            Err(ServiceError::NotFoundOrInactive)
        }
    }

    /// `Inactive → Active`, symmetric to [`Self::deactivate`].
    pub async fn reactivate(&self, id: AccountId) -> ServiceResult<()> {
        if self.store.set_active(id, true).await? {
            tracing::info!(account = %id, "account reactivated");
            Ok(())
        } else {
            Err(ServiceError::NotFoundOrInactive)
        }
    }
}

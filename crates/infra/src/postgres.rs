//! Postgres-backed account store (sqlx).
//!
//! Every multi-step flow runs inside a single transaction; read-committed
//! isolation is sufficient because the username unique constraint — not the
//! engine's pre-check — is the final arbiter of uniqueness races, and the
//! activation toggles are conditional single-statement updates.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use userhub_auth::{CredentialStore, Permission, PermissionSource, StoredCredentials};
use userhub_core::{AccountId, GroupId, StoreError};
use userhub_directory::{
    Account, AccountChanges, AccountStore, AccountWithGroups, BriefAccount, Group, NewAccount,
};

const ACCOUNT_COLUMNS: &str =
    "id, username, first_name, second_name, patronymic, birth, email, phone, is_active";

/// Production store over a sqlx connection pool.
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(StoreError::backend)?;
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(Self::new(pool))
    }

    async fn groups_of<'e, E>(executor: E, account_id: Uuid) -> Result<Vec<Group>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query(
            r#"
            SELECT "group".id, "group".name
            FROM "group"
            JOIN account_group ON account_group.group_id = "group".id
            WHERE account_group.account_id = $1
            ORDER BY "group".name
            "#,
        )
        .bind(account_id)
        .fetch_all(executor)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Group {
                    id: GroupId::from_uuid(row.try_get("id")?),
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: AccountId::from_uuid(row.try_get("id")?),
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        second_name: row.try_get("second_name")?,
        patronymic: row.try_get("patronymic")?,
        birth: row.try_get("birth")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        is_active: row.try_get("is_active")?,
    })
}

/// The unique constraint firing under concurrent creators is an expected
/// outcome, not a backend fault.
fn map_unique(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::UniqueViolation("username")
        }
        _ => StoreError::backend(err),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn fetch_active(&self, id: AccountId) -> Result<Option<AccountWithGroups>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;
        let uuid = *id.as_uuid();

        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(uuid)
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let account = account_from_row(&row).map_err(StoreError::backend)?;
        let groups = Self::groups_of(&mut *tx, uuid)
            .await
            .map_err(StoreError::backend)?;

        tx.commit().await.map_err(StoreError::backend)?;
        Ok(Some(AccountWithGroups { account, groups }))
    }

    async fn list_active(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BriefAccount>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, username, first_name, second_name \
             FROM account WHERE is_active = TRUE \
             ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter()
            .map(|row| {
                Ok(BriefAccount {
                    id: AccountId::from_uuid(row.try_get("id").map_err(StoreError::backend)?),
                    username: row.try_get("username").map_err(StoreError::backend)?,
                    first_name: row.try_get("first_name").map_err(StoreError::backend)?,
                    second_name: row.try_get("second_name").map_err(StoreError::backend)?,
                })
            })
            .collect()
    }

    async fn find_id_by_username(&self, username: &str) -> Result<Option<AccountId>, StoreError> {
        let row = sqlx::query("SELECT id FROM account WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(|r| {
            Ok(AccountId::from_uuid(
                r.try_get("id").map_err(StoreError::backend)?,
            ))
        })
        .transpose()
    }

    async fn insert(&self, record: NewAccount) -> Result<AccountWithGroups, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;
        let id = AccountId::new();
        let uuid = *id.as_uuid();

        let row = sqlx::query(&format!(
            "INSERT INTO account \
             (id, username, password_hash, first_name, second_name, patronymic, birth, email, phone) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(uuid)
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(&record.first_name)
        .bind(&record.second_name)
        .bind(&record.patronymic)
        .bind(record.birth)
        .bind(&record.email)
        .bind(&record.phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique)?;

        let account = account_from_row(&row).map_err(StoreError::backend)?;

        for group_id in &record.group_ids {
            sqlx::query("INSERT INTO account_group (account_id, group_id) VALUES ($1, $2)")
                .bind(uuid)
                .bind(*group_id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(StoreError::backend)?;
        }

        let groups = Self::groups_of(&mut *tx, uuid)
            .await
            .map_err(StoreError::backend)?;

        tx.commit().await.map_err(StoreError::backend)?;
        Ok(AccountWithGroups { account, groups })
    }

    async fn apply_patch(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountWithGroups>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;
        let uuid = *id.as_uuid();

        let row = if changes.has_scalar_changes() {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE account SET ");
            {
                let mut sep = qb.separated(", ");
                if let Some(v) = &changes.username {
                    sep.push("username = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = &changes.password_hash {
                    sep.push("password_hash = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = &changes.first_name {
                    sep.push("first_name = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = &changes.second_name {
                    sep.push("second_name = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = &changes.patronymic {
                    sep.push("patronymic = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = changes.birth {
                    sep.push("birth = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = &changes.email {
                    sep.push("email = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = &changes.phone {
                    sep.push("phone = ");
                    sep.push_bind_unseparated(v);
                }
                sep.push("updated_at = now()");
            }
            qb.push(" WHERE id = ");
            qb.push_bind(uuid);
            qb.push(" AND is_active = TRUE RETURNING ");
            qb.push(ACCOUNT_COLUMNS);

            qb.build()
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_unique)?
        } else {
            // No scalar fields in the mask: still fetch and return current
            // state rather than silently no-op.
            sqlx::query(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = $1 AND is_active = TRUE"
            ))
            .bind(uuid)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::backend)?
        };

        let Some(row) = row else {
            return Ok(None);
        };
        let account = account_from_row(&row).map_err(StoreError::backend)?;

        if let Some(group_ids) = &changes.groups {
            sqlx::query("DELETE FROM account_group WHERE account_id = $1")
                .bind(uuid)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::backend)?;

            for group_id in group_ids {
                sqlx::query("INSERT INTO account_group (account_id, group_id) VALUES ($1, $2)")
                    .bind(uuid)
                    .bind(*group_id.as_uuid())
                    .execute(&mut *tx)
                    .await
                    .map_err(StoreError::backend)?;
            }
        }

        let groups = Self::groups_of(&mut *tx, uuid)
            .await
            .map_err(StoreError::backend)?;

        tx.commit().await.map_err(StoreError::backend)?;
        Ok(Some(AccountWithGroups { account, groups }))
    }

    async fn set_active(&self, id: AccountId, active: bool) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE account SET is_active = $2, updated_at = now() \
             WHERE id = $1 AND is_active = $3",
        )
        .bind(*id.as_uuid())
        .bind(active)
        .bind(!active)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CredentialStore for PgAccountStore {
    async fn credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, StoreError> {
        let row = sqlx::query(
            "SELECT id, password_hash FROM account WHERE username = $1 AND is_active = TRUE",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.map(|r| {
            Ok(StoredCredentials {
                account_id: AccountId::from_uuid(r.try_get("id").map_err(StoreError::backend)?),
                password_hash: r.try_get("password_hash").map_err(StoreError::backend)?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl PermissionSource for PgAccountStore {
    async fn permissions_for(&self, account: AccountId) -> Result<Vec<Permission>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT permission.name \
             FROM permission \
             JOIN group_permission ON group_permission.permission_id = permission.id \
             JOIN account_group ON account_group.group_id = group_permission.group_id \
             JOIN account ON account.id = account_group.account_id \
             WHERE account.id = $1 AND account.is_active = TRUE",
        )
        .bind(*account.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("name").map_err(StoreError::backend)?;
                Ok(Permission::new(name))
            })
            .collect()
    }
}

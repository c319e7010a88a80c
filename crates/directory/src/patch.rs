//! Partial-update field mask.
//!
//! Each field is independently present-or-absent; absent fields are left
//! untouched in storage. This replaces the ad-hoc "whatever keys appear in
//! the payload" construction with one explicit structured value.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use userhub_core::{GroupId, ServiceError};

use crate::draft::validate_email;

/// Inbound partial update. `groups`, when present, replaces the entire
/// membership set (not an incremental add/remove).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub patronymic: Option<String>,
    pub birth: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub groups: Option<Vec<GroupId>>,
}

impl AccountPatch {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if let Some(username) = &self.username {
            if username.trim().is_empty() {
                return Err(ServiceError::validation("username must not be empty"));
            }
        }
        if let Some(password) = &self.password {
            if password.is_empty() {
                return Err(ServiceError::validation("password must not be empty"));
            }
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Hash the password (if present) and produce the storage-facing mask.
    pub fn into_changes(self) -> Result<AccountChanges, ServiceError> {
        let password_hash = match self.password {
            Some(plain) => Some(userhub_auth::password::hash(&plain)?),
            None => None,
        };
        Ok(AccountChanges {
            username: self.username,
            password_hash,
            first_name: self.first_name,
            second_name: self.second_name,
            patronymic: self.patronymic,
            birth: self.birth,
            email: self.email,
            phone: self.phone,
            groups: self.groups,
        })
    }
}

/// Storage-facing field mask; identical shape to [`AccountPatch`] except the
/// password has been hashed.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub patronymic: Option<String>,
    pub birth: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub groups: Option<Vec<GroupId>>,
}

impl AccountChanges {
    /// Whether any scalar column changes. An all-absent mask is still a valid
    /// update request: the engine fetches and returns current state instead
    /// of silently failing.
    pub fn has_scalar_changes(&self) -> bool {
        self.username.is_some()
            || self.password_hash.is_some()
            || self.first_name.is_some()
            || self.second_name.is_some()
            || self.patronymic.is_some()
            || self.birth.is_some()
            || self.email.is_some()
            || self.phone.is_some()
    }
}

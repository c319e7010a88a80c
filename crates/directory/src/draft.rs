//! Signup input and its storage-facing counterpart.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use userhub_core::{GroupId, ServiceError};

/// Inbound signup payload. Holds the plaintext password transiently; the
/// engine hashes it before anything is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountDraft {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub patronymic: Option<String>,
    pub birth: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl AccountDraft {
    /// Reject malformed or missing input before touching storage.
    pub fn validate(&self, group_ids: &[GroupId]) -> Result<(), ServiceError> {
        if self.username.trim().is_empty() {
            return Err(ServiceError::validation("username must not be empty"));
        }
        if self.password.is_empty() {
            return Err(ServiceError::validation("password must not be empty"));
        }
        if group_ids.is_empty() {
            return Err(ServiceError::validation(
                "at least one group must be assigned",
            ));
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_email(email: &str) -> Result<(), ServiceError> {
    // Deliberately shallow: reject the obviously broken, leave the rest to
    // the mail system.
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if valid {
        Ok(())
    } else {
        Err(ServiceError::validation(format!("invalid email: {email}")))
    }
}

/// Storage-facing record for an insert. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub patronymic: Option<String>,
    pub birth: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub group_ids: Vec<GroupId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(username: &str, password: &str) -> AccountDraft {
        AccountDraft {
            username: username.into(),
            password: password.into(),
            first_name: None,
            second_name: None,
            patronymic: None,
            birth: None,
            email: None,
            phone: None,
        }
    }

    #[test]
    fn requires_username_password_and_groups() {
        let groups = vec![GroupId::new()];
        assert!(draft("alice", "pw").validate(&groups).is_ok());
        assert!(draft("", "pw").validate(&groups).is_err());
        assert!(draft("  ", "pw").validate(&groups).is_err());
        assert!(draft("alice", "").validate(&groups).is_err());
        assert!(draft("alice", "pw").validate(&[]).is_err());
    }

    #[test]
    fn screens_obviously_broken_emails() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@nodot").is_err());
    }
}

//! Account records as they cross the service boundary.
//!
//! None of these carry password material; the stored hash stays below the
//! [`crate::AccountStore`] port and is never projected outward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use userhub_core::{AccountId, GroupId};

/// Full identity record. "Deletion" flips `is_active`; rows are never
/// physically removed and ids are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub patronymic: Option<String>,
    pub birth: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
}

/// An account together with its current group set — exactly the join rows
/// for that account at the instant of the read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountWithGroups {
    #[serde(flatten)]
    pub account: Account,
    pub groups: Vec<Group>,
}

/// Brief projection used by the paged listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefAccount {
    pub id: AccountId,
    pub username: String,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
}

/// A named permission bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

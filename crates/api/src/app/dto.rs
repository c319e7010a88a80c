//! Request/response payloads specific to the HTTP surface.
//!
//! Domain records ([`userhub_directory::AccountWithGroups`] and friends)
//! serialize directly; only the shapes with no domain counterpart live here.

use serde::{Deserialize, Serialize};

use userhub_auth::TokenPair;
use userhub_core::GroupId;
use userhub_directory::AccountDraft;

/// Password login body, form-encoded in the OAuth2 password-flow shape.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer",
        }
    }
}

/// Signup body: the account draft plus the group ids it joins.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(flatten)]
    pub draft: AccountDraft,
    #[serde(default)]
    pub groups: Vec<GroupId>,
}

/// Zero-based page index for the user listing; defaults to the first page.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: i64,
}

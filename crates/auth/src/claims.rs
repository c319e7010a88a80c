//! Token claims model (transport-agnostic).

use serde::{Deserialize, Serialize};

use userhub_core::AccountId;

/// Discriminates the two token flavors minted by the issuer.
///
/// Encoded inside the payload so a refresh token can never be presented where
/// an access token is expected (and vice versa).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims encoded inside every issued token.
///
/// `sub` is the account's stable identifier, not the username, so later
/// username changes do not invalidate outstanding tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: account identifier.
    pub sub: AccountId,

    /// Access vs refresh.
    pub kind: TokenKind,

    /// Issued-at, unix seconds. Compared against the revocation watermark.
    pub iat: i64,

    /// Expiry, unix seconds.
    pub exp: i64,
}

//! Token Issuer: login, refresh rotation, logout, validation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use userhub_core::{AccountId, AuthError, ServiceResult, StoreError};

use crate::claims::{TokenClaims, TokenKind};
use crate::password;
use crate::revocation::RevocationWatermarks;
use crate::token::{Hs256TokenCodec, TokenLifetimes, TokenPair};

/// What the issuer needs from persistence: a password hash per username,
/// active accounts only. This is the issuer's only storage touchpoint.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, StoreError>;
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    async fn credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, StoreError> {
        (**self).credentials_by_username(username).await
    }
}

/// Stored login material for one account.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub account_id: AccountId,
    pub password_hash: String,
}

/// Mints and validates signed, time-bounded access/refresh pairs.
///
/// Per-token state machine: `Issued → Active → {Expired | Revoked}`, with the
/// terminal states absorbing — expiry comes from the encoded `exp`, revocation
/// from the per-subject watermark, and neither is ever undone for an
/// outstanding token.
pub struct TokenIssuer<C> {
    codec: Hs256TokenCodec,
    lifetimes: TokenLifetimes,
    revoked: RevocationWatermarks,
    credentials: C,
}

impl<C: CredentialStore> TokenIssuer<C> {
    pub fn new(secret: &[u8], lifetimes: TokenLifetimes, credentials: C) -> Self {
        Self {
            codec: Hs256TokenCodec::new(secret),
            revoked: RevocationWatermarks::new(lifetimes.refresh.num_seconds()),
            lifetimes,
            credentials,
        }
    }

    /// Verify a username/password pair and mint a fresh token pair.
    ///
    /// An unknown username and a wrong password are deliberately
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, plain_password: &str) -> ServiceResult<TokenPair> {
        let creds = self
            .credentials
            .credentials_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify(plain_password, &creds.password_hash) {
            tracing::debug!(username, "password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.mint_pair(creds.account_id)
    }

    /// Rotate a refresh token into a new access/refresh pair.
    ///
    /// Refresh tokens rotate on every use; the caller must persist the new
    /// refresh token. The old one is not tracked server-side and simply ages
    /// out at its encoded expiry.
    pub fn refresh(&self, refresh_token: &str) -> ServiceResult<TokenPair> {
        let claims = self.decode_live(refresh_token, TokenKind::Refresh)?;
        self.mint_pair(claims.sub)
    }

    /// Mark the token's subject as logged out for the remaining lifetime of
    /// every outstanding token. Tokens minted afterwards validate normally.
    pub fn logout(&self, access_token: &str) -> ServiceResult<()> {
        let claims = self.decode_live(access_token, TokenKind::Access)?;
        self.revoked.revoke(claims.sub, Utc::now().timestamp());
        tracing::info!(subject = %claims.sub, "subject logged out");
        Ok(())
    }

    /// Validate an access token and return its subject.
    pub fn validate(&self, access_token: &str) -> ServiceResult<AccountId> {
        Ok(self.decode_live(access_token, TokenKind::Access)?.sub)
    }

    fn decode_live(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, AuthError> {
        let claims = self.codec.decode(token)?;
        if claims.kind != expected {
            return Err(AuthError::TokenInvalid);
        }
        if self.revoked.is_revoked(claims.sub, claims.iat) {
            return Err(AuthError::TokenRevoked);
        }
        Ok(claims)
    }

    fn mint_pair(&self, subject: AccountId) -> ServiceResult<TokenPair> {
        let now = Utc::now();
        let access_token =
            self.codec
                .mint(subject, TokenKind::Access, now, self.lifetimes.access)?;
        let refresh_token =
            self.codec
                .mint(subject, TokenKind::Refresh, now, self.lifetimes.refresh)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

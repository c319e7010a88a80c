//! Signed token codec (HS256).
//!
//! Tokens are self-contained: signature + encoded expiry, no server-side
//! persistence. The codec is the only place that touches the JWT library, so
//! the expired/invalid distinction is made exactly once.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use userhub_core::{AccountId, AuthError, ServiceError};

use crate::claims::{TokenClaims, TokenKind};

/// Lifetimes for freshly minted tokens.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(30),
            refresh: Duration::days(7),
        }
    }
}

impl TokenLifetimes {
    pub fn for_kind(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
        }
    }
}

/// An access/refresh pair minted together on login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// HS256 mint/verify over [`TokenClaims`].
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The default 60s leeway would keep just-expired tokens alive.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Mint a token for `sub` at `now` with the lifetime of its kind.
    pub fn mint(
        &self,
        sub: AccountId,
        kind: TokenKind,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, ServiceError> {
        let claims = TokenClaims {
            sub,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ServiceError::Storage(format!("token encoding failed: {e}")))
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// Expiry is reported distinctly from every other defect: expired tokens
    /// prompt a re-login, anything else indicates tampering or a protocol
    /// mismatch.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> Hs256TokenCodec {
        Hs256TokenCodec::new(b"test-secret")
    }

    #[test]
    fn mint_then_decode_round_trips() {
        let codec = codec();
        let sub = AccountId::new();
        let token = codec
            .mint(sub, TokenKind::Access, Utc::now(), Duration::minutes(30))
            .unwrap();

        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn expired_token_fails_distinctly() {
        let codec = codec();
        let issued = Utc::now() - Duration::hours(2);
        let token = codec
            .mint(AccountId::new(), TokenKind::Access, issued, Duration::minutes(30))
            .unwrap();

        assert_eq!(codec.decode(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn tampered_token_is_invalid_not_expired() {
        let codec = codec();
        // Expired *and* signed with a different key: signature wins, the
        // caller must not be told this was merely expired.
        let other = Hs256TokenCodec::new(b"other-secret");
        let issued = Utc::now() - Duration::hours(2);
        let token = other
            .mint(AccountId::new(), TokenKind::Access, issued, Duration::minutes(30))
            .unwrap();

        assert_eq!(codec.decode(&token), Err(AuthError::TokenInvalid));

        assert_eq!(codec.decode("garbage.token.here"), Err(AuthError::TokenInvalid));
    }
}

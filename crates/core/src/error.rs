//! Service error model.
//!
//! Every operation exposed over the internal service boundary reports failure
//! as a structured outcome carrying a numeric status and a message. The
//! gateway's only job is mapping that numeric status onto a transport status
//! code; no component below the gateway knows about HTTP.

use thiserror::Error;

/// Result type used across the service layer.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Authentication/token failures.
///
/// Callers must be able to distinguish these: an expired token prompts a
/// re-login, a malformed one indicates tampering or a protocol mismatch, a
/// revoked one means the subject logged out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("token is invalid")]
    TokenInvalid,

    #[error("token has been revoked")]
    TokenRevoked,
}

/// Structured failure returned across the component boundary.
///
/// Components never panic or throw past this interface; unexpected storage
/// faults are caught at the transaction boundary and converted into
/// `Storage`, with detail retained only for internal diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Malformed or missing input. Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Ambiguous by design: distinguishing "never existed" from "deactivated"
    /// is explicitly not supported.
    #[error("not found or deactivated")]
    NotFoundOrInactive,

    /// Uniqueness violation (duplicate username).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authenticated, but the required permission is not granted.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Unexpected persistence fault; always reported generically to callers.
    #[error("internal storage failure")]
    Storage(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Canonical numeric status carried to the boundary adapter.
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFoundOrInactive => 404,
            Self::Conflict(_) => 409,
            Self::PermissionDenied(_) => 403,
            Self::Auth(AuthError::TokenExpired) => 403,
            Self::Auth(_) => 401,
            Self::Storage(_) => 500,
        }
    }
}

/// Error surfaced by storage adapters.
///
/// Converted to `ServiceError` at the component edge: the unique constraint is
/// the authoritative arbiter of uniqueness races, so adapters must report it
/// distinctly rather than folding it into a generic failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    UniqueViolation(&'static str),

    #[error("storage backend failure")]
    Backend(#[source] anyhow::Error),
}

impl StoreError {
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(what) => {
                ServiceError::Conflict(format!("{what} already exists"))
            }
            StoreError::Backend(e) => ServiceError::Storage(format!("{e:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_statuses_match_contract() {
        assert_eq!(ServiceError::validation("x").status(), 400);
        assert_eq!(ServiceError::NotFoundOrInactive.status(), 404);
        assert_eq!(ServiceError::conflict("x").status(), 409);
        assert_eq!(ServiceError::PermissionDenied("x".into()).status(), 403);
        assert_eq!(
            ServiceError::Auth(AuthError::InvalidCredentials).status(),
            401
        );
        assert_eq!(ServiceError::Auth(AuthError::TokenInvalid).status(), 401);
        assert_eq!(ServiceError::Auth(AuthError::TokenRevoked).status(), 401);
        assert_eq!(ServiceError::Auth(AuthError::TokenExpired).status(), 403);
        assert_eq!(ServiceError::Storage("boom".into()).status(), 500);
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err: ServiceError = StoreError::UniqueViolation("username").into();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(err.status(), 409);
    }

    #[test]
    fn storage_message_is_generic() {
        let err = ServiceError::Storage("connection reset".into());
        assert_eq!(err.to_string(), "internal storage failure");
    }
}

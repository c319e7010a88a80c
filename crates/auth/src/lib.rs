//! `userhub-auth` — token lifecycle and permission evaluation.
//!
//! This crate is intentionally decoupled from HTTP and storage: the issuer
//! reaches the credential store exactly once (initial login) through the
//! [`CredentialStore`] trait, and the evaluator resolves grants through
//! [`PermissionSource`]. Everything else is pure computation over
//! self-contained signed tokens.

pub mod claims;
pub mod evaluator;
pub mod issuer;
pub mod password;
pub mod permissions;
pub mod revocation;
pub mod token;

pub use claims::{TokenClaims, TokenKind};
pub use evaluator::{PermissionEvaluator, PermissionSource};
pub use issuer::{CredentialStore, StoredCredentials, TokenIssuer};
pub use permissions::Permission;
pub use revocation::RevocationWatermarks;
pub use token::{Hs256TokenCodec, TokenLifetimes, TokenPair};

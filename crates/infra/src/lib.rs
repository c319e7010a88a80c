//! `userhub-infra` — storage adapters for the directory and auth ports.
//!
//! Two interchangeable implementations of the same trait surface
//! ([`AccountStore`](userhub_directory::AccountStore),
//! [`CredentialStore`](userhub_auth::CredentialStore),
//! [`PermissionSource`](userhub_auth::PermissionSource)):
//!
//! - [`PgAccountStore`] — Postgres via sqlx, the production store.
//! - [`InMemoryAccountStore`] — dev/test double with the same semantics.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryAccountStore;
pub use postgres::PgAccountStore;

#[cfg(test)]
mod integration_tests;

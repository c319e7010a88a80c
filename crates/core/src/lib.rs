//! `userhub-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers and the error taxonomy shared by every service
//! component.

pub mod error;
pub mod id;

pub use error::{AuthError, ServiceError, ServiceResult, StoreError};
pub use id::{AccountId, GroupId};

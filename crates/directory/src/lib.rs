//! `userhub-directory` — account domain model and the directory engine.
//!
//! The engine owns create/read/update/deactivate/reactivate semantics,
//! including the partial-update field mask and atomic group-membership
//! replacement. Persistence is reached only through the [`AccountStore`]
//! port; adapters live in `userhub-infra`.

pub mod account;
pub mod draft;
pub mod engine;
pub mod patch;
pub mod store;

pub use account::{Account, AccountWithGroups, BriefAccount, Group};
pub use draft::{AccountDraft, NewAccount};
pub use engine::DirectoryEngine;
pub use patch::{AccountChanges, AccountPatch};
pub use store::AccountStore;

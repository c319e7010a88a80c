//! Permission Evaluator: allow/deny against a required permission name.

use std::sync::Arc;

use async_trait::async_trait;

use userhub_core::{AccountId, ServiceError, ServiceResult, StoreError};

use crate::issuer::{CredentialStore, TokenIssuer};
use crate::permissions::Permission;

/// Resolves the current grants of a subject (account → group → permission).
#[async_trait]
pub trait PermissionSource: Send + Sync {
    async fn permissions_for(&self, account: AccountId) -> Result<Vec<Permission>, StoreError>;
}

#[async_trait]
impl<T: PermissionSource + ?Sized> PermissionSource for Arc<T> {
    async fn permissions_for(&self, account: AccountId) -> Result<Vec<Permission>, StoreError> {
        (**self).permissions_for(account).await
    }
}

/// Pure read/decision gate in front of every directory operation.
pub struct PermissionEvaluator<C, P> {
    issuer: Arc<TokenIssuer<C>>,
    permissions: P,
}

impl<C: CredentialStore, P: PermissionSource> PermissionEvaluator<C, P> {
    pub fn new(issuer: Arc<TokenIssuer<C>>, permissions: P) -> Self {
        Self {
            issuer,
            permissions,
        }
    }

    /// Check that the bearer of `access_token` holds `required`.
    ///
    /// Token errors are propagated unchanged (not translated), so callers can
    /// tell "not authenticated" from "authenticated but unauthorized". The
    /// grant check is an exact string match.
    pub async fn check(
        &self,
        access_token: &str,
        required: &Permission,
    ) -> ServiceResult<AccountId> {
        let subject = self.issuer.validate(access_token)?;

        let granted = self.permissions.permissions_for(subject).await?;
        if granted.iter().any(|p| p == required) {
            Ok(subject)
        } else {
            tracing::debug!(subject = %subject, required = %required, "permission denied");
            Err(ServiceError::PermissionDenied(required.to_string()))
        }
    }
}

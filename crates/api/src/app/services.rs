use std::sync::Arc;

use userhub_auth::{CredentialStore, PermissionEvaluator, PermissionSource, TokenIssuer};
use userhub_directory::{AccountDraft, AccountStore, DirectoryEngine};
use userhub_infra::in_memory::InMemoryAccountStore;
use userhub_infra::postgres::PgAccountStore;

use crate::app::routes::users::{
    CREATE_USER, DELETE_USER, READ_USER, REACTIVATE_USER, UPDATE_USER,
};
use crate::config::AppConfig;

/// Every permission the service knows about. The seeded development admin
/// group carries all of them.
pub const ALL_PERMISSIONS: [&str; 5] = [
    READ_USER,
    CREATE_USER,
    UPDATE_USER,
    DELETE_USER,
    REACTIVATE_USER,
];

/// Shared handles handed to every request handler.
#[derive(Clone)]
pub struct AppServices {
    pub issuer: Arc<TokenIssuer<Arc<dyn CredentialStore>>>,
    pub evaluator: Arc<PermissionEvaluator<Arc<dyn CredentialStore>, Arc<dyn PermissionSource>>>,
    pub directory: Arc<DirectoryEngine<Arc<dyn AccountStore>>>,
}

impl AppServices {
    /// Wire the service graph around a single store that backs all three ports.
    pub fn from_store<S>(config: &AppConfig, store: Arc<S>) -> Self
    where
        S: AccountStore + CredentialStore + PermissionSource + 'static,
    {
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let permissions: Arc<dyn PermissionSource> = store.clone();
        let accounts: Arc<dyn AccountStore> = store;

        let issuer = Arc::new(TokenIssuer::new(
            config.jwt_secret.as_bytes(),
            config.token_lifetimes(),
            credentials,
        ));
        let evaluator = Arc::new(PermissionEvaluator::new(issuer.clone(), permissions));
        let directory = Arc::new(DirectoryEngine::new(accounts, config.page_size));

        Self { issuer, evaluator, directory }
    }
}

/// Connect to Postgres when configured, otherwise fall back to the seeded
/// in-memory store meant for local development.
pub async fn build_services(config: &AppConfig) -> AppServices {
    match &config.database_url {
        Some(url) => {
            let store = PgAccountStore::connect(url)
                .await
                .unwrap_or_else(|e| panic!("database connection failed: {e}"));
            AppServices::from_store(config, Arc::new(store))
        }
        None => {
            let store = Arc::new(InMemoryAccountStore::new());
            let admins = store.add_group("admins", &ALL_PERMISSIONS);
            let services = AppServices::from_store(config, store);

            let draft = AccountDraft {
                username: "admin".to_string(),
                password: "admin".to_string(),
                first_name: Some("Dev".to_string()),
                second_name: Some("Admin".to_string()),
                patronymic: None,
                birth: None,
                email: None,
                phone: None,
            };
            match services.directory.create(draft, vec![admins]).await {
                Ok(_) => tracing::warn!("seeded development admin account (admin/admin)"),
                Err(e) => tracing::error!("failed to seed development admin: {e}"),
            }

            services
        }
    }
}

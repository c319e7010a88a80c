use axum::{Extension, Router};

use crate::config::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full application router, wiring services from configuration.
pub async fn build_app(config: &AppConfig) -> Router {
    let services = services::build_services(config).await;
    build_router(services)
}

/// Assemble the router around an already-constructed service set.
///
/// Split out from [`build_app`] so tests can supply their own seeded store.
pub fn build_router(services: AppServices) -> Router {
    Router::new()
        .merge(routes::system::router())
        .nest("/api/v1/account", routes::account::router())
        .nest("/api/v1/users", routes::users::router())
        .layer(Extension(services))
}

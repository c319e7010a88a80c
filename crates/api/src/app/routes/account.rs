//! Token lifecycle endpoints: login, refresh, logout.

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Form, Json, Router};
use serde_json::json;

use userhub_core::ServiceError;

use crate::app::dto::{LoginForm, TokenResponse};
use crate::app::errors::error_response;
use crate::app::routes::common::bearer_token;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/token", post(token))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

async fn token(
    Extension(services): Extension<AppServices>,
    Form(form): Form<LoginForm>,
) -> Response {
    match services
        .issuer
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(pair) => Json(TokenResponse::from(pair)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Rotate a refresh token into a new pair.
///
/// The field is pulled out by hand so a missing or non-string value surfaces
/// as a 400 validation failure instead of a framework body rejection.
async fn refresh(
    Extension(services): Extension<AppServices>,
    body: Option<Json<serde_json::Value>>,
) -> Response {
    let token = body
        .as_ref()
        .and_then(|Json(v)| v.get("refresh_token"))
        .and_then(|v| v.as_str());
    let Some(token) = token else {
        return error_response(&ServiceError::validation("refresh_token is required"));
    };

    match services.issuer.refresh(token) {
        Ok(pair) => Json(TokenResponse::from(pair)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn logout(Extension(services): Extension<AppServices>, headers: HeaderMap) -> Response {
    let token = match bearer_token(&headers) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services.issuer.logout(token) {
        Ok(()) => Json(json!({ "detail": "logged out" })).into_response(),
        Err(e) => error_response(&e),
    }
}

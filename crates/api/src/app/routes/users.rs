//! User directory endpoints. Every route is guarded by one named permission.
//!
//! Bodies on the mutating routes are deserialized after the permission check
//! so an unauthorized caller learns nothing about payload validation, and so
//! malformed JSON comes back as a 400 in the common error shape.

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::de::DeserializeOwned;
use serde_json::json;

use userhub_core::{AccountId, ServiceError};
use userhub_directory::AccountPatch;

use crate::app::dto::{CreateUserRequest, PageQuery};
use crate::app::errors::error_response;
use crate::app::routes::common::require;
use crate::app::services::AppServices;

pub const READ_USER: &str = "READ_USER";
pub const CREATE_USER: &str = "CREATE_USER";
pub const UPDATE_USER: &str = "UPDATE_USER";
pub const DELETE_USER: &str = "DELETE_USER";
pub const REACTIVATE_USER: &str = "REACTIVATE_USER";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).put(update).delete(deactivate))
        .route("/:id/reactivate", post(reactivate))
}

fn parse_body<T: DeserializeOwned>(body: Option<Json<serde_json::Value>>) -> Result<T, Response> {
    let Some(Json(value)) = body else {
        return Err(error_response(&ServiceError::validation(
            "request body is required",
        )));
    };
    serde_json::from_value(value)
        .map_err(|e| error_response(&ServiceError::validation(e.to_string())))
}

async fn list(
    Extension(services): Extension<AppServices>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    if let Err(resp) = require(&services, &headers, READ_USER).await {
        return resp;
    }
    match services.directory.list_page(query.page).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn get_one(
    Extension(services): Extension<AppServices>,
    headers: HeaderMap,
    Path(id): Path<AccountId>,
) -> Response {
    if let Err(resp) = require(&services, &headers, READ_USER).await {
        return resp;
    }
    match services.directory.get_by_id(id).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn create(
    Extension(services): Extension<AppServices>,
    headers: HeaderMap,
    body: Option<Json<serde_json::Value>>,
) -> Response {
    if let Err(resp) = require(&services, &headers, CREATE_USER).await {
        return resp;
    }
    let req: CreateUserRequest = match parse_body(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    match services.directory.create(req.draft, req.groups).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn update(
    Extension(services): Extension<AppServices>,
    headers: HeaderMap,
    Path(id): Path<AccountId>,
    body: Option<Json<serde_json::Value>>,
) -> Response {
    if let Err(resp) = require(&services, &headers, UPDATE_USER).await {
        return resp;
    }
    let patch: AccountPatch = match parse_body(body) {
        Ok(patch) => patch,
        Err(resp) => return resp,
    };
    match services.directory.update(id, patch).await {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn deactivate(
    Extension(services): Extension<AppServices>,
    headers: HeaderMap,
    Path(id): Path<AccountId>,
) -> Response {
    if let Err(resp) = require(&services, &headers, DELETE_USER).await {
        return resp;
    }
    match services.directory.deactivate(id).await {
        Ok(()) => Json(json!({ "detail": "user deactivated" })).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn reactivate(
    Extension(services): Extension<AppServices>,
    headers: HeaderMap,
    Path(id): Path<AccountId>,
) -> Response {
    if let Err(resp) = require(&services, &headers, REACTIVATE_USER).await {
        return resp;
    }
    match services.directory.reactivate(id).await {
        Ok(()) => Json(json!({ "detail": "user reactivated" })).into_response(),
        Err(e) => error_response(&e),
    }
}

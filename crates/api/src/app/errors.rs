//! Service-error to HTTP translation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use userhub_core::ServiceError;

/// Render a failed operation as a JSON error body.
///
/// The body carries the service-level numeric code and a message safe to show
/// to clients; storage detail is logged here and never leaves the process.
pub fn error_response(err: &ServiceError) -> Response {
    if let ServiceError::Storage(detail) = err {
        tracing::error!(%detail, "storage failure surfaced to a request");
    }
    let code = err.status();
    let body = Json(json!({ "code": code, "message": err.to_string() }));
    (transport_status(code), body).into_response()
}

/// Table of known service codes onto transport statuses. Total: anything
/// the table does not know collapses to 500 rather than leaking through.
fn transport_status(code: u16) -> StatusCode {
    match code {
        400 => StatusCode::BAD_REQUEST,
        401 => StatusCode::UNAUTHORIZED,
        403 => StatusCode::FORBIDDEN,
        404 => StatusCode::NOT_FOUND,
        409 => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ServiceError;

pub mod alerts_controller;
pub mod home_controller;
pub mod realtime_controller;
pub mod stocks_controller;
pub mod trades_controller;

pub fn status_for(e: &ServiceError) -> StatusCode {
    match e {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
        ServiceError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{ "success": false, "error": ... }` with the matching status code.
pub fn error_response(e: ServiceError) -> Response {
    let status = status_for(&e);
    if status.is_server_error() {
        tracing::error!(error = %e, "request failed");
    }
    (status, Json(json!({ "success": false, "error": e.to_string() }))).into_response()
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        error_response(self)
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        ServiceError::validation(rejection.body_text())
    }
}

/// `Json` whose rejections use the `{success:false,error}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServiceError))]
pub struct ApiJson<T>(pub T);

/// `Path` whose rejections use the `{success:false,error}` body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServiceError))]
pub struct ApiPath<T>(pub T);

/// Reads a JSON number or numeric string.
pub fn number_field(value: &serde_json::Value, what: &str) -> Result<f64, ServiceError> {
    match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ServiceError::validation(format!("{what} must be a number"))),
        serde_json::Value::String(s) => crate::models::parse_positive(s, what),
        serde_json::Value::Null => Err(ServiceError::validation(format!("{what} is required"))),
        _ => Err(ServiceError::validation(format!("{what} must be a number"))),
    }
}

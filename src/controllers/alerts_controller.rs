use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{error_response, number_field, ApiJson, ApiPath};
use crate::AppState;

#[derive(Deserialize)]
pub struct CreateAlertBody {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub condition: String,
    /// Number or numeric string.
    #[serde(default)]
    pub threshold: Value,
}

// GET /users/:telegram_id/alerts
pub async fn get_alerts(
    State(state): State<AppState>,
    ApiPath(telegram_id): ApiPath<i64>,
) -> Response {
    let user = match state.users.get_or_create(telegram_id).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    let alerts = state.alerts.get_user_alerts(user.id).await;
    (StatusCode::OK, Json(json!({ "success": true, "alerts": alerts }))).into_response()
}

// POST /users/:telegram_id/alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    ApiPath(telegram_id): ApiPath<i64>,
    ApiJson(body): ApiJson<CreateAlertBody>,
) -> Response {
    let user = match state.users.get_or_create(telegram_id).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    let threshold = match number_field(&body.threshold, "threshold") {
        Ok(v) => v,
        Err(e) => return error_response(e),
    };

    match state
        .alerts
        .add_alert(user.id, &body.symbol, &body.condition, threshold)
        .await
    {
        Ok(alert) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "alert_id": alert.id, "alert": alert })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

// DELETE /users/:telegram_id/alerts/:id
pub async fn delete_alert(
    State(state): State<AppState>,
    ApiPath((telegram_id, id)): ApiPath<(i64, i64)>,
) -> Response {
    let user = match state.users.get_or_create(telegram_id).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    match state.alerts.remove_alert(user.id, id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => error_response(e),
    }
}

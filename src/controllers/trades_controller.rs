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
pub struct CreateTradeBody {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub quantity: Value,
    #[serde(default)]
    pub price: Value,
}

// GET /users/:telegram_id/trades
pub async fn get_trades(
    State(state): State<AppState>,
    ApiPath(telegram_id): ApiPath<i64>,
) -> Response {
    let user = match state.users.get_or_create(telegram_id).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    match state.trades.list_trades(user.id).await {
        Ok(trades) => {
            (StatusCode::OK, Json(json!({ "success": true, "trades": trades }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

// POST /users/:telegram_id/trades
pub async fn post_create_trade(
    State(state): State<AppState>,
    ApiPath(telegram_id): ApiPath<i64>,
    ApiJson(body): ApiJson<CreateTradeBody>,
) -> Response {
    let user = match state.users.get_or_create(telegram_id).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    let quantity = match number_field(&body.quantity, "quantity") {
        Ok(v) => v,
        Err(e) => return error_response(e),
    };
    let price = match number_field(&body.price, "price") {
        Ok(v) => v,
        Err(e) => return error_response(e),
    };

    match state
        .trades
        .create_trade(user.id, &body.symbol, &body.action, quantity, price)
        .await
    {
        Ok(trade) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "trade_id": trade.id, "trade": trade })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

// DELETE /users/:telegram_id/trades/:id
pub async fn delete_trade(
    State(state): State<AppState>,
    ApiPath((telegram_id, id)): ApiPath<(i64, i64)>,
) -> Response {
    let user = match state.users.get_or_create(telegram_id).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    match state.trades.delete_trade(user.id, id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => error_response(e),
    }
}

// GET /users/:telegram_id/positions
pub async fn get_positions(
    State(state): State<AppState>,
    ApiPath(telegram_id): ApiPath<i64>,
) -> Response {
    let user = match state.users.get_or_create(telegram_id).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    match state.trades.positions(user.id).await {
        Ok(positions) => (
            StatusCode::OK,
            Json(json!({ "success": true, "positions": positions })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

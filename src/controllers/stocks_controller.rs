use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::{error_response, ApiPath};
use crate::{models::normalize_symbol, AppState};

// GET /quote/:symbol
pub async fn get_quote(State(state): State<AppState>, ApiPath(symbol): ApiPath<String>) -> Response {
    let symbol = match normalize_symbol(&symbol) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    match state.market.quote(&symbol).await {
        Ok(q) => (StatusCode::OK, Json(q)).into_response(),
        Err(e) => error_response(e),
    }
}

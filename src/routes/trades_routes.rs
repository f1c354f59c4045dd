use axum::{Router, routing::{delete, get}};

use crate::{AppState, controllers::trades_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/users/:telegram_id/trades",
            get(trades_controller::get_trades).post(trades_controller::post_create_trade),
        )
        .route("/users/:telegram_id/trades/:id", delete(trades_controller::delete_trade))
        .route("/users/:telegram_id/positions", get(trades_controller::get_positions))
}

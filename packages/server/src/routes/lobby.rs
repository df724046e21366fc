use axum::{routing::get, Router};

use crate::state::AppState;
use crate::utils::websocket;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websocket::handler))
        .with_state(state)
}

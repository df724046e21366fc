use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::models::game::SessionId;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/list", get(list_games))
        .route("/:id", get(get_game))
        .with_state(state)
}

pub async fn list_games(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.list_sessions())
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> impl IntoResponse {
    match state.find_session(id) {
        Some(summary) => (StatusCode::OK, Json(summary)).into_response(),
        None => (StatusCode::NOT_FOUND, Json("Game not found")).into_response(),
    }
}

use crate::state::AppState;
use axum::Router;

mod game;
mod lobby;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/api/game", game::routes(state.clone()))
        .nest("/api/lobby", lobby::routes(state))
}

use crate::routes;
use crate::state::AppState;
use axum::Router;

pub fn create_app() -> Router {
    let state = AppState::new();
    routes::create_routes(state)
}

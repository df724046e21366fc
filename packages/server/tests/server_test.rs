use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use mafia_server::app;
use mafia_server::utils::test_setup::setup_test_env;
use tower::ServiceExt;

#[tokio::test]
async fn test_list_games() {
    setup_test_env();
    let app = app::create_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/game/list")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(body_str, "[]");
}

#[tokio::test]
async fn test_get_game_with_bad_id() {
    setup_test_env();
    let app = app::create_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/game/not-a-uuid")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_websocket_requires_username() {
    setup_test_env();
    let app = app::create_app();

    // ユーザー名なしでは接続できない
    let request = Request::builder()
        .method("GET")
        .uri("/api/lobby/ws")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

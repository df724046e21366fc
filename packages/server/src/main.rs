use anyhow::Context;
use axum::http::{self, HeaderValue, Method};
use dotenvy::dotenv;
use env_logger::Builder;
use log::LevelFilter;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mafia_server::app;
use mafia_server::utils::config::CONFIG;

// ログ設定
fn init_logger() {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Debug)
        .filter_module("tower_http", LevelFilter::Debug)
        .filter_module("axum", LevelFilter::Debug)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .parse_env("RUST_LOG")
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 環境変数をロード
    if let Err(e) = dotenv() {
        eprintln!("Warning: .envファイルの読み込みに失敗しました: {}", e);
    }

    init_logger();

    if CONFIG.admin_usernames.is_empty() {
        log::warn!("ADMIN_USERNAMES is not set; nobody can use admin commands");
    }

    // CORSレイヤーの設定
    let origin = CONFIG
        .allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid ALLOWED_ORIGIN {}", CONFIG.allowed_origin))?;
    let cors = CorsLayer::new()
        .allow_origin([origin])
        .allow_methods([Method::GET])
        .allow_headers([http::header::CONTENT_TYPE]);

    // ルーティングの設定
    let app = app::create_app().layer(cors).layer(
        TraceLayer::new_for_http().make_span_with(|request: &http::Request<_>| {
            tracing::info_span!(
                "HTTP request",
                method = %request.method(),
                uri = %request.uri(),
                headers = ?request.headers()
            )
        }),
    );

    // サーバーの起動
    let addr = CONFIG.bind_addr;
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    log::info!("サーバーを起動しました: http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

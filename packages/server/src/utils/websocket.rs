use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tracing::info;

use crate::models::user::{ServerMessage, User};
use crate::services::registry::LobbyEvent;
use crate::state::AppState;
use crate::utils::config::CONFIG;

const MAX_USERNAME_LEN: usize = 20;

#[derive(Debug, Deserialize)]
pub struct Login {
    pub username: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Query(login): Query<Login>,
    ws: WebSocketUpgrade,
) -> Response {
    let username = login.username.trim().to_string();
    if !valid_username(&username) {
        return (StatusCode::BAD_REQUEST, "Invalid username").into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state, username))
}

fn valid_username(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= MAX_USERNAME_LEN
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

pub async fn handle_socket(ws: WebSocket, state: AppState, username: String) {
    let (user, mut outbox) = User::channel(username.clone(), CONFIG.is_admin(&username));
    let user_id = user.id();
    info!("New WebSocket connection established for {}", username);

    if state.events.send(LobbyEvent::Connect(user)).is_err() {
        log::error!("session registry is not running");
        return;
    }

    let (mut sender, mut receiver) = ws.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbox.recv().await {
            let kicked = matches!(message, ServerMessage::Kicked { .. });
            match serde_json::to_string(&message) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => log::error!("Error serializing message: {}", e),
            }
            // キックされたら接続を閉じる
            if kicked {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    });

    let events = state.events.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if events.send(LobbyEvent::Message { user_id, text }).is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // どちらかが終了したらもう片方も止める
    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }

    info!("WebSocket connection closed for {}", username);
    let _ = state.events.send(LobbyEvent::Disconnect { user_id });
}

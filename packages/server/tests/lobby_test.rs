use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use mafia_server::models::config::GameConfig;
use mafia_server::models::game::{GameType, Lifecycle};
use mafia_server::models::user::{ServerMessage, User};
use mafia_server::services::registry::LobbyEvent;
use mafia_server::state::AppState;

async fn wait_for_text(rx: &mut UnboundedReceiver<ServerMessage>, needle: &str) -> bool {
    let search = async {
        while let Some(message) = rx.recv().await {
            if let ServerMessage::Chat(chat) = message {
                if chat.content.contains(needle) {
                    return true;
                }
            }
        }
        false
    };
    tokio::time::timeout(Duration::from_secs(300), search)
        .await
        .unwrap_or(false)
}

#[tokio::test(start_paused = true)]
async fn test_lobby_players_join_and_the_clock_drives_the_game() {
    let state = AppState::with_config(GameConfig::debug(), GameType::Classic);
    let mut receivers = Vec::new();
    for name in ["alice", "bob", "carol", "dave"] {
        let (user, rx) = User::channel(name, false);
        let user_id = user.id();
        state.events.send(LobbyEvent::Connect(user)).unwrap();
        state
            .events
            .send(LobbyEvent::Message {
                user_id,
                text: "/join".to_string(),
            })
            .unwrap();
        receivers.push(rx);
    }

    // the countdown, then the night alarm, both run off tokio timers
    assert!(wait_for_text(&mut receivers[0], "The game has started!").await);
    let games = state.list_sessions();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].lifecycle, Lifecycle::InPlay);
    assert_eq!(games[0].players.len(), 4);

    assert!(wait_for_text(&mut receivers[1], "Nobody died last night.").await);
    assert!(wait_for_text(&mut receivers[1], "Day 1 begins.").await);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_returns_to_lobby_chat() {
    let state = AppState::with_config(GameConfig::debug(), GameType::OneDay);
    let (alice, mut alice_rx) = User::channel("alice", false);
    let (bob, mut bob_rx) = User::channel("bob", false);
    let (alice_id, bob_id) = (alice.id(), bob.id());
    state.events.send(LobbyEvent::Connect(alice)).unwrap();
    state.events.send(LobbyEvent::Connect(bob)).unwrap();

    let send = |user_id, text: &str| {
        state
            .events
            .send(LobbyEvent::Message {
                user_id,
                text: text.to_string(),
            })
            .unwrap();
    };
    send(alice_id, "/join");
    send(alice_id, "/leave");
    assert!(wait_for_text(&mut alice_rx, "back in the lobby").await);

    send(bob_id, "anyone around?");
    assert!(wait_for_text(&mut alice_rx, "anyone around?").await);
    assert!(wait_for_text(&mut bob_rx, "anyone around?").await);
}

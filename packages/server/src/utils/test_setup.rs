use dotenvy::dotenv;
use std::sync::Once;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::models::user::{GameEvent, ServerMessage, User};
use crate::services::timer::{Alarm, Scheduler};

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        // .envが無い場合のデフォルト値
        if std::env::var("ADMIN_USERNAMES").is_err() {
            std::env::set_var("ADMIN_USERNAMES", "admin");
        }
        if std::env::var("DEFAULT_GAME_TYPE").is_err() {
            std::env::set_var("DEFAULT_GAME_TYPE", "classic");
        }
    });
}

/// Records alarms instead of sleeping, so tests decide when phases end.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pub scheduled: Vec<(Alarm, Duration)>,
}

impl ManualScheduler {
    /// The most recently scheduled alarm.
    pub fn last(&self) -> Option<Alarm> {
        self.scheduled.last().map(|(alarm, _)| *alarm)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, alarm: Alarm, after: Duration) {
        self.scheduled.push((alarm, after));
    }
}

pub fn test_user(name: &str) -> (User, UnboundedReceiver<ServerMessage>) {
    User::channel(name, false)
}

pub fn test_admin(name: &str) -> (User, UnboundedReceiver<ServerMessage>) {
    User::channel(name, true)
}

/// Everything queued for a user so far.
pub fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

/// Chat text queued for a user so far.
pub fn drain_text(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<String> {
    drain(rx)
        .into_iter()
        .filter_map(|m| match m {
            ServerMessage::Chat(chat) => Some(chat.content),
            _ => None,
        })
        .collect()
}

pub fn drain_events(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<GameEvent> {
    drain(rx)
        .into_iter()
        .filter_map(|m| match m {
            ServerMessage::Event(event) => Some(event),
            _ => None,
        })
        .collect()
}

//! Owns every session and the lobby of users who are not in one.
//!
//! All inbound traffic (connections, text, disconnects and phase alarms) is
//! funnelled through one [`LobbyEvent`] queue and handled by a single task,
//! so sessions never need locking.

use std::collections::HashMap;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::models::color::Color;
use crate::models::command::{Command, Input};
use crate::models::config::GameConfig;
use crate::models::game::{GameType, Lifecycle, SessionId, SessionSummary};
use crate::models::user::User;

use super::session::{GameSession, Session};
use super::timer::{Alarm, Scheduler, TokioScheduler};
use super::variants::{ClassicGame, OneDayGame};

#[derive(Debug)]
pub enum LobbyEvent {
    Connect(User),
    Message { user_id: Uuid, text: String },
    Disconnect { user_id: Uuid },
    Alarm(Alarm),
}

pub struct SessionRegistry {
    config: GameConfig,
    default_type: GameType,
    sessions: Vec<Box<dyn Session>>,
    users: HashMap<Uuid, User>,
    // user id -> session they are seated in; absent means the lobby
    locations: HashMap<Uuid, SessionId>,
    created: usize,
    summaries: watch::Sender<Vec<SessionSummary>>,
}

impl SessionRegistry {
    pub fn new(config: GameConfig, default_type: GameType) -> (Self, watch::Receiver<Vec<SessionSummary>>) {
        let (summaries, rx) = watch::channel(Vec::new());
        let registry = Self {
            config,
            default_type,
            sessions: Vec::new(),
            users: HashMap::new(),
            locations: HashMap::new(),
            created: 0,
            summaries,
        };
        (registry, rx)
    }

    pub fn handle(&mut self, event: LobbyEvent, scheduler: &mut dyn Scheduler) {
        match event {
            LobbyEvent::Connect(user) => self.connect(user),
            LobbyEvent::Message { user_id, text } => self.message(user_id, &text, scheduler),
            LobbyEvent::Disconnect { user_id } => self.disconnect(user_id, scheduler),
            LobbyEvent::Alarm(alarm) => self.fire_alarm(&alarm, scheduler),
        }
    }

    pub fn list(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(|s| s.summary()).collect()
    }

    fn session_mut(&mut self, id: SessionId) -> Option<&mut Box<dyn Session>> {
        self.sessions.iter_mut().find(|s| s.id() == id)
    }

    pub fn location(&self, user_id: Uuid) -> Option<SessionId> {
        self.locations.get(&user_id).copied()
    }

    pub fn lobby(&self) -> Vec<&User> {
        self.users
            .values()
            .filter(|u| !self.locations.contains_key(&u.id()))
            .collect()
    }

    pub fn connect(&mut self, user: User) {
        let taken = self
            .users
            .values()
            .any(|u| u.username().eq_ignore_ascii_case(user.username()));
        if taken {
            log::info!("rejecting duplicate username {}", user.username());
            user.kicked(format!("Someone named {} is already connected.", user.username()));
            return;
        }
        self.users.insert(user.id(), user.clone());

        if let Some(session) = self.sessions.iter_mut().find(|s| s.has_ghost(user.username())) {
            if session.reconnect(&user) {
                self.locations.insert(user.id(), session.id());
                self.publish();
                return;
            }
        }

        log::info!("{} entered the lobby", user.username());
        user.header_send("Lobby", None);
        user.send(format!(
            "Welcome, {}. Type /games to see open games, /join to play or /new <classic|oneday> to start one.",
            user.username()
        ));
    }

    pub fn disconnect(&mut self, user_id: Uuid, scheduler: &mut dyn Scheduler) {
        let Some(user) = self.users.remove(&user_id) else {
            log::debug!("disconnect for unknown user {}", user_id);
            return;
        };
        if let Some(id) = self.locations.remove(&user_id) {
            if let Some(session) = self.session_mut(id) {
                session.disconnect(user.username(), scheduler);
            }
        }
        log::info!("{} disconnected", user.username());
        self.sweep();
        self.publish();
    }

    pub fn message(&mut self, user_id: Uuid, text: &str, scheduler: &mut dyn Scheduler) {
        let Some(user) = self.users.get(&user_id).cloned() else {
            log::debug!("message from unknown user {}", user_id);
            return;
        };
        let input = Input::parse(text, user.is_admin());
        let location = self.location(user_id);

        match (input, location) {
            (Input::Command(Command::Games), _) => self.send_listing(&user),
            (Input::Command(Command::Leave), Some(id)) => self.leave(&user, id, scheduler),
            (Input::Command(Command::Join(_) | Command::New(_)), Some(_)) => {
                user.send("Leave your current game first with /leave.");
            }
            (input, Some(id)) => match self.session_mut(id) {
                Some(session) => session.receive_input(&user, input, scheduler),
                None => {
                    log::debug!("{} was placed in missing session {}", user.username(), id);
                    self.locations.remove(&user_id);
                }
            },
            (Input::Command(Command::Join(listing)), None) => self.join(&user, listing),
            (Input::Command(Command::New(kind)), None) => {
                self.create_and_join(&user, kind.as_deref())
            }
            (Input::Chat(text), None) => self.lobby_chat(&user, &text),
            (Input::Invalid(e), None) => user.send_colored(e.to_string(), Color::Danger, None),
            (_, None) => user.send("You are in the lobby. Type /games, /join or /new."),
        }
        self.sweep();
        self.publish();
    }

    pub fn tick(&mut self, scheduler: &mut dyn Scheduler) {
        for session in self.sessions.iter_mut() {
            session.tick(scheduler);
        }
        self.sweep();
        self.publish();
    }

    pub fn fire_alarm(&mut self, alarm: &Alarm, scheduler: &mut dyn Scheduler) {
        match self.session_mut(alarm.session) {
            Some(session) => session.fire_alarm(alarm, scheduler),
            None => log::debug!("alarm for removed session {}", alarm.session),
        }
        self.sweep();
        self.publish();
    }

    /// Creates an empty session and returns its id.
    pub fn create_session(&mut self, game_type: GameType) -> SessionId {
        self.created += 1;
        let id = Uuid::new_v4();
        let name = format!("Game #{}", self.created);
        let config = self.config.clone();
        let session: Box<dyn Session> = match game_type {
            GameType::Classic => Box::new(GameSession::new(id, name, ClassicGame::new(), config)),
            GameType::OneDay => Box::new(GameSession::new(id, name, OneDayGame::new(), config)),
        };
        log::info!("created {} session {}", game_type, id);
        self.sessions.push(session);
        self.publish();
        id
    }

    fn join(&mut self, user: &User, listing: Option<usize>) {
        let id = match listing {
            Some(n) => match n.checked_sub(1).and_then(|i| self.sessions.get(i)) {
                Some(session) => session.id(),
                None => {
                    user.send(format!("There is no game #{}. Type /games to see the list.", n));
                    return;
                }
            },
            None => {
                let open = self.sessions.iter().find(|s| {
                    s.summary().game_type == self.default_type && s.players_wanted() > 0
                });
                match open {
                    Some(session) => session.id(),
                    None => self.create_session(self.default_type),
                }
            }
        };
        self.seat(user, id);
    }

    fn create_and_join(&mut self, user: &User, kind: Option<&str>) {
        let game_type = match kind.map(str::parse::<GameType>) {
            None => self.default_type,
            Some(Ok(game_type)) => game_type,
            Some(Err(e)) => {
                user.send_colored(e, Color::Danger, None);
                return;
            }
        };
        let id = self.create_session(game_type);
        self.seat(user, id);
    }

    fn seat(&mut self, user: &User, id: SessionId) {
        let Some(session) = self.session_mut(id) else {
            return;
        };
        if session.has_ghost(user.username()) && session.reconnect(user) {
            self.locations.insert(user.id(), id);
            return;
        }
        match session.add_user(user.clone()) {
            Ok(()) => {
                self.locations.insert(user.id(), id);
            }
            Err(e) => user.send_colored(e.to_string(), Color::Danger, None),
        }
    }

    fn leave(&mut self, user: &User, id: SessionId, scheduler: &mut dyn Scheduler) {
        if let Some(session) = self.session_mut(id) {
            session.kick(user.username(), scheduler);
        }
        self.locations.remove(&user.id());
        user.header_send("Lobby", None);
        user.send("You left the game and are back in the lobby.");
    }

    fn lobby_chat(&self, user: &User, text: &str) {
        if text.is_empty() {
            return;
        }
        let message = crate::models::chat::ChatMessage::new(
            Some(user.username().to_string()),
            text,
            crate::models::chat::ChatMessageType::Public,
        );
        for u in self.lobby() {
            u.send_chat(message.clone());
        }
    }

    fn send_listing(&self, user: &User) {
        if self.sessions.is_empty() {
            user.send("There are no games yet. Type /new to start one.");
            return;
        }
        for (i, session) in self.sessions.iter().enumerate() {
            user.send(format!("{}. {}", i + 1, session.summary()));
        }
    }

    /// Removes closed sessions and returns their users to the lobby.
    fn sweep(&mut self) {
        let mut closed = Vec::new();
        self.sessions.retain_mut(|s| {
            if s.lifecycle() == Lifecycle::Closed {
                closed.extend(s.release_users());
                log::info!("removed session {}", s.id());
                false
            } else {
                true
            }
        });
        for user in closed {
            self.locations.remove(&user.id());
            user.header_send("Lobby", None);
        }
    }

    fn publish(&self) {
        self.summaries.send_replace(self.list());
    }
}

/// Drives a registry until every event sender is gone.
pub async fn run_event_loop(
    mut registry: SessionRegistry,
    mut events: mpsc::UnboundedReceiver<LobbyEvent>,
    sender: mpsc::UnboundedSender<LobbyEvent>,
) {
    let mut scheduler = TokioScheduler::new(sender);
    let mut ticker = tokio::time::interval(registry.config.tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    log::info!("session registry running");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => registry.handle(event, &mut scheduler),
                None => break,
            },
            _ = ticker.tick() => registry.tick(&mut scheduler),
        }
    }
    log::info!("session registry stopped");
}

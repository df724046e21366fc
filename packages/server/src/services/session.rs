//! Generic session host.
//!
//! `GameSession<V>` owns the roster, the lobby countdown, the shared admin
//! commands and the single phase timer. Everything game specific lives in a
//! [`GameVariant`], which is handed a [`SessionContext`] for every callback.

use std::time::Duration;

use crate::models::chat::ChatMessage;
use crate::models::color::{Color, ColorPool};
use crate::models::command::{AdminCommand, Command, Input, ADMIN_HELP};
use crate::models::config::GameConfig;
use crate::models::game::{
    Flow, GameError, GameType, Lifecycle, SessionError, SessionId, SessionSummary,
};
use crate::models::player::{find_player, Player};
use crate::models::room::RoomRegistry;
use crate::models::stopwatch::Stopwatch;
use crate::models::user::{GameEvent, PanelEntry, Sound, User};

use super::timer::{Alarm, PhaseAlarm, PhaseTimer, Scheduler};

#[derive(Debug, Clone)]
pub struct Seat {
    pub user: User,
    pub color: Color,
    pub start_vote: bool,
    pub disconnected: bool,
}

/// State shared by every variant. Variants read and change it through
/// [`SessionContext`]; only the host moves `lifecycle`.
#[derive(Debug)]
pub struct SessionCore {
    pub id: SessionId,
    pub name: String,
    pub game_type: GameType,
    pub min_players: usize,
    pub max_players: usize,
    pub config: GameConfig,
    pub seats: Vec<Seat>,
    pub players: Vec<Player>,
    pub rooms: RoomRegistry,
    pub timer: PhaseTimer,
    lifecycle: Lifecycle,
    countdown: Stopwatch,
    held: bool,
    colors: ColorPool,
}

impl SessionCore {
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn seat_index(&self, username: &str) -> Option<usize> {
        self.seats
            .iter()
            .position(|s| s.user.username().eq_ignore_ascii_case(username))
    }

    pub fn player_index(&self, username: &str) -> Option<usize> {
        find_player(&self.players, username)
    }

    pub fn player(&self, username: &str) -> Option<&Player> {
        self.player_index(username).map(|i| &self.players[i])
    }

    fn connected(&self) -> impl Iterator<Item = &User> {
        self.seats
            .iter()
            .filter(|s| !s.disconnected)
            .map(|s| &s.user)
    }

    pub fn broadcast(&self, text: &str) {
        self.connected().for_each(|u| u.send(text));
    }

    pub fn broadcast_colored(&self, text: &str, color: Color) {
        self.connected().for_each(|u| u.send_colored(text, color, None));
    }

    pub fn announce(&self, message: &ChatMessage) {
        self.connected().for_each(|u| u.send_chat(message.clone()));
    }

    pub fn sound_all(&self, kind: Sound) {
        self.connected().for_each(|u| u.sound(kind));
    }

    pub fn emit_all(&self, event: GameEvent) {
        self.connected().for_each(|u| u.emit(event.clone()));
    }

    pub fn header_all(&self, content: &str, color: Option<Color>) {
        self.connected().for_each(|u| u.header_send(content, color));
    }

    pub fn set_time_all(&self, remaining: Duration) {
        let warn = self.config.warn_threshold;
        self.connected().for_each(|u| u.set_time(remaining, warn));
    }

    pub fn roster_entries(&self) -> Vec<PanelEntry> {
        self.seats
            .iter()
            .map(|seat| {
                let dead = self
                    .player(seat.user.username())
                    .map(|p| !p.is_alive())
                    .unwrap_or(false);
                let label = if seat.disconnected {
                    format!("{} (disconnected)", seat.user.username())
                } else {
                    seat.user.username().to_string()
                };
                PanelEntry::new(label, Some(seat.color)).struck(dead)
            })
            .collect()
    }

    pub fn refresh_roster(&self) {
        let entries = self.roster_entries();
        self.connected().for_each(|u| u.left_send(entries.clone()));
    }

    fn countdown_remaining(&self) -> Duration {
        self.countdown.remaining(self.config.start_wait)
    }

    fn start_votes(&self) -> usize {
        self.seats
            .iter()
            .filter(|s| s.start_vote && !s.disconnected)
            .count()
    }
}

/// What a variant callback gets to work with.
pub struct SessionContext<'a> {
    pub core: &'a mut SessionCore,
    pub scheduler: &'a mut dyn Scheduler,
}

impl SessionContext<'_> {
    /// Replaces the pending phase timer and tells every client the new time.
    pub fn arm(&mut self, phase: PhaseAlarm, after: Duration) {
        self.core.timer.arm(phase, after, &mut *self.scheduler);
        self.core.set_time_all(after);
    }
}

pub trait GameVariant: Send {
    fn game_type(&self) -> GameType;
    fn min_players(&self) -> usize;
    fn max_players(&self) -> usize;
    fn rules(&self, players: usize) -> String;

    /// Deals roles into `core.players` and schedules the first phase.
    fn start(&mut self, ctx: &mut SessionContext<'_>) -> Flow;
    fn end(&mut self, ctx: &mut SessionContext<'_>);
    /// Called on every lifecycle tick while in play.
    fn update(&mut self, ctx: &mut SessionContext<'_>) -> Flow;
    fn chat(&mut self, ctx: &mut SessionContext<'_>, user: &User, text: &str) -> Result<(), GameError>;
    fn command(
        &mut self,
        ctx: &mut SessionContext<'_>,
        user: &User,
        command: Command,
    ) -> Result<Flow, GameError>;
    fn on_alarm(&mut self, ctx: &mut SessionContext<'_>, phase: PhaseAlarm) -> Flow;
    fn custom_admin_receive(
        &mut self,
        ctx: &mut SessionContext<'_>,
        user: &User,
        name: &str,
        args: &[String],
    ) -> Flow;
    /// Sends a returning player their role and the game state they missed.
    fn resend_data(&self, core: &SessionCore, user: &User);
}

/// Object-safe face of a session, as the registry sees it.
pub trait Session: Send {
    fn id(&self) -> SessionId;
    fn summary(&self) -> SessionSummary;
    fn add_user(&mut self, user: User) -> Result<(), SessionError>;
    fn kick(&mut self, username: &str, scheduler: &mut dyn Scheduler);
    fn disconnect(&mut self, username: &str, scheduler: &mut dyn Scheduler);
    fn reconnect(&mut self, user: &User) -> bool;
    fn has_seat(&self, username: &str) -> bool;
    fn has_ghost(&self, username: &str) -> bool;
    fn receive(&mut self, user: &User, text: &str, scheduler: &mut dyn Scheduler);
    fn receive_input(&mut self, user: &User, input: Input, scheduler: &mut dyn Scheduler);
    fn admin_receive(&mut self, user: &User, command: AdminCommand, scheduler: &mut dyn Scheduler);
    fn tick(&mut self, scheduler: &mut dyn Scheduler);
    fn fire_alarm(&mut self, alarm: &Alarm, scheduler: &mut dyn Scheduler);
    fn broadcast(&self, text: &str);
    fn resend_data(&self, user: &User);
    fn username_color_pairs(&self) -> Vec<(String, Color)>;
    fn lifecycle(&self) -> Lifecycle;
    fn in_play(&self) -> bool;
    fn players_wanted(&self) -> usize;
    fn minimum_players_needed(&self) -> usize;
    /// Empties a closed session, returning the users still connected to it.
    fn release_users(&mut self) -> Vec<User>;
}

pub struct GameSession<V: GameVariant> {
    core: SessionCore,
    variant: V,
}

impl<V: GameVariant> GameSession<V> {
    pub fn new(id: SessionId, name: impl Into<String>, variant: V, config: GameConfig) -> Self {
        let core = SessionCore {
            id,
            name: name.into(),
            game_type: variant.game_type(),
            min_players: variant.min_players(),
            max_players: variant.max_players(),
            config,
            seats: Vec::new(),
            players: Vec::new(),
            rooms: RoomRegistry::new(),
            timer: PhaseTimer::new(id),
            lifecycle: Lifecycle::Waiting,
            countdown: Stopwatch::new(),
            held: false,
            colors: ColorPool::new(),
        };
        Self { core, variant }
    }

    pub fn core(&self) -> &SessionCore {
        &self.core
    }

    pub fn variant(&self) -> &V {
        &self.variant
    }

    fn start_game(&mut self, scheduler: &mut dyn Scheduler) {
        self.core.lifecycle = Lifecycle::InPlay;
        self.core.countdown.reset();
        self.core.seats.iter_mut().for_each(|s| s.start_vote = false);
        self.core.sound_all(Sound::Start);
        self.core.broadcast_colored("The game has started!", Color::Highlight);
        log::info!(
            "session {} ({}) started with {} players",
            self.core.name,
            self.core.game_type,
            self.core.seats.len()
        );

        let flow = {
            let mut ctx = SessionContext {
                core: &mut self.core,
                scheduler: &mut *scheduler,
            };
            self.variant.start(&mut ctx)
        };
        self.core.refresh_roster();
        if flow == Flow::GameOver {
            self.end_game(scheduler);
        }
    }

    fn end_game(&mut self, scheduler: &mut dyn Scheduler) {
        if self.core.lifecycle != Lifecycle::InPlay {
            return;
        }
        let end_chat = self.core.config.end_chat;
        let mut ctx = SessionContext {
            core: &mut self.core,
            scheduler,
        };
        self.variant.end(&mut ctx);
        ctx.core.lifecycle = Lifecycle::EndChat;
        ctx.arm(PhaseAlarm::CloseSession, end_chat);
        ctx.core.refresh_roster();
        ctx.core.broadcast_colored(
            &format!("The game is over. Chat closes in {} seconds.", end_chat.as_secs()),
            Color::Highlight,
        );
        log::info!("session {} ended", ctx.core.name);
    }

    fn close(&mut self) {
        self.core.lifecycle = Lifecycle::Closed;
        self.core.timer.cancel();
        self.core.countdown.reset();
        self.core.players.clear();
        self.core.rooms.clear();
        self.core
            .broadcast("This game has closed. You are back in the lobby.");
        log::info!("session {} closed", self.core.name);
    }

    fn after(&mut self, flow: Flow, scheduler: &mut dyn Scheduler) {
        if flow == Flow::GameOver {
            self.end_game(scheduler);
        }
    }

    fn chat(&mut self, user: &User, text: &str, scheduler: &mut dyn Scheduler) {
        if text.is_empty() {
            return;
        }
        match self.core.lifecycle {
            Lifecycle::InPlay => {
                let mut ctx = SessionContext {
                    core: &mut self.core,
                    scheduler,
                };
                if let Err(e) = self.variant.chat(&mut ctx, user, text) {
                    user.send_colored(e.to_string(), Color::Danger, None);
                }
            }
            Lifecycle::Closed => {}
            _ => {
                let Some(index) = self.core.seat_index(user.username()) else {
                    log::debug!("chat from {} who has no seat", user.username());
                    return;
                };
                let message = ChatMessage::from_player(user.username(), text, self.core.seats[index].color);
                self.core.announce(&message);
            }
        }
    }

    fn command(&mut self, user: &User, command: Command, scheduler: &mut dyn Scheduler) {
        let result = match (self.core.lifecycle, command) {
            (Lifecycle::Waiting | Lifecycle::Starting, Command::StartVote) => self.start_vote(user),
            (Lifecycle::InPlay, command) => {
                let mut ctx = SessionContext {
                    core: &mut self.core,
                    scheduler: &mut *scheduler,
                };
                self.variant
                    .command(&mut ctx, user, command)
                    .map(|flow| self.after(flow, scheduler))
            }
            (_, Command::Players) => {
                user.left_send(self.core.roster_entries());
                let names: Vec<&str> = self.core.seats.iter().map(|s| s.user.username()).collect();
                user.send(format!("Players: {}", names.join(", ")));
                Ok(())
            }
            (_, Command::Rules) => {
                user.send(self.variant.rules(self.core.seats.len()));
                Ok(())
            }
            _ => Err(GameError::WrongPhase),
        };
        if let Err(e) = result {
            log::debug!("rejected command from {}: {}", user.username(), e);
            user.send_colored(e.to_string(), Color::Danger, None);
        }
    }

    fn start_vote(&mut self, user: &User) -> Result<(), GameError> {
        let index = self
            .core
            .seat_index(user.username())
            .ok_or_else(|| GameError::UnknownPlayer(user.username().to_string()))?;
        if self.core.seats[index].start_vote {
            user.send("You already voted to start.");
            return Ok(());
        }
        self.core.seats[index].start_vote = true;
        let total = self.core.seats.len();
        self.core.broadcast(&format!(
            "{} wants to start now ({}/{} needed).",
            user.username(),
            self.core.start_votes(),
            total.div_ceil(2)
        ));
        Ok(())
    }

    fn lifecycle_tick(&mut self, scheduler: &mut dyn Scheduler) {
        let seats = self.core.seats.len();
        match self.core.lifecycle {
            Lifecycle::Waiting if seats >= self.core.min_players => {
                self.core.lifecycle = Lifecycle::Starting;
                self.core.countdown.restart();
                if self.core.held {
                    self.core.countdown.stop();
                }
                let remaining = self.core.countdown_remaining();
                self.core.broadcast_colored(
                    &format!(
                        "Enough players have joined. The game starts in {} seconds. Type /start to start sooner.",
                        remaining.as_secs()
                    ),
                    Color::Highlight,
                );
                self.core.set_time_all(remaining);
                log::info!("session {} counting down", self.core.name);
            }
            Lifecycle::Starting if seats < self.core.min_players => {
                self.core.lifecycle = Lifecycle::Waiting;
                self.core.countdown.reset();
                self.core
                    .broadcast("Not enough players. The countdown has been reset.");
                self.core.set_time_all(Duration::ZERO);
                log::info!("session {} waiting again", self.core.name);
            }
            Lifecycle::Starting => {
                let full = seats >= self.core.max_players;
                let timed_out = self.core.countdown_remaining().is_zero();
                let voted = self.core.start_votes() * 2 >= seats;
                if full || (!self.core.held && (timed_out || voted)) {
                    self.start_game(scheduler);
                }
            }
            Lifecycle::InPlay => {
                let flow = {
                    let mut ctx = SessionContext {
                        core: &mut self.core,
                        scheduler: &mut *scheduler,
                    };
                    self.variant.update(&mut ctx)
                };
                self.after(flow, scheduler);
            }
            _ => {}
        }
    }

    fn dispatch_alarm(&mut self, phase: PhaseAlarm, scheduler: &mut dyn Scheduler) {
        match (phase, self.core.lifecycle) {
            (PhaseAlarm::CloseSession, _) => self.close(),
            (phase, Lifecycle::InPlay) => {
                let flow = {
                    let mut ctx = SessionContext {
                        core: &mut self.core,
                        scheduler: &mut *scheduler,
                    };
                    self.variant.on_alarm(&mut ctx, phase)
                };
                self.after(flow, scheduler);
            }
            (phase, lifecycle) => {
                log::debug!("ignoring {:?} while {:?}", phase, lifecycle);
            }
        }
    }

    fn pregame_admin(&mut self, user: &User, command: AdminCommand, scheduler: &mut dyn Scheduler) {
        let starting = self.core.lifecycle == Lifecycle::Starting;
        match command {
            AdminCommand::Stop => {
                self.core.countdown.reset();
                self.core.held = true;
                self.core.broadcast("The countdown was stopped by an admin.");
                self.core.set_time_all(Duration::ZERO);
            }
            AdminCommand::Start => {
                if self.core.seats.len() >= self.core.min_players {
                    self.start_game(scheduler);
                } else {
                    user.send(format!(
                        "At least {} players are needed to start.",
                        self.core.min_players
                    ));
                }
            }
            AdminCommand::Resume | AdminCommand::Release => {
                self.core.held = false;
                if starting {
                    self.core.countdown.start();
                    self.core.set_time_all(self.core.countdown_remaining());
                }
                self.core.broadcast("The countdown is running again.");
            }
            AdminCommand::Restart => {
                self.core.held = false;
                if starting {
                    self.core.countdown.restart();
                    self.core.set_time_all(self.core.countdown_remaining());
                }
                self.core.broadcast("The countdown was restarted.");
            }
            AdminCommand::Hold => {
                self.core.held = true;
                self.core.countdown.stop();
                self.core.broadcast("The countdown is on hold.");
            }
            AdminCommand::Time => {
                if starting {
                    user.send(format!(
                        "{} seconds until the game starts.",
                        self.core.countdown_remaining().as_secs()
                    ));
                } else {
                    user.send(format!(
                        "Waiting for {} more players.",
                        self.minimum_players_needed()
                    ));
                }
            }
            other => log::debug!("unhandled pre-game admin command {:?}", other),
        }
    }
}

impl<V: GameVariant> Session for GameSession<V> {
    fn id(&self) -> SessionId {
        self.core.id
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.core.id,
            name: self.core.name.clone(),
            game_type: self.core.game_type,
            lifecycle: self.core.lifecycle,
            players: self
                .core
                .seats
                .iter()
                .map(|s| s.user.username().to_string())
                .collect(),
            min_players: self.core.min_players,
            max_players: self.core.max_players,
        }
    }

    fn add_user(&mut self, user: User) -> Result<(), SessionError> {
        match self.core.lifecycle {
            Lifecycle::InPlay | Lifecycle::EndChat => return Err(SessionError::AlreadyInPlay),
            Lifecycle::Closed => return Err(SessionError::Closing),
            Lifecycle::Waiting | Lifecycle::Starting => {}
        }
        if self.core.seat_index(user.username()).is_some() {
            return Err(SessionError::DuplicateUsername(user.username().to_string()));
        }
        if self.core.seats.len() >= self.core.max_players {
            return Err(SessionError::SessionFull);
        }
        let color = self.core.colors.take().ok_or(SessionError::SessionFull)?;

        for u in self.core.connected() {
            u.send_colored(format!("{} has joined.", user.username()), color, None);
            u.sound(Sound::Join);
        }
        self.core.seats.push(Seat {
            user: user.clone(),
            color,
            start_vote: false,
            disconnected: false,
        });

        let count = self.core.seats.len();
        user.header_send(&self.core.name, Some(color));
        user.send(format!(
            "You joined {}. {} of {} players, {} needed to start.",
            self.core.name, count, self.core.max_players, self.core.min_players
        ));
        if self.core.lifecycle == Lifecycle::Starting {
            user.set_time(self.core.countdown_remaining(), self.core.config.warn_threshold);
        }
        self.core.refresh_roster();
        log::info!("{} joined session {}", user.username(), self.core.name);
        Ok(())
    }

    fn kick(&mut self, username: &str, scheduler: &mut dyn Scheduler) {
        let Some(index) = self.core.seat_index(username) else {
            log::debug!("no seat for {} in {}", username, self.core.name);
            return;
        };

        if self.core.lifecycle == Lifecycle::InPlay {
            if self.core.seats[index].disconnected {
                return;
            }
            // keep the seat for a reconnect, but stop delivering to this connection
            let ghost = self.core.seats[index].user.detached();
            self.core.seats[index].user = ghost.clone();
            self.core.seats[index].disconnected = true;
            self.core.rooms.rebind(&ghost);
            self.core.players.iter_mut().for_each(|p| p.rebind(&ghost));
            self.core
                .broadcast(&format!("{} has disconnected.", ghost.username()));
            self.core.sound_all(Sound::Leave);
            self.core.refresh_roster();
            log::info!("{} soft-disconnected from {}", ghost.username(), self.core.name);

            if self.core.seats.iter().all(|s| s.disconnected) {
                log::info!("everyone left session {}", self.core.name);
                self.end_game(scheduler);
            }
            return;
        }

        let seat = self.core.seats.remove(index);
        self.core.colors.give_back(seat.color);
        self.core.rooms.remove_everywhere(seat.user.username());
        self.core
            .broadcast_colored(&format!("{} has left.", seat.user.username()), seat.color);
        self.core.sound_all(Sound::Leave);
        self.core.refresh_roster();
        log::info!("{} left session {}", seat.user.username(), self.core.name);
    }

    fn disconnect(&mut self, username: &str, scheduler: &mut dyn Scheduler) {
        log::debug!("connection of {} dropped", username);
        self.kick(username, scheduler);
    }

    fn reconnect(&mut self, user: &User) -> bool {
        let Some(index) = self.core.seat_index(user.username()) else {
            return false;
        };
        if !self.core.seats[index].disconnected {
            return false;
        }
        // the seat keeps the name it was taken under
        let user = user.renamed(self.core.seats[index].user.username());
        self.core.seats[index].user = user.clone();
        self.core.seats[index].disconnected = false;
        self.core.rooms.rebind(&user);
        self.core.players.iter_mut().for_each(|p| p.rebind(&user));
        self.core
            .broadcast(&format!("{} has reconnected.", user.username()));
        self.core.refresh_roster();
        self.resend_data(&user);
        log::info!("{} reconnected to {}", user.username(), self.core.name);
        true
    }

    fn has_seat(&self, username: &str) -> bool {
        self.core.seat_index(username).is_some()
    }

    fn has_ghost(&self, username: &str) -> bool {
        self.core
            .seat_index(username)
            .map(|i| self.core.seats[i].disconnected)
            .unwrap_or(false)
    }

    fn receive(&mut self, user: &User, text: &str, scheduler: &mut dyn Scheduler) {
        let input = Input::parse(text, user.is_admin());
        self.receive_input(user, input, scheduler);
    }

    fn receive_input(&mut self, user: &User, input: Input, scheduler: &mut dyn Scheduler) {
        match input {
            Input::Chat(text) => self.chat(user, &text, scheduler),
            Input::Command(command) => self.command(user, command, scheduler),
            Input::Admin(command) => self.admin_receive(user, command, scheduler),
            Input::Invalid(e) => user.send_colored(e.to_string(), Color::Danger, None),
        }
    }

    fn admin_receive(&mut self, user: &User, command: AdminCommand, scheduler: &mut dyn Scheduler) {
        if !user.is_admin() {
            log::warn!("{} tried an admin command", user.username());
            return;
        }
        log::info!("admin {} in {}: {:?}", user.username(), self.core.name, command);
        let pregame = matches!(self.core.lifecycle, Lifecycle::Waiting | Lifecycle::Starting);
        match command {
            AdminCommand::Yell(text) => {
                for u in self.core.connected() {
                    u.send_colored(text.as_str(), Color::Highlight, Some(Color::Danger));
                    u.sound(Sound::Alert);
                }
            }
            AdminCommand::Help => user.send(ADMIN_HELP),
            AdminCommand::Custom { name, args } => {
                let flow = {
                    let mut ctx = SessionContext {
                        core: &mut self.core,
                        scheduler: &mut *scheduler,
                    };
                    self.variant.custom_admin_receive(&mut ctx, user, &name, &args)
                };
                self.after(flow, scheduler);
            }
            command if pregame => self.pregame_admin(user, command, scheduler),
            _ => user.send_colored(
                "That command only works before the game starts.",
                Color::Danger,
                None,
            ),
        }
    }

    fn tick(&mut self, scheduler: &mut dyn Scheduler) {
        self.lifecycle_tick(scheduler);
    }

    fn fire_alarm(&mut self, alarm: &Alarm, scheduler: &mut dyn Scheduler) {
        match self.core.timer.fire(alarm) {
            Some(phase) => self.dispatch_alarm(phase, scheduler),
            None => log::debug!(
                "stale alarm {:?} (generation {}) for {}",
                alarm.phase,
                alarm.generation,
                self.core.name
            ),
        }
    }

    fn broadcast(&self, text: &str) {
        self.core.broadcast(text);
    }

    fn resend_data(&self, user: &User) {
        user.header_send(&self.core.name, None);
        user.left_send(self.core.roster_entries());
        let warn = self.core.config.warn_threshold;
        match self.core.lifecycle {
            Lifecycle::Starting => user.set_time(self.core.countdown_remaining(), warn),
            Lifecycle::InPlay | Lifecycle::EndChat => user.set_time(self.core.timer.remaining(), warn),
            _ => {}
        }
        if self.core.lifecycle == Lifecycle::InPlay {
            self.variant.resend_data(&self.core, user);
        }
    }

    fn username_color_pairs(&self) -> Vec<(String, Color)> {
        self.core
            .seats
            .iter()
            .map(|s| (s.user.username().to_string(), s.color))
            .collect()
    }

    fn lifecycle(&self) -> Lifecycle {
        self.core.lifecycle
    }

    fn in_play(&self) -> bool {
        self.core.lifecycle == Lifecycle::InPlay
    }

    fn players_wanted(&self) -> usize {
        match self.core.lifecycle {
            Lifecycle::Waiting | Lifecycle::Starting => {
                self.core.max_players.saturating_sub(self.core.seats.len())
            }
            _ => 0,
        }
    }

    fn minimum_players_needed(&self) -> usize {
        self.core.min_players.saturating_sub(self.core.seats.len())
    }

    fn release_users(&mut self) -> Vec<User> {
        self.core.colors = ColorPool::new();
        self.core
            .seats
            .drain(..)
            .filter(|s| !s.disconnected)
            .map(|s| s.user)
            .collect()
    }
}

//! One night, one day. Cards move around during the night; whoever holds
//! what at dawn decides who wins.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::ability::{Condition, Targeting};
use crate::models::chat::{ChatMessage, ChatMessageType};
use crate::models::color::Color;
use crate::models::command::Command;
use crate::models::game::{Flow, GameError, GameType};
use crate::models::player::Player;
use crate::models::role::{Passive, RoleId, RoleRef};
use crate::models::user::{GameEvent, Sound, User};
use crate::services::catalog::{self, ONE_DAY_PRIORITY, ONE_DAY_SETUP};
use crate::services::night::NightResolver;
use crate::services::session::{GameVariant, SessionContext, SessionCore};
use crate::services::timer::PhaseAlarm;
use crate::services::trial::VoteTally;
use crate::services::win;

use super::{actor_index, lineup_entries, players_listing, roles_listing, send_role, skip_phase};

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 10;
pub const CENTER_CARDS: usize = 3;

pub const VILLAGE_ROOM: &str = "village";
pub const WEREWOLF_ROOM: &str = "werewolves";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneDayPhase {
    Pregame,
    Night,
    Day,
    Over,
}

pub struct OneDayGame {
    phase: OneDayPhase,
    center: Vec<RoleRef>,
    rng: StdRng,
}

impl Default for OneDayGame {
    fn default() -> Self {
        Self::new()
    }
}

impl OneDayGame {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            phase: OneDayPhase::Pregame,
            center: Vec::new(),
            rng,
        }
    }

    pub fn phase(&self) -> OneDayPhase {
        self.phase
    }

    pub fn center(&self) -> &[RoleRef] {
        &self.center
    }

    fn begin_night(&mut self, ctx: &mut SessionContext<'_>) {
        self.phase = OneDayPhase::Night;
        if let Some(village) = ctx.core.rooms.get_mut(VILLAGE_ROOM) {
            village.mute_all();
        }
        if let Some(wolves) = ctx.core.rooms.get_mut(WEREWOLF_ROOM) {
            wolves.unmute_all();
            wolves.undeafen_all();
        }
        ctx.core.header_all("Night", Some(Color::Navy));
        ctx.core.sound_all(Sound::Night);
        ctx.core.broadcast_colored(
            "Night falls. If your card acts at night, choose with /target.",
            Color::Info,
        );
        let night = ctx.core.config.night;
        ctx.arm(PhaseAlarm::ResolveNight, night);
    }

    fn resolve_night(&mut self, ctx: &mut SessionContext<'_>) {
        let resolver = NightResolver::new(ONE_DAY_PRIORITY, &[]);
        resolver.resolve(&mut ctx.core.players, &mut self.center, &mut self.rng);
        self.begin_day(ctx);
    }

    fn begin_day(&mut self, ctx: &mut SessionContext<'_>) {
        self.phase = OneDayPhase::Day;
        if let Some(village) = ctx.core.rooms.get_mut(VILLAGE_ROOM) {
            village.unmute_all();
        }
        if let Some(wolves) = ctx.core.rooms.get_mut(WEREWOLF_ROOM) {
            wolves.mute_all();
            wolves.deafen_all();
        }
        let length = ctx.core.config.one_day_discussion;
        ctx.core.header_all("Day", Some(Color::Yellow));
        ctx.core.sound_all(Sound::Day);
        ctx.core.emit_all(GameEvent::CanVote);
        ctx.core.broadcast_colored(
            &format!(
                "Day breaks. You have {} seconds to find a werewolf. Vote with /vote <name>; you may change your vote until time runs out.",
                length.as_secs()
            ),
            Color::Info,
        );
        ctx.arm(PhaseAlarm::EndDay, length);
    }

    /// Hangs everyone tied for the most votes, provided that is at least two.
    fn end_day(&mut self, ctx: &mut SessionContext<'_>) -> Flow {
        let tally = VoteTally::from_players(&ctx.core.players);
        let hanged: Vec<String> = if tally.max() >= 2 {
            tally.leaders().into_iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };

        if hanged.is_empty() {
            ctx.core.broadcast("Nobody received enough votes. Nobody was hanged.");
        } else {
            ctx.core.sound_all(Sound::Death);
        }
        for name in &hanged {
            if let Some(i) = ctx.core.player_index(name) {
                ctx.core.players[i].hang();
            }
            ctx.core.emit_all(GameEvent::Hang {
                username: name.clone(),
            });
            ctx.core.emit_all(GameEvent::LineThroughPlayer {
                username: name.clone(),
            });
            ctx.core.emit_all(GameEvent::MarkAsDead {
                username: name.clone(),
            });
            ctx.core.broadcast_colored(
                &format!("{} was hanged with {} votes.", name, tally.count(name)),
                Color::Danger,
            );
        }
        log::info!("{}: day over, hanged {:?}", ctx.core.name, hanged);
        Flow::GameOver
    }

    fn target(
        &mut self,
        ctx: &mut SessionContext<'_>,
        user: &User,
        first: &str,
        second: Option<&str>,
    ) -> Result<Flow, GameError> {
        if self.phase != OneDayPhase::Night {
            return Err(GameError::WrongPhase);
        }
        let actor = actor_index(ctx.core, user)?;
        let ability = ctx.core.players[actor]
            .abilities()
            .first()
            .cloned()
            .ok_or(GameError::NoNightAction)?;
        let no_self = ability.conditions.contains(&Condition::TargetNotSelf);
        let find = |name: &str| {
            ctx.core
                .player_index(name)
                .ok_or_else(|| GameError::UnknownPlayer(name.to_string()))
        };

        let (first, second) = match ability.targeting {
            Targeting::None => return Err(GameError::NoNightAction),
            Targeting::Single => (find(first)?, None),
            Targeting::Pair => {
                let second = second.ok_or(GameError::NeedsTwoTargets)?;
                let (a, b) = (find(first)?, find(second)?);
                if a == b {
                    return Err(GameError::NeedsTwoTargets);
                }
                (a, Some(b))
            }
        };
        if no_self && (first == actor || second == Some(actor)) {
            return Err(GameError::SelfTarget);
        }

        let first_name = ctx.core.players[first].username().to_string();
        let second_name = second.map(|i| ctx.core.players[i].username().to_string());
        user.emit(GameEvent::SelectUser {
            username: first_name.clone(),
        });
        let player = &mut ctx.core.players[actor];
        player.target = Some(first_name.clone());
        player.second_target = second_name.clone();
        match second_name {
            Some(second_name) => user.send_colored(
                format!("You are targeting {} and {}.", first_name, second_name),
                Color::Info,
                None,
            ),
            None => user.send_colored(format!("You are targeting {}.", first_name), Color::Info, None),
        }
        Ok(Flow::Continue)
    }

    fn vote(&mut self, ctx: &mut SessionContext<'_>, user: &User, name: &str) -> Result<Flow, GameError> {
        if self.phase != OneDayPhase::Day {
            return Err(GameError::WrongPhase);
        }
        let actor = actor_index(ctx.core, user)?;
        let target = ctx
            .core
            .player_index(name)
            .ok_or_else(|| GameError::UnknownPlayer(name.to_string()))?;
        if target == actor {
            return Err(GameError::SelfTarget);
        }
        let target_name = ctx.core.players[target].username().to_string();
        ctx.core.players[actor].vote = Some(target_name.clone());
        ctx.core
            .broadcast(&format!("{} now votes for {}.", user.username(), target_name));
        ctx.core.sound_all(Sound::Vote);
        Ok(Flow::Continue)
    }

    fn unvote(&mut self, ctx: &mut SessionContext<'_>, user: &User) -> Result<Flow, GameError> {
        if self.phase != OneDayPhase::Day {
            return Err(GameError::WrongPhase);
        }
        let actor = actor_index(ctx.core, user)?;
        if ctx.core.players[actor].vote.take().is_some() {
            user.emit(GameEvent::CancelVoteEffect);
            ctx.core
                .broadcast(&format!("{} took back their vote.", user.username()));
        }
        Ok(Flow::Continue)
    }
}

impl GameVariant for OneDayGame {
    fn game_type(&self) -> GameType {
        GameType::OneDay
    }

    fn min_players(&self) -> usize {
        MIN_PLAYERS
    }

    fn max_players(&self) -> usize {
        MAX_PLAYERS
    }

    fn rules(&self, players: usize) -> String {
        let cards = players.clamp(MIN_PLAYERS, MAX_PLAYERS) + CENTER_CARDS;
        let roles = catalog::deal(ONE_DAY_SETUP, cards).unwrap_or_default();
        format!(
            "One night, one day. Three cards stay in the center. At dusk everyone with the most votes (at least two) is hanged. The village wins if a werewolf hangs.\n{}",
            catalog::rules_text(&roles)
        )
    }

    fn start(&mut self, ctx: &mut SessionContext<'_>) -> Flow {
        let count = ctx.core.seats.len();
        let Some(mut cards) = catalog::deal(ONE_DAY_SETUP, count + CENTER_CARDS) else {
            log::error!("{}: no one-day setup for {} players", ctx.core.name, count);
            ctx.core.broadcast("This game cannot be played with this many players.");
            return Flow::GameOver;
        };
        cards.shuffle(&mut self.rng);
        self.center = cards.split_off(count);
        ctx.core.players = ctx
            .core
            .seats
            .iter()
            .zip(cards)
            .map(|(seat, role)| Player::new(seat.user.clone(), seat.color, role))
            .collect();

        let village = ctx.core.rooms.open(VILLAGE_ROOM);
        for p in &ctx.core.players {
            village.add_member(p.user.clone());
        }
        let wolves = ctx.core.rooms.open(WEREWOLF_ROOM);
        for p in ctx.core.players.iter().filter(|p| p.role().has_passive(Passive::Lycan)) {
            wolves.add_member(p.user.clone());
        }

        let pack: Vec<&str> = ctx
            .core
            .players
            .iter()
            .filter(|p| p.role().has_passive(Passive::Lycan))
            .map(Player::username)
            .collect();
        let lineup = lineup_entries(
            ctx.core
                .players
                .iter()
                .map(Player::role)
                .chain(self.center.iter().copied()),
        );
        for p in &ctx.core.players {
            send_role(&p.user, p.role());
            p.user.right_send(lineup.clone());
            let knows_pack = p.role().has_passive(Passive::Lycan) || p.role().id == RoleId::Minion;
            if !knows_pack {
                continue;
            }
            let text = if pack.is_empty() {
                "There are no werewolves among the players.".to_string()
            } else {
                format!("The werewolves are: {}.", pack.join(", "))
            };
            p.user.send_colored(text, Color::Mafia, None);
        }

        self.begin_night(ctx);
        Flow::Continue
    }

    fn end(&mut self, ctx: &mut SessionContext<'_>) {
        self.phase = OneDayPhase::Over;
        let center: Vec<&str> = self.center.iter().map(|r| r.name).collect();
        ctx.core
            .broadcast(&format!("The center cards were: {}.", center.join(", ")));
        win::announce_standings(&ctx.core.players);
    }

    fn update(&mut self, _ctx: &mut SessionContext<'_>) -> Flow {
        Flow::Continue
    }

    fn chat(&mut self, ctx: &mut SessionContext<'_>, user: &User, text: &str) -> Result<(), GameError> {
        let index = actor_index(ctx.core, user)?;
        let (room, kind) = match self.phase {
            OneDayPhase::Night => (WEREWOLF_ROOM, ChatMessageType::Faction),
            _ => (VILLAGE_ROOM, ChatMessageType::Public),
        };
        let room = ctx.core.rooms.get(room).ok_or(GameError::CannotTalk)?;
        if room.is_muted(user.username()) {
            return Err(GameError::CannotTalk);
        }
        let player = &ctx.core.players[index];
        let message = ChatMessage::from_player(player.username(), text, player.color).with_type(kind);
        room.receive(user.username(), &message);
        Ok(())
    }

    fn command(
        &mut self,
        ctx: &mut SessionContext<'_>,
        user: &User,
        command: Command,
    ) -> Result<Flow, GameError> {
        match command {
            Command::Target { first, second } => self.target(ctx, user, &first, second.as_deref()),
            Command::Untarget => {
                if self.phase != OneDayPhase::Night {
                    return Err(GameError::WrongPhase);
                }
                let actor = actor_index(ctx.core, user)?;
                ctx.core.players[actor].target = None;
                ctx.core.players[actor].second_target = None;
                user.send("You are no longer targeting anyone.");
                Ok(Flow::Continue)
            }
            Command::Vote(name) => self.vote(ctx, user, &name),
            Command::Unvote => self.unvote(ctx, user),
            Command::Rules => {
                user.send(self.rules(ctx.core.players.len()));
                Ok(Flow::Continue)
            }
            Command::Role => {
                let actor = actor_index(ctx.core, user)?;
                send_role(user, ctx.core.players[actor].action_role());
                Ok(Flow::Continue)
            }
            Command::Players => {
                user.send(players_listing(&ctx.core.players));
                Ok(Flow::Continue)
            }
            _ => Err(GameError::WrongPhase),
        }
    }

    fn on_alarm(&mut self, ctx: &mut SessionContext<'_>, phase: PhaseAlarm) -> Flow {
        match (phase, self.phase) {
            (PhaseAlarm::ResolveNight, OneDayPhase::Night) => {
                self.resolve_night(ctx);
                Flow::Continue
            }
            (PhaseAlarm::EndDay, OneDayPhase::Day) => self.end_day(ctx),
            (alarm, phase) => {
                log::debug!("{:?} does not apply during {:?}", alarm, phase);
                Flow::Continue
            }
        }
    }

    fn custom_admin_receive(
        &mut self,
        ctx: &mut SessionContext<'_>,
        user: &User,
        name: &str,
        _args: &[String],
    ) -> Flow {
        match name {
            "skip" => match skip_phase(ctx) {
                Some(phase) => {
                    user.send(format!("Skipping {:?}.", phase));
                    self.on_alarm(ctx, phase)
                }
                None => {
                    user.send("There is no phase to skip.");
                    Flow::Continue
                }
            },
            "roles" => {
                user.send(roles_listing(&ctx.core.players));
                Flow::Continue
            }
            other => {
                user.send(format!("Unknown admin command !{}. Type !help.", other));
                Flow::Continue
            }
        }
    }

    fn resend_data(&self, core: &SessionCore, user: &User) {
        let Some(player) = core.player(user.username()) else {
            return;
        };
        // only the card they woke up as; night swaps stay secret
        send_role(user, player.action_role());
        user.right_send(lineup_entries(
            core.players
                .iter()
                .map(Player::role)
                .chain(self.center.iter().copied()),
        ));
        let header = match self.phase {
            OneDayPhase::Night => "Night",
            _ => "Day",
        };
        user.header_send(header, None);
        user.emit(if self.phase == OneDayPhase::Day {
            GameEvent::CanVote
        } else {
            GameEvent::CannotVote
        });
    }
}

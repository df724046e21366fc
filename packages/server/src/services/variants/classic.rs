//! Classic mafia: nights of hidden actions, days of nominations and trials.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::ability::Condition;
use crate::models::chat::{ChatMessage, ChatMessageType};
use crate::models::color::Color;
use crate::models::command::Command;
use crate::models::game::{Flow, GameError, GameType};
use crate::models::player::{alive_count, Player, Verdict};
use crate::models::role::Alignment;
use crate::models::user::{GameEvent, Sound, User};
use crate::services::catalog::{self, CLASSIC_FACTIONS, CLASSIC_PRIORITY, CLASSIC_SETUP};
use crate::services::night::NightResolver;
use crate::services::session::{GameVariant, SessionContext, SessionCore};
use crate::services::timer::PhaseAlarm;
use crate::services::trial::{majority, Trial, VerdictCount};
use crate::services::win;

use super::{
    actor_index, lineup_entries, living_target, players_listing, roles_listing, send_role,
    skip_phase,
};

pub const MIN_PLAYERS: usize = 4;
pub const MAX_PLAYERS: usize = 15;

pub const TOWN_ROOM: &str = "town";
pub const MAFIA_ROOM: &str = "mafia";
pub const DEAD_ROOM: &str = "dead";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassicPhase {
    Pregame,
    Night,
    Discussion,
    Nomination,
    Defense,
    Verdict,
    Over,
}

pub struct ClassicGame {
    phase: ClassicPhase,
    day: u32,
    trial: Trial,
    deathless_days: u32,
    died_today: bool,
    rng: StdRng,
}

impl Default for ClassicGame {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassicGame {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            phase: ClassicPhase::Pregame,
            day: 0,
            trial: Trial::new(),
            deathless_days: 0,
            died_today: false,
            rng,
        }
    }

    pub fn phase(&self) -> ClassicPhase {
        self.phase
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn nominee(&self) -> Option<&str> {
        self.trial.nominee()
    }

    fn begin_night(&mut self, ctx: &mut SessionContext<'_>) {
        self.phase = ClassicPhase::Night;
        for p in ctx.core.players.iter_mut() {
            p.reset_night();
            p.reset_trial();
        }
        if let Some(town) = ctx.core.rooms.get_mut(TOWN_ROOM) {
            town.mute_all();
        }
        if let Some(mafia) = ctx.core.rooms.get_mut(MAFIA_ROOM) {
            mafia.unmute_all();
            mafia.undeafen_all();
        }

        ctx.core
            .header_all(&format!("Night {}", self.day + 1), Some(Color::Navy));
        ctx.core.sound_all(Sound::Night);
        ctx.core.emit_all(GameEvent::CannotVote);
        ctx.core.broadcast_colored(
            "Night falls. If your role acts at night, choose with /target <name>.",
            Color::Info,
        );
        let night = ctx.core.config.night;
        ctx.arm(PhaseAlarm::ResolveNight, night);
        log::debug!("{}: night {}", ctx.core.name, self.day + 1);
    }

    fn resolve_night(&mut self, ctx: &mut SessionContext<'_>) -> Flow {
        let resolver = NightResolver::new(CLASSIC_PRIORITY, CLASSIC_FACTIONS);
        let report = resolver.resolve(&mut ctx.core.players, &mut [], &mut self.rng);

        if report.deaths.is_empty() {
            ctx.core.broadcast("Nobody died last night.");
        } else {
            self.died_today = true;
            for name in &report.deaths {
                announce_death(ctx.core, name, "was found dead");
            }
        }
        if win::game_over(&ctx.core.players) {
            return Flow::GameOver;
        }
        self.begin_discussion(ctx);
        Flow::Continue
    }

    fn begin_discussion(&mut self, ctx: &mut SessionContext<'_>) {
        self.phase = ClassicPhase::Discussion;
        self.day += 1;
        self.trial.new_day();
        open_town(ctx.core);
        // the faction channel only exists at night
        if let Some(mafia) = ctx.core.rooms.get_mut(MAFIA_ROOM) {
            mafia.mute_all();
            mafia.deafen_all();
        }

        ctx.core.header_all(&format!("Day {}", self.day), Some(Color::Yellow));
        ctx.core.sound_all(Sound::Day);
        ctx.core
            .broadcast_colored(&format!("Day {} begins. Discuss.", self.day), Color::Info);
        let discussion = ctx.core.config.discussion;
        ctx.arm(PhaseAlarm::EndDiscussion, discussion);
    }

    fn begin_nomination(&mut self, ctx: &mut SessionContext<'_>) {
        self.phase = ClassicPhase::Nomination;
        ctx.core.players.iter_mut().for_each(Player::reset_trial);
        self.trial.resume_nomination();
        open_town(ctx.core);

        let needed = majority(alive_count(&ctx.core.players));
        ctx.core.broadcast_colored(
            &format!(
                "Nominations are open. {} votes put someone on trial. Use /vote <name>.",
                needed
            ),
            Color::Info,
        );
        for p in ctx.core.players.iter().filter(|p| p.is_alive()) {
            p.user.emit(GameEvent::CanVote);
        }
        let remaining = self.trial.nomination_remaining(ctx.core.config.nomination);
        ctx.arm(PhaseAlarm::EndNomination, remaining);
    }

    fn begin_defense(&mut self, ctx: &mut SessionContext<'_>, nominee: &str) {
        self.phase = ClassicPhase::Defense;
        self.trial.begin(nominee);
        if let Some(town) = ctx.core.rooms.get_mut(TOWN_ROOM) {
            town.mute_all();
            town.unmute(nominee);
        }

        ctx.core.emit_all(GameEvent::CannotVote);
        ctx.core.emit_all(GameEvent::Hang {
            username: nominee.to_string(),
        });
        ctx.core.sound_all(Sound::Alert);
        let defense = ctx.core.config.defense;
        ctx.core.broadcast_colored(
            &format!(
                "{} is on trial. {}, you have {} seconds to defend yourself.",
                nominee,
                nominee,
                defense.as_secs()
            ),
            Color::Highlight,
        );
        ctx.arm(PhaseAlarm::EndDefense, defense);
        log::debug!("{}: {} on trial", ctx.core.name, nominee);
    }

    fn begin_verdict(&mut self, ctx: &mut SessionContext<'_>) {
        self.phase = ClassicPhase::Verdict;
        let nominee = self.trial.nominee().unwrap_or_default().to_string();
        for p in ctx.core.players.iter_mut() {
            p.final_vote = Verdict::Abstain;
        }
        open_town(ctx.core);
        if let Some(town) = ctx.core.rooms.get_mut(TOWN_ROOM) {
            town.mute(&nominee);
        }

        for p in ctx.core.players.iter() {
            if p.is_alive() && p.username() != nominee {
                p.user.emit(GameEvent::CanVote);
            }
        }
        ctx.core.broadcast_colored(
            &format!(
                "Is {} guilty? Vote /guilty or /innocent. Not voting counts as abstaining.",
                nominee
            ),
            Color::Highlight,
        );
        let verdict = ctx.core.config.verdict;
        ctx.arm(PhaseAlarm::EndVerdict, verdict);
    }

    fn resolve_verdict(&mut self, ctx: &mut SessionContext<'_>) -> Flow {
        let Some(nominee) = self.trial.nominee().map(str::to_string) else {
            log::debug!("verdict without a nominee");
            return self.end_day(ctx);
        };
        let count = VerdictCount::from_players(&ctx.core.players, &nominee);
        ctx.core.emit_all(GameEvent::FinalVerdict {
            guilty: count.guilty,
            innocent: count.innocent,
        });
        ctx.core.emit_all(GameEvent::EndVerdict);
        ctx.core.broadcast(&format!(
            "The town voted {} guilty, {} innocent, {} abstaining.",
            count.guilty, count.innocent, count.abstain
        ));

        if count.hangs() {
            if let Some(i) = ctx.core.player_index(&nominee) {
                ctx.core.players[i].hang();
            }
            ctx.core.emit_all(GameEvent::LineThroughPlayer {
                username: nominee.clone(),
            });
            self.died_today = true;
            announce_death(ctx.core, &nominee, "was hanged");
            if win::game_over(&ctx.core.players) {
                return Flow::GameOver;
            }
            return self.end_day(ctx);
        }

        ctx.core.broadcast(&format!("{} was acquitted.", nominee));
        ctx.core.emit_all(GameEvent::ResetGallows);
        let config = &ctx.core.config;
        if self
            .trial
            .can_continue(config.max_trials_per_day, config.nomination)
        {
            self.begin_nomination(ctx);
            Flow::Continue
        } else {
            self.end_day(ctx)
        }
    }

    fn end_day(&mut self, ctx: &mut SessionContext<'_>) -> Flow {
        if self.died_today {
            self.deathless_days = 0;
        } else {
            self.deathless_days += 1;
        }
        self.died_today = false;

        if self.deathless_days >= ctx.core.config.max_deathless_days {
            ctx.core.broadcast_colored(
                &format!(
                    "Nobody has died in {} days. The game ends in a stalemate.",
                    self.deathless_days
                ),
                Color::Highlight,
            );
            log::info!("{}: stalemate", ctx.core.name);
            return Flow::GameOver;
        }
        ctx.core.broadcast("The day is over.");
        self.begin_night(ctx);
        Flow::Continue
    }

    fn target(
        &mut self,
        ctx: &mut SessionContext<'_>,
        user: &User,
        name: &str,
    ) -> Result<Flow, GameError> {
        if self.phase != ClassicPhase::Night {
            return Err(GameError::WrongPhase);
        }
        let actor = actor_index(ctx.core, user)?;
        let player = &ctx.core.players[actor];
        if !player.is_alive() {
            return Err(GameError::ActorDead);
        }
        let ability = player.abilities().first().cloned();
        let faction = player.alignment() == Alignment::Hostile;
        if ability.is_none() && !faction {
            return Err(GameError::NoNightAction);
        }

        let target = living_target(ctx.core, name)?;
        let self_only = ability
            .as_ref()
            .map(|a| a.conditions.contains(&Condition::TargetIsSelf))
            .unwrap_or(false);
        if self_only && target != actor {
            return Err(GameError::SelfOnly);
        }
        if !self_only && target == actor {
            return Err(GameError::SelfTarget);
        }
        if let Some(ability) = &ability {
            if !ability.has_uses() {
                return Err(GameError::NoUsesRemaining(ability.name));
            }
        }

        let target_name = ctx.core.players[target].username().to_string();
        ctx.core.players[actor].target = Some(target_name.clone());
        user.emit(GameEvent::SelectUser {
            username: target_name.clone(),
        });
        user.send_colored(format!("You are targeting {}.", target_name), Color::Info, None);
        if faction {
            let note = ChatMessage::system(format!("{} is targeting {}.", user.username(), target_name))
                .with_type(ChatMessageType::Faction)
                .with_color(Color::Mafia);
            if let Some(mafia) = ctx.core.rooms.get(MAFIA_ROOM) {
                mafia.broadcast(&note);
            }
        }
        Ok(Flow::Continue)
    }

    fn untarget(&mut self, ctx: &mut SessionContext<'_>, user: &User) -> Result<Flow, GameError> {
        if self.phase != ClassicPhase::Night {
            return Err(GameError::WrongPhase);
        }
        let actor = actor_index(ctx.core, user)?;
        ctx.core.players[actor].target = None;
        user.send("You are no longer targeting anyone.");
        Ok(Flow::Continue)
    }

    fn vote(&mut self, ctx: &mut SessionContext<'_>, user: &User, name: &str) -> Result<Flow, GameError> {
        if self.phase != ClassicPhase::Nomination {
            return Err(GameError::WrongPhase);
        }
        let actor = actor_index(ctx.core, user)?;
        if !ctx.core.players[actor].is_alive() {
            return Err(GameError::ActorDead);
        }
        let target = living_target(ctx.core, name)?;
        if target == actor {
            return Err(GameError::SelfTarget);
        }

        let target_name = ctx.core.players[target].username().to_string();
        ctx.core.players[actor].vote = Some(target_name.clone());
        ctx.core
            .broadcast(&format!("{} voted for {}.", user.username(), target_name));
        ctx.core.sound_all(Sound::Vote);

        if let Some(nominee) = self.trial.check_nominations(&ctx.core.players) {
            self.begin_defense(ctx, &nominee);
        }
        Ok(Flow::Continue)
    }

    fn unvote(&mut self, ctx: &mut SessionContext<'_>, user: &User) -> Result<Flow, GameError> {
        if self.phase != ClassicPhase::Nomination {
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

    fn final_vote(
        &mut self,
        ctx: &mut SessionContext<'_>,
        user: &User,
        verdict: Verdict,
    ) -> Result<Flow, GameError> {
        if self.phase != ClassicPhase::Verdict {
            return Err(GameError::WrongPhase);
        }
        let actor = actor_index(ctx.core, user)?;
        let player = &ctx.core.players[actor];
        let is_nominee = self
            .trial
            .nominee()
            .map(|n| n.eq_ignore_ascii_case(player.username()))
            .unwrap_or(true);
        if !player.is_alive() || is_nominee {
            return Err(GameError::CannotVote);
        }

        ctx.core.players[actor].final_vote = verdict;
        let word = match verdict {
            Verdict::Guilty => "guilty",
            Verdict::Innocent => "innocent",
            Verdict::Abstain => "to abstain",
        };
        user.send(format!("You voted {}.", word));
        ctx.core.broadcast(&format!("{} has voted.", user.username()));
        Ok(Flow::Continue)
    }
}

/// Lets the living talk in town and keeps the dead silent there.
fn open_town(core: &mut SessionCore) {
    let Some(town) = core.rooms.get_mut(TOWN_ROOM) else {
        return;
    };
    for p in &core.players {
        if p.is_alive() {
            town.unmute(p.username());
        } else {
            town.mute(p.username());
        }
    }
}

fn announce_death(core: &mut SessionCore, name: &str, how: &str) {
    let Some(index) = core.player_index(name) else {
        log::debug!("death of unknown player {}", name);
        return;
    };
    let username = core.players[index].username().to_string();
    let role = core.players[index].role().name;
    let user = core.players[index].user.clone();

    core.broadcast_colored(
        &format!("{} {}. They were the {}.", username, how, role),
        Color::Danger,
    );
    core.emit_all(GameEvent::MarkAsDead {
        username: username.clone(),
    });
    core.sound_all(Sound::Death);

    // the dead still hear the town but only talk among themselves
    if let Some(town) = core.rooms.get_mut(TOWN_ROOM) {
        town.mute(&username);
    }
    if let Some(mafia) = core.rooms.get_mut(MAFIA_ROOM) {
        mafia.remove_member(&username);
    }
    core.rooms.open(DEAD_ROOM).add_member(user.clone());
    user.send_colored(
        "You are dead. You can still hear the town and talk with the dead.",
        Color::Dead,
        None,
    );
    core.refresh_roster();
}

impl GameVariant for ClassicGame {
    fn game_type(&self) -> GameType {
        GameType::Classic
    }

    fn min_players(&self) -> usize {
        MIN_PLAYERS
    }

    fn max_players(&self) -> usize {
        MAX_PLAYERS
    }

    fn rules(&self, players: usize) -> String {
        let roles = catalog::deal(CLASSIC_SETUP, players.clamp(MIN_PLAYERS, MAX_PLAYERS))
            .unwrap_or_default();
        format!(
            "Classic mafia. The town wins when every mafioso is dead; the mafia wins when they match the town.\n{}",
            catalog::rules_text(&roles)
        )
    }

    fn start(&mut self, ctx: &mut SessionContext<'_>) -> Flow {
        let Some(mut roles) = catalog::deal(CLASSIC_SETUP, ctx.core.seats.len()) else {
            log::error!("{}: no classic setup for {} players", ctx.core.name, ctx.core.seats.len());
            ctx.core.broadcast("This game cannot be played with this many players.");
            return Flow::GameOver;
        };
        roles.shuffle(&mut self.rng);
        ctx.core.players = ctx
            .core
            .seats
            .iter()
            .zip(roles)
            .map(|(seat, role)| Player::new(seat.user.clone(), seat.color, role))
            .collect();

        let town = ctx.core.rooms.open(TOWN_ROOM);
        for p in &ctx.core.players {
            town.add_member(p.user.clone());
        }
        let mafia = ctx.core.rooms.open(MAFIA_ROOM);
        for p in ctx.core.players.iter().filter(|p| p.alignment() == Alignment::Hostile) {
            mafia.add_member(p.user.clone());
        }
        ctx.core.rooms.open(DEAD_ROOM);

        let family: Vec<String> = ctx
            .core
            .players
            .iter()
            .filter(|p| p.alignment() == Alignment::Hostile)
            .map(|p| format!("{} ({})", p.username(), p.role().name))
            .collect();
        let lineup = lineup_entries(ctx.core.players.iter().map(Player::role));
        for p in &ctx.core.players {
            send_role(&p.user, p.role());
            p.user.right_send(lineup.clone());
            if p.alignment() == Alignment::Hostile {
                p.user.send_colored(
                    format!("Your family: {}.", family.join(", ")),
                    Color::Mafia,
                    None,
                );
            }
        }

        self.begin_night(ctx);
        Flow::Continue
    }

    fn end(&mut self, ctx: &mut SessionContext<'_>) {
        self.phase = ClassicPhase::Over;
        win::announce_standings(&ctx.core.players);
    }

    fn update(&mut self, ctx: &mut SessionContext<'_>) -> Flow {
        if self.phase == ClassicPhase::Nomination {
            if let Some(nominee) = self.trial.check_nominations(&ctx.core.players) {
                self.begin_defense(ctx, &nominee);
            }
        }
        Flow::Continue
    }

    fn chat(&mut self, ctx: &mut SessionContext<'_>, user: &User, text: &str) -> Result<(), GameError> {
        let index = actor_index(ctx.core, user)?;
        let player = &ctx.core.players[index];
        let (room, kind) = if !player.is_alive() {
            (DEAD_ROOM, ChatMessageType::Dead)
        } else if self.phase == ClassicPhase::Night {
            if player.alignment() != Alignment::Hostile {
                return Err(GameError::CannotTalk);
            }
            (MAFIA_ROOM, ChatMessageType::Faction)
        } else {
            (TOWN_ROOM, ChatMessageType::Public)
        };

        let message = ChatMessage::from_player(player.username(), text, player.color).with_type(kind);
        let Some(room) = ctx.core.rooms.get(room) else {
            return Err(GameError::CannotTalk);
        };
        if room.is_muted(user.username()) {
            return Err(GameError::CannotTalk);
        }
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
            Command::Target { first, .. } => self.target(ctx, user, &first),
            Command::Untarget => self.untarget(ctx, user),
            Command::Vote(name) => self.vote(ctx, user, &name),
            Command::Unvote => self.unvote(ctx, user),
            Command::Guilty => self.final_vote(ctx, user, Verdict::Guilty),
            Command::Innocent => self.final_vote(ctx, user, Verdict::Innocent),
            Command::Abstain => self.final_vote(ctx, user, Verdict::Abstain),
            Command::Rules => {
                user.send(self.rules(ctx.core.players.len()));
                Ok(Flow::Continue)
            }
            Command::Role => {
                let actor = actor_index(ctx.core, user)?;
                send_role(user, ctx.core.players[actor].role());
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
            (PhaseAlarm::ResolveNight, ClassicPhase::Night) => self.resolve_night(ctx),
            (PhaseAlarm::EndDiscussion, ClassicPhase::Discussion) => {
                self.begin_nomination(ctx);
                Flow::Continue
            }
            (PhaseAlarm::EndNomination, ClassicPhase::Nomination) => {
                ctx.core.broadcast("Time is up. Nobody was put on trial.");
                self.end_day(ctx)
            }
            (PhaseAlarm::EndDefense, ClassicPhase::Defense) => {
                self.begin_verdict(ctx);
                Flow::Continue
            }
            (PhaseAlarm::EndVerdict, ClassicPhase::Verdict) => self.resolve_verdict(ctx),
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
        send_role(user, player.role());
        user.right_send(lineup_entries(core.players.iter().map(Player::role)));
        let header = match self.phase {
            ClassicPhase::Night => format!("Night {}", self.day + 1),
            _ => format!("Day {}", self.day),
        };
        user.header_send(header, None);
        for dead in core.players.iter().filter(|p| !p.is_alive()) {
            user.emit(GameEvent::MarkAsDead {
                username: dead.username().to_string(),
            });
        }
        if let Some(nominee) = self.trial.nominee() {
            if matches!(self.phase, ClassicPhase::Defense | ClassicPhase::Verdict) {
                user.emit(GameEvent::Hang {
                    username: nominee.to_string(),
                });
            }
        }
        let can_vote = player.is_alive()
            && match self.phase {
                ClassicPhase::Nomination => true,
                ClassicPhase::Verdict => self.trial.nominee() != Some(player.username()),
                _ => false,
            };
        user.emit(if can_vote {
            GameEvent::CanVote
        } else {
            GameEvent::CannotVote
        });
    }
}

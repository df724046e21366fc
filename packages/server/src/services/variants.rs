//! Concrete games hosted by `GameSession`, plus the bits they share.

pub mod classic;
pub mod one_day;

use crate::models::color::Color;
use crate::models::game::GameError;
use crate::models::player::Player;
use crate::models::role::RoleRef;
use crate::models::user::{GameEvent, PanelEntry, User};

use super::session::{SessionContext, SessionCore};
use super::timer::PhaseAlarm;

pub use classic::ClassicGame;
pub use one_day::OneDayGame;

pub fn send_role(user: &User, role: RoleRef) {
    user.emit(GameEvent::Role {
        name: role.name.to_string(),
        alignment: role.alignment.to_string(),
        description: role.description.to_string(),
    });
    user.send_colored(
        format!("You are the {}. {}", role.name, role.description),
        role.color.unwrap_or(Color::Highlight),
        None,
    );
}

/// Index of the issuing player, failing if they are not in the game.
pub fn actor_index(core: &SessionCore, user: &User) -> Result<usize, GameError> {
    core.player_index(user.username())
        .ok_or_else(|| GameError::UnknownPlayer(user.username().to_string()))
}

/// Index of a named living player.
pub fn living_target(core: &SessionCore, name: &str) -> Result<usize, GameError> {
    let index = core
        .player_index(name)
        .ok_or_else(|| GameError::UnknownPlayer(name.to_string()))?;
    if !core.players[index].is_alive() {
        return Err(GameError::TargetDead(core.players[index].username().to_string()));
    }
    Ok(index)
}

/// Right-panel list of every card in play, in catalog order so it gives
/// nothing away about who holds what.
pub fn lineup_entries(roles: impl IntoIterator<Item = RoleRef>) -> Vec<PanelEntry> {
    let mut roles: Vec<RoleRef> = roles.into_iter().collect();
    roles.sort_by_key(|r| r.name);
    roles
        .into_iter()
        .map(|r| PanelEntry::new(r.name, r.color))
        .collect()
}

pub fn players_listing(players: &[Player]) -> String {
    let alive: Vec<&str> = players
        .iter()
        .filter(|p| p.is_alive())
        .map(Player::username)
        .collect();
    let dead: Vec<String> = players
        .iter()
        .filter(|p| !p.is_alive())
        .map(|p| format!("{} ({})", p.username(), p.role().name))
        .collect();
    if dead.is_empty() {
        format!("Alive: {}.", alive.join(", "))
    } else {
        format!("Alive: {}. Dead: {}.", alive.join(", "), dead.join(", "))
    }
}

pub fn roles_listing(players: &[Player]) -> String {
    players
        .iter()
        .map(|p| {
            if p.role().id == p.action_role().id {
                format!("{}: {}", p.username(), p.role().name)
            } else {
                format!("{}: {} (woke as {})", p.username(), p.role().name, p.action_role().name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Takes the pending phase alarm so it can be handled immediately. The
/// end-of-game close is never skipped.
pub fn skip_phase(ctx: &mut SessionContext<'_>) -> Option<PhaseAlarm> {
    match ctx.core.timer.pending() {
        None | Some(PhaseAlarm::CloseSession) => None,
        Some(_) => ctx.core.timer.skip(),
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ability::Ability;
use super::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleId {
    // classic
    Citizen,
    Doctor,
    Sheriff,
    Vigilante,
    Escort,
    Godfather,
    Mafioso,
    SerialKiller,
    Jester,
    Survivor,
    // one night
    Villager,
    Werewolf,
    Minion,
    Seer,
    Robber,
    Troublemaker,
    Drunk,
    Insomniac,
    Tanner,
    Doppelganger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Town,
    /// Mafia in the classic game, werewolves in one night.
    Hostile,
    Neutral,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::Town => write!(f, "town"),
            Alignment::Hostile => write!(f, "mafia"),
            Alignment::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Passive {
    /// Cannot die at night.
    NightImmune,
    /// Reads as innocent to investigations.
    DetectionImmune,
    /// Counts as a werewolf for one-night win conditions.
    Lycan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinCondition {
    /// No hostile player is alive.
    Town,
    /// No town player is alive, or it is down to one town against one hostile.
    Hostile,
    Survive,
    Hanged,
    /// Alive with at most one other player left.
    LastStanding,
    /// A lycan was hanged, or none was in play and nobody hanged.
    LycanHanged,
    /// No lycan and no tanner was hanged.
    NoLycanHanged,
}

/// Immutable role template. Players share these by reference; anything a
/// player mutates lives on the `Player`.
#[derive(Debug, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: &'static str,
    pub alignment: Alignment,
    pub win: WinCondition,
    pub abilities: &'static [Ability],
    pub passives: &'static [Passive],
    pub description: &'static str,
    pub color: Option<Color>,
}

pub type RoleRef = &'static Role;

impl Role {
    pub fn has_passive(&self, passive: Passive) -> bool {
        self.passives.contains(&passive)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

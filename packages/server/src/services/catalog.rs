//! Role catalog for both game variants.
//!
//! Every role is a `static` template. Wake order is fixed per variant by the
//! `*_PRIORITY` lists and deals are taken from the front of `*_SETUP`.

use crate::models::ability::{Ability, Action, Condition, Targeting};
use crate::models::color::Color;
use crate::models::role::{Alignment, Passive, Role, RoleId, RoleRef, WinCondition};

use super::night::FactionAction;

const KILL_CONDITIONS: &[Condition] = &[
    Condition::TargetAlive,
    Condition::TargetNotSelf,
    Condition::TargetNotHealed,
    Condition::TargetNotNightImmune,
];

pub static CITIZEN: Role = Role {
    id: RoleId::Citizen,
    name: "Citizen",
    alignment: Alignment::Town,
    win: WinCondition::Town,
    abilities: &[],
    passives: &[],
    description: "An ordinary townsperson. Find the mafia and vote them out.",
    color: Some(Color::Green),
};

pub static DOCTOR: Role = Role {
    id: RoleId::Doctor,
    name: "Doctor",
    alignment: Alignment::Town,
    win: WinCondition::Town,
    abilities: &[Ability::new(
        "heal",
        Targeting::Single,
        &[Condition::TargetAlive, Condition::TargetNotSelf],
        Action::Heal,
    )],
    passives: &[],
    description: "Each night, heal one other player. A healed player survives any attack.",
    color: Some(Color::Green),
};

pub static SHERIFF: Role = Role {
    id: RoleId::Sheriff,
    name: "Sheriff",
    alignment: Alignment::Town,
    win: WinCondition::Town,
    abilities: &[Ability::new(
        "investigate",
        Targeting::Single,
        &[Condition::TargetAlive, Condition::TargetNotSelf],
        Action::Investigate,
    )],
    passives: &[],
    description: "Each night, check one player for mafia ties.",
    color: Some(Color::Green),
};

pub static VIGILANTE: Role = Role {
    id: RoleId::Vigilante,
    name: "Vigilante",
    alignment: Alignment::Town,
    win: WinCondition::Town,
    abilities: &[Ability::new("shoot", Targeting::Single, KILL_CONDITIONS, Action::Kill).limited(2)],
    passives: &[],
    description: "Twice per game, shoot a player at night.",
    color: Some(Color::Green),
};

pub static ESCORT: Role = Role {
    id: RoleId::Escort,
    name: "Escort",
    alignment: Alignment::Town,
    win: WinCondition::Town,
    abilities: &[Ability::new(
        "distract",
        Targeting::Single,
        &[Condition::TargetAlive, Condition::TargetNotSelf],
        Action::Roleblock,
    )],
    passives: &[],
    description: "Each night, distract a player so they cannot act.",
    color: Some(Color::Green),
};

pub static GODFATHER: Role = Role {
    id: RoleId::Godfather,
    name: "Godfather",
    alignment: Alignment::Hostile,
    win: WinCondition::Hostile,
    abilities: &[],
    passives: &[Passive::NightImmune, Passive::DetectionImmune],
    description: "Leader of the mafia. Cannot be killed at night and appears innocent.",
    color: Some(Color::Mafia),
};

pub static MAFIOSO: Role = Role {
    id: RoleId::Mafioso,
    name: "Mafioso",
    alignment: Alignment::Hostile,
    win: WinCondition::Hostile,
    abilities: &[],
    passives: &[],
    description: "Member of the mafia. Vote with your family on who dies tonight.",
    color: Some(Color::Mafia),
};

pub static SERIAL_KILLER: Role = Role {
    id: RoleId::SerialKiller,
    name: "Serial Killer",
    alignment: Alignment::Neutral,
    win: WinCondition::LastStanding,
    abilities: &[Ability::new("stab", Targeting::Single, KILL_CONDITIONS, Action::Kill)],
    passives: &[Passive::NightImmune],
    description: "Kill one player each night. Win by being the last one standing.",
    color: Some(Color::Navy),
};

pub static JESTER: Role = Role {
    id: RoleId::Jester,
    name: "Jester",
    alignment: Alignment::Neutral,
    win: WinCondition::Hanged,
    abilities: &[],
    passives: &[],
    description: "Trick the town into hanging you.",
    color: Some(Color::Pink),
};

pub static SURVIVOR: Role = Role {
    id: RoleId::Survivor,
    name: "Survivor",
    alignment: Alignment::Neutral,
    win: WinCondition::Survive,
    abilities: &[Ability::new(
        "vest",
        Targeting::Single,
        &[Condition::TargetIsSelf],
        Action::Heal,
    )
    .limited(4)],
    passives: &[],
    description: "Target yourself to put on a vest. Win by being alive at the end.",
    color: Some(Color::Yellow),
};

pub static CLASSIC_PRIORITY: &[RoleId] = &[
    RoleId::Escort,
    RoleId::Doctor,
    RoleId::Survivor,
    RoleId::Sheriff,
    RoleId::Vigilante,
    RoleId::SerialKiller,
    RoleId::Godfather,
    RoleId::Mafioso,
];

pub static CLASSIC_SETUP: &[RoleRef] = &[
    &GODFATHER,
    &DOCTOR,
    &MAFIOSO,
    &VIGILANTE,
    &SHERIFF,
    &ESCORT,
    &JESTER,
    &CITIZEN,
    &SURVIVOR,
    &MAFIOSO,
    &SERIAL_KILLER,
    &CITIZEN,
    &CITIZEN,
    &CITIZEN,
    &CITIZEN,
];

pub static CLASSIC_FACTIONS: &[FactionAction] = &[FactionAction {
    alignment: Alignment::Hostile,
    ability: Ability::new("mafia kill", Targeting::Single, KILL_CONDITIONS, Action::Kill),
}];

pub static VILLAGER: Role = Role {
    id: RoleId::Villager,
    name: "Villager",
    alignment: Alignment::Town,
    win: WinCondition::LycanHanged,
    abilities: &[],
    passives: &[],
    description: "No special power. Find a werewolf and hang them.",
    color: Some(Color::Green),
};

pub static WEREWOLF: Role = Role {
    id: RoleId::Werewolf,
    name: "Werewolf",
    alignment: Alignment::Hostile,
    win: WinCondition::NoLycanHanged,
    abilities: &[],
    passives: &[Passive::Lycan],
    description: "You wake with the other werewolves. Survive the vote.",
    color: Some(Color::Mafia),
};

pub static MINION: Role = Role {
    id: RoleId::Minion,
    name: "Minion",
    alignment: Alignment::Hostile,
    win: WinCondition::NoLycanHanged,
    abilities: &[],
    passives: &[],
    description: "You know who the werewolves are. Keep them from being hanged.",
    color: Some(Color::Mafia),
};

pub static SEER: Role = Role {
    id: RoleId::Seer,
    name: "Seer",
    alignment: Alignment::Town,
    win: WinCondition::LycanHanged,
    abilities: &[Ability::new(
        "see",
        Targeting::Single,
        &[Condition::TargetNotSelf],
        Action::RevealRole,
    )],
    passives: &[],
    description: "Look at another player's card.",
    color: Some(Color::Green),
};

pub static ROBBER: Role = Role {
    id: RoleId::Robber,
    name: "Robber",
    alignment: Alignment::Town,
    win: WinCondition::LycanHanged,
    abilities: &[Ability::new(
        "rob",
        Targeting::Single,
        &[Condition::TargetNotSelf],
        Action::Rob,
    )],
    passives: &[],
    description: "Swap your card with another player's and look at your new card.",
    color: Some(Color::Green),
};

pub static TROUBLEMAKER: Role = Role {
    id: RoleId::Troublemaker,
    name: "Troublemaker",
    alignment: Alignment::Town,
    win: WinCondition::LycanHanged,
    abilities: &[Ability::new(
        "swap",
        Targeting::Pair,
        &[Condition::TargetNotSelf, Condition::TargetsDistinct],
        Action::SwapTargets,
    )],
    passives: &[],
    description: "Swap the cards of two other players without looking at them.",
    color: Some(Color::Green),
};

pub static DRUNK: Role = Role {
    id: RoleId::Drunk,
    name: "Drunk",
    alignment: Alignment::Town,
    win: WinCondition::LycanHanged,
    abilities: &[Ability::new("stumble", Targeting::None, &[], Action::SwapWithCenter)],
    passives: &[],
    description: "Swap your card with a center card without looking at it.",
    color: Some(Color::Green),
};

pub static INSOMNIAC: Role = Role {
    id: RoleId::Insomniac,
    name: "Insomniac",
    alignment: Alignment::Town,
    win: WinCondition::LycanHanged,
    abilities: &[Ability::new("wake", Targeting::None, &[], Action::RevealOwnRole)],
    passives: &[],
    description: "At the end of the night, look at your own card.",
    color: Some(Color::Green),
};

pub static TANNER: Role = Role {
    id: RoleId::Tanner,
    name: "Tanner",
    alignment: Alignment::Neutral,
    win: WinCondition::Hanged,
    abilities: &[],
    passives: &[],
    description: "You hate your job. You win only if you are hanged.",
    color: Some(Color::Brown),
};

pub static DOPPELGANGER: Role = Role {
    id: RoleId::Doppelganger,
    name: "Doppelganger",
    alignment: Alignment::Neutral,
    win: WinCondition::Survive,
    abilities: &[Ability::new(
        "copy",
        Targeting::Single,
        &[Condition::TargetNotSelf],
        Action::Copy,
    )],
    passives: &[],
    description: "Look at another player's card and become that role.",
    color: Some(Color::Purple),
};

pub static ONE_DAY_PRIORITY: &[RoleId] = &[
    RoleId::Doppelganger,
    RoleId::Werewolf,
    RoleId::Minion,
    RoleId::Seer,
    RoleId::Robber,
    RoleId::Troublemaker,
    RoleId::Drunk,
    RoleId::Insomniac,
];

pub static ONE_DAY_SETUP: &[RoleRef] = &[
    &WEREWOLF,
    &WEREWOLF,
    &SEER,
    &ROBBER,
    &TROUBLEMAKER,
    &VILLAGER,
    &DRUNK,
    &INSOMNIAC,
    &MINION,
    &TANNER,
    &DOPPELGANGER,
    &VILLAGER,
    &VILLAGER,
];

/// Roles for a deal of `count` cards, in setup order. `None` when the setup
/// does not have that many cards.
pub fn deal(setup: &'static [RoleRef], count: usize) -> Option<Vec<RoleRef>> {
    setup.get(..count).map(|roles| roles.to_vec())
}

pub fn rules_text(roles: &[RoleRef]) -> String {
    let mut seen: Vec<RoleId> = Vec::new();
    let mut lines = Vec::new();
    for role in roles {
        if seen.contains(&role.id) {
            continue;
        }
        seen.push(role.id);
        lines.push(format!("{} ({}): {}", role.name, role.alignment, role.description));
    }
    lines.join("\n")
}

use serde::Serialize;

use super::ability::Ability;
use super::color::Color;
use super::role::{Alignment, RoleRef};
use super::user::User;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Guilty,
    Innocent,
    #[default]
    Abstain,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub user: User,
    pub color: Color,
    role: RoleRef,
    action_role: RoleRef,
    abilities: Vec<Ability>,
    alive: bool,
    hanged: bool,
    pub target: Option<String>,
    pub second_target: Option<String>,
    pub vote: Option<String>,
    pub final_vote: Verdict,
    pub role_blocked: bool,
    pub healed: bool,
}

impl Player {
    pub fn new(user: User, color: Color, role: RoleRef) -> Self {
        Self {
            user,
            color,
            role,
            action_role: role,
            abilities: role.abilities.to_vec(),
            alive: true,
            hanged: false,
            target: None,
            second_target: None,
            vote: None,
            final_vote: Verdict::Abstain,
            role_blocked: false,
            healed: false,
        }
    }

    pub fn username(&self) -> &str {
        self.user.username()
    }

    pub fn role(&self) -> RoleRef {
        self.role
    }

    /// Role deciding when this player wakes at night.
    pub fn action_role(&self) -> RoleRef {
        self.action_role
    }

    pub fn alignment(&self) -> Alignment {
        self.role.alignment
    }

    pub fn abilities(&self) -> &[Ability] {
        &self.abilities
    }

    pub fn ability_mut(&mut self, index: usize) -> Option<&mut Ability> {
        self.abilities.get_mut(index)
    }

    /// Takes on a new identity completely: role, wake order and a fresh
    /// private copy of the new role's abilities.
    pub fn assume_role(&mut self, role: RoleRef) {
        self.role = role;
        self.action_role = role;
        self.abilities = role.abilities.to_vec();
    }

    /// Replaces only the held card. Wake order and abilities stay with the
    /// card the player was dealt.
    pub fn swap_role(&mut self, role: RoleRef) -> RoleRef {
        std::mem::replace(&mut self.role, role)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn was_hanged(&self) -> bool {
        self.hanged
    }

    /// Always succeeds; killing a dead player changes nothing.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn hang(&mut self) {
        self.kill();
        self.hanged = true;
    }

    pub fn revive(&mut self) {
        self.alive = true;
        self.hanged = false;
    }

    pub fn reset_night(&mut self) {
        self.target = None;
        self.second_target = None;
        self.role_blocked = false;
        self.healed = false;
    }

    pub fn reset_trial(&mut self) {
        self.vote = None;
        self.final_vote = Verdict::Abstain;
    }

    pub fn rebind(&mut self, user: &User) {
        if user.username().eq_ignore_ascii_case(self.username()) {
            self.user = user.clone();
        }
    }
}

/// Index of the player with `username`, if they are still in the roster.
pub fn find_player(players: &[Player], username: &str) -> Option<usize> {
    players
        .iter()
        .position(|p| p.username().eq_ignore_ascii_case(username))
}

pub fn alive_count(players: &[Player]) -> usize {
    players.iter().filter(|p| p.is_alive()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog;

    fn player(name: &str, role: RoleRef) -> Player {
        let (user, _rx) = User::channel(name, false);
        Player::new(user, Color::Red, role)
    }

    #[test]
    fn test_same_template_keeps_separate_use_counters() {
        let mut first = player("first", &catalog::VIGILANTE);
        let second = player("second", &catalog::VIGILANTE);

        first.ability_mut(0).unwrap().consume();
        first.ability_mut(0).unwrap().consume();

        assert!(!first.abilities()[0].has_uses());
        assert!(second.abilities()[0].has_uses());
        assert_eq!(catalog::VIGILANTE.abilities[0].uses_left(), Some(2));
    }

    #[test]
    fn test_kill_is_idempotent_and_hang_marks_hanged() {
        let mut p = player("p", &catalog::CITIZEN);
        p.kill();
        p.kill();
        assert!(!p.is_alive());
        assert!(!p.was_hanged());

        let mut q = player("q", &catalog::JESTER);
        q.hang();
        assert!(!q.is_alive());
        assert!(q.was_hanged());
    }

    #[test]
    fn test_swap_keeps_wake_order_but_assume_changes_it() {
        let mut robber = player("robber", &catalog::ROBBER);
        let previous = robber.swap_role(&catalog::SEER);
        assert_eq!(previous.id, catalog::ROBBER.id);
        assert_eq!(robber.role().id, catalog::SEER.id);
        assert_eq!(robber.action_role().id, catalog::ROBBER.id);

        let mut dopple = player("dopple", &catalog::DOPPELGANGER);
        dopple.assume_role(&catalog::SEER);
        assert_eq!(dopple.action_role().id, catalog::SEER.id);
        assert_eq!(dopple.abilities(), catalog::SEER.abilities);
    }

    #[test]
    fn test_find_player_is_case_insensitive() {
        let players = vec![player("Alice", &catalog::CITIZEN), player("bob", &catalog::CITIZEN)];
        assert_eq!(find_player(&players, "alice"), Some(0));
        assert_eq!(find_player(&players, "BOB"), Some(1));
        assert_eq!(find_player(&players, "carol"), None);
    }
}

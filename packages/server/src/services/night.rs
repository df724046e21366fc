//! Night resolution.
//!
//! Players act one at a time in the variant's fixed role-priority order
//! (by `action_role`, ties in roster order). Every interaction between
//! abilities, such as heal versus kill or roleblock versus anything, goes
//! through the flags an earlier action leaves on the target. Nothing is
//! special-cased here.

use rand::Rng;

use crate::models::ability::{Ability, Action, Condition, Targeting};
use crate::models::player::{find_player, Player};
use crate::models::role::{Alignment, Passive, RoleId, RoleRef};

/// A shared action decided by plurality among the living members of an
/// alignment, applied once after everybody else has acted.
#[derive(Debug, Clone)]
pub struct FactionAction {
    pub alignment: Alignment,
    pub ability: Ability,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightReport {
    /// Usernames of players killed tonight, in the order they died.
    pub deaths: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Targets {
    NoTarget,
    Single(usize),
    Pair(usize, usize),
}

impl Targets {
    fn primary(&self) -> Option<usize> {
        match *self {
            Targets::NoTarget => None,
            Targets::Single(t) | Targets::Pair(t, _) => Some(t),
        }
    }

    fn all(&self) -> Vec<usize> {
        match *self {
            Targets::NoTarget => vec![],
            Targets::Single(t) => vec![t],
            Targets::Pair(a, b) => vec![a, b],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    Done,
    IdentityChanged,
}

pub struct NightResolver<'a> {
    priority: &'a [RoleId],
    factions: &'a [FactionAction],
}

impl<'a> NightResolver<'a> {
    pub fn new(priority: &'a [RoleId], factions: &'a [FactionAction]) -> Self {
        Self { priority, factions }
    }

    fn rank(&self, role: RoleId) -> usize {
        self.priority
            .iter()
            .position(|id| *id == role)
            .unwrap_or(self.priority.len())
    }

    /// Roster indices in the order players wake up.
    pub fn wake_order(&self, players: &[Player]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..players.len()).collect();
        order.sort_by_key(|&i| self.rank(players[i].action_role().id));
        order
    }

    pub fn resolve<R: Rng + ?Sized>(
        &self,
        players: &mut [Player],
        center: &mut [RoleRef],
        rng: &mut R,
    ) -> NightReport {
        let mut report = NightReport::default();

        for actor in self.wake_order(players) {
            self.act(actor, players, center, rng, &mut report);
        }
        for faction in self.factions {
            self.resolve_faction(faction, players, center, rng, &mut report);
        }

        log::debug!("night resolved, deaths: {:?}", report.deaths);
        report
    }

    fn act<R: Rng + ?Sized>(
        &self,
        actor: usize,
        players: &mut [Player],
        center: &mut [RoleRef],
        rng: &mut R,
        report: &mut NightReport,
    ) {
        if !players[actor].is_alive() {
            return;
        }
        if players[actor].role_blocked {
            if players[actor].target.is_some() {
                notify(&players[actor], "You were distracted and could not act tonight.");
            }
            return;
        }

        let mut copied = false;
        let mut index = 0;
        while index < players[actor].abilities().len() {
            let ability = players[actor].abilities()[index].clone();
            index += 1;

            if copied && ability.action == Action::Copy {
                continue;
            }
            let Some(resolved) = resolve_targets(&ability, actor, players) else {
                continue;
            };
            let Some(targets) = resolved else {
                log::debug!(
                    "{} targeted someone who is no longer here",
                    players[actor].username()
                );
                notify(&players[actor], "Your target is no longer here.");
                continue;
            };
            if !ability.has_uses() {
                notify(
                    &players[actor],
                    &format!("You have no uses of {} remaining.", ability.name),
                );
                continue;
            }
            if !conditions_hold(&ability, actor, targets, players) {
                continue;
            }
            if let Some(own) = players[actor].ability_mut(index - 1) {
                own.consume();
            }
            if apply(ability.action, actor, targets, players, center, rng, report)
                == Applied::IdentityChanged
            {
                copied = true;
                index = 0;
            }
        }
    }

    fn resolve_faction<R: Rng + ?Sized>(
        &self,
        faction: &FactionAction,
        players: &mut [Player],
        center: &mut [RoleRef],
        rng: &mut R,
        report: &mut NightReport,
    ) {
        // (target, votes, first voter)
        let mut tally: Vec<(usize, usize, usize)> = Vec::new();
        let mut best: Option<usize> = None;
        let mut best_count = 0;

        for voter in self.wake_order(players) {
            let p = &players[voter];
            if !p.is_alive() || p.role_blocked || p.alignment() != faction.alignment {
                continue;
            }
            let Some(target) = p.target.as_deref().and_then(|t| find_player(players, t)) else {
                continue;
            };
            let entry = match tally.iter().position(|(t, _, _)| *t == target) {
                Some(entry) => entry,
                None => {
                    tally.push((target, 0, voter));
                    tally.len() - 1
                }
            };
            tally[entry].1 += 1;
            if tally[entry].1 > best_count {
                best_count = tally[entry].1;
                best = Some(entry);
            }
        }

        let Some((target, _, actor)) = best.map(|entry| tally[entry]) else {
            return;
        };
        let targets = Targets::Single(target);
        if conditions_hold(&faction.ability, actor, targets, players) {
            apply(faction.ability.action, actor, targets, players, center, rng, report);
        }
    }
}

/// `None` when the actor did not pick the targets this ability needs,
/// `Some(None)` when a picked name no longer resolves to a player.
fn resolve_targets(ability: &Ability, actor: usize, players: &[Player]) -> Option<Option<Targets>> {
    let p = &players[actor];
    match ability.targeting {
        Targeting::None => Some(Some(Targets::NoTarget)),
        Targeting::Single => {
            let name = p.target.as_deref()?;
            Some(find_player(players, name).map(Targets::Single))
        }
        Targeting::Pair => {
            let first = p.target.as_deref()?;
            let second = p.second_target.as_deref()?;
            Some(
                find_player(players, first)
                    .zip(find_player(players, second))
                    .map(|(a, b)| Targets::Pair(a, b)),
            )
        }
    }
}

fn conditions_hold(ability: &Ability, actor: usize, targets: Targets, players: &[Player]) -> bool {
    for condition in ability.conditions {
        if !condition_holds(*condition, actor, targets, players) {
            veto_notice(*condition, ability.action, actor, targets, players);
            return false;
        }
    }
    true
}

fn condition_holds(condition: Condition, actor: usize, targets: Targets, players: &[Player]) -> bool {
    match condition {
        Condition::TargetAlive => targets.all().iter().all(|&t| players[t].is_alive()),
        Condition::TargetIsSelf => targets.primary() == Some(actor),
        Condition::TargetNotSelf => !targets.all().contains(&actor),
        Condition::TargetNotHealed => targets.primary().map_or(true, |t| !players[t].healed),
        Condition::TargetNotNightImmune => targets
            .primary()
            .map_or(true, |t| !players[t].role().has_passive(Passive::NightImmune)),
        Condition::TargetsDistinct => match targets {
            Targets::Pair(a, b) => a != b,
            _ => true,
        },
    }
}

fn veto_notice(condition: Condition, action: Action, actor: usize, targets: Targets, players: &[Player]) {
    let target = targets.primary().map(|t| &players[t]);
    match (condition, action, target) {
        (Condition::TargetNotHealed, Action::Kill, Some(victim)) => {
            notify(victim, "You were attacked tonight, but someone nursed you back to health!");
        }
        (Condition::TargetNotNightImmune, Action::Kill, Some(victim)) => {
            notify(victim, "Someone attacked you tonight, but you are immune at night.");
            notify(&players[actor], "Your target was immune to your attack!");
        }
        (Condition::TargetAlive, _, _) => {
            notify(&players[actor], "Your target is already dead.");
        }
        _ => {}
    }
}

fn apply<R: Rng + ?Sized>(
    action: Action,
    actor: usize,
    targets: Targets,
    players: &mut [Player],
    center: &mut [RoleRef],
    rng: &mut R,
    report: &mut NightReport,
) -> Applied {
    match (action, targets) {
        (Action::Heal, Targets::Single(t)) => players[t].healed = true,
        (Action::Roleblock, Targets::Single(t)) => players[t].role_blocked = true,
        (Action::Kill, Targets::Single(t)) => {
            if players[t].is_alive() {
                players[t].kill();
                report.deaths.push(players[t].username().to_string());
                notify(&players[t], "You were killed.");
            }
        }
        (Action::Investigate, Targets::Single(t)) => {
            let target = &players[t];
            let suspicious = target.alignment() == Alignment::Hostile
                && !target.role().has_passive(Passive::DetectionImmune);
            let finding = if suspicious {
                format!("{} is a member of the mafia!", target.username())
            } else {
                format!("{} is not suspicious.", target.username())
            };
            notify(&players[actor], &finding);
        }
        (Action::RevealRole, Targets::Single(t)) => {
            let finding = format!("{} is the {}.", players[t].username(), players[t].role().name);
            notify(&players[actor], &finding);
        }
        (Action::Rob, Targets::Single(t)) => {
            swap_cards(players, actor, t);
            let finding = format!(
                "You stole {}'s card. You are now the {}.",
                players[t].username(),
                players[actor].role().name
            );
            notify(&players[actor], &finding);
        }
        (Action::SwapTargets, Targets::Pair(a, b)) => {
            swap_cards(players, a, b);
            let finding = format!(
                "You swapped the cards of {} and {}.",
                players[a].username(),
                players[b].username()
            );
            notify(&players[actor], &finding);
        }
        (Action::SwapWithCenter, _) => {
            if !center.is_empty() {
                let slot = rng.gen_range(0..center.len());
                center[slot] = players[actor].swap_role(center[slot]);
                notify(
                    &players[actor],
                    &format!("You swapped your card with center card #{}.", slot + 1),
                );
            }
        }
        (Action::Copy, Targets::Single(t)) => {
            let role = players[t].role();
            players[actor].assume_role(role);
            notify(&players[actor], &format!("You are now a copy of the {}.", role.name));
            return Applied::IdentityChanged;
        }
        (Action::RevealOwnRole, _) => {
            let finding = format!("You wake up as the {}.", players[actor].role().name);
            notify(&players[actor], &finding);
        }
        (action, targets) => {
            log::warn!("{:?} cannot be applied to {:?}", action, targets);
        }
    }
    Applied::Done
}

fn swap_cards(players: &mut [Player], a: usize, b: usize) {
    let role_a = players[a].role();
    let role_b = players[b].role();
    players[a].swap_role(role_b);
    players[b].swap_role(role_a);
}

fn notify(player: &Player, text: &str) {
    player.user.notify(text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::color::Color;
    use crate::models::user::{ServerMessage, User};
    use crate::services::catalog::{self, CLASSIC_FACTIONS, CLASSIC_PRIORITY, ONE_DAY_PRIORITY};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::sync::mpsc::UnboundedReceiver;

    type Inbox = UnboundedReceiver<ServerMessage>;

    fn roster(specs: &[(&str, RoleRef)]) -> (Vec<Player>, Vec<Inbox>) {
        specs
            .iter()
            .map(|(name, role)| {
                let (user, rx) = User::channel(*name, false);
                (Player::new(user, Color::Red, role), rx)
            })
            .unzip()
    }

    fn set_target(players: &mut [Player], actor: &str, target: &str) {
        let i = find_player(players, actor).unwrap();
        players[i].target = Some(target.to_string());
    }

    fn texts(rx: &mut Inbox) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let ServerMessage::Chat(chat) = message {
                out.push(chat.content);
            }
        }
        out
    }

    fn classic() -> NightResolver<'static> {
        NightResolver::new(CLASSIC_PRIORITY, CLASSIC_FACTIONS)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn four_player_roster() -> (Vec<Player>, Vec<Inbox>) {
        roster(&[
            ("don", &catalog::GODFATHER),
            ("goon", &catalog::MAFIOSO),
            ("doc", &catalog::DOCTOR),
            ("vigi", &catalog::VIGILANTE),
        ])
    }

    #[test]
    fn test_mafia_kill_lands_without_heal() {
        let (mut players, _rx) = four_player_roster();
        set_target(&mut players, "don", "vigi");
        set_target(&mut players, "goon", "vigi");

        let report = classic().resolve(&mut players, &mut [], &mut rng());

        assert_eq!(report.deaths, vec!["vigi".to_string()]);
        assert!(!players[3].is_alive());
    }

    #[test]
    fn test_heal_vetoes_mafia_kill() {
        let (mut players, mut rx) = four_player_roster();
        set_target(&mut players, "don", "vigi");
        set_target(&mut players, "goon", "vigi");
        set_target(&mut players, "doc", "vigi");

        let report = classic().resolve(&mut players, &mut [], &mut rng());

        assert!(report.deaths.is_empty());
        assert!(players[3].is_alive());
        assert!(texts(&mut rx[3]).iter().any(|t| t.contains("nursed you back")));
    }

    #[test]
    fn test_roleblocked_doctor_cannot_save() {
        let (mut players, mut rx) = roster(&[
            ("don", &catalog::GODFATHER),
            ("escort", &catalog::ESCORT),
            ("doc", &catalog::DOCTOR),
            ("cit", &catalog::CITIZEN),
        ]);
        // a town escort blocking the doctor by mistake
        set_target(&mut players, "escort", "doc");
        set_target(&mut players, "doc", "cit");
        set_target(&mut players, "don", "cit");

        let report = classic().resolve(&mut players, &mut [], &mut rng());

        assert_eq!(report.deaths, vec!["cit".to_string()]);
        assert!(texts(&mut rx[2]).iter().any(|t| t.contains("distracted")));
    }

    #[test]
    fn test_exhausted_uses_send_notice_and_do_not_affect_other_vigilante() {
        let (mut players, mut rx) = roster(&[
            ("v1", &catalog::VIGILANTE),
            ("v2", &catalog::VIGILANTE),
            ("a", &catalog::CITIZEN),
            ("b", &catalog::CITIZEN),
            ("c", &catalog::CITIZEN),
        ]);
        let resolver = classic();

        set_target(&mut players, "v1", "a");
        resolver.resolve(&mut players, &mut [], &mut rng());
        players.iter_mut().for_each(Player::reset_night);
        set_target(&mut players, "v1", "b");
        resolver.resolve(&mut players, &mut [], &mut rng());
        players.iter_mut().for_each(Player::reset_night);
        assert_eq!(players[0].abilities()[0].uses_left(), Some(0));
        assert_eq!(players[1].abilities()[0].uses_left(), Some(2));

        set_target(&mut players, "v1", "c");
        set_target(&mut players, "v2", "c");
        let report = resolver.resolve(&mut players, &mut [], &mut rng());

        assert_eq!(report.deaths, vec!["c".to_string()]);
        assert!(texts(&mut rx[0]).iter().any(|t| t.contains("no uses of shoot remaining")));
        assert_eq!(players[1].abilities()[0].uses_left(), Some(1));
    }

    #[test]
    fn test_outcome_ignores_roster_order() {
        let specs: [(&str, RoleRef); 6] = [
            ("don", &catalog::GODFATHER),
            ("escort", &catalog::ESCORT),
            ("doc", &catalog::DOCTOR),
            ("vigi", &catalog::VIGILANTE),
            ("sk", &catalog::SERIAL_KILLER),
            ("cit", &catalog::CITIZEN),
        ];
        let choices = [
            ("don", "doc"),
            ("escort", "sk"),
            ("doc", "cit"),
            ("vigi", "cit"),
            ("sk", "vigi"),
        ];

        let run = |order: &[usize]| {
            let permuted: Vec<(&str, RoleRef)> = order.iter().map(|&i| specs[i]).collect();
            let (mut players, _rx) = roster(&permuted);
            for (actor, target) in choices {
                set_target(&mut players, actor, target);
            }
            classic().resolve(&mut players, &mut [], &mut rng());
            let mut alive: Vec<(String, bool)> = players
                .iter()
                .map(|p| (p.username().to_string(), p.is_alive()))
                .collect();
            alive.sort();
            alive
        };

        let baseline = run(&[0, 1, 2, 3, 4, 5]);
        assert_eq!(baseline, run(&[5, 4, 3, 2, 1, 0]));
        assert_eq!(baseline, run(&[2, 5, 0, 4, 1, 3]));
        // doc saved cit from the vigilante, sk was blocked, don killed doc
        assert!(baseline.contains(&("doc".to_string(), false)));
        assert!(baseline.contains(&("cit".to_string(), true)));
        assert!(baseline.contains(&("vigi".to_string(), true)));
    }

    #[test]
    fn test_departed_target_fails_quietly() {
        let (mut players, mut rx) = four_player_roster();
        set_target(&mut players, "vigi", "ghost");

        let report = classic().resolve(&mut players, &mut [], &mut rng());

        assert!(report.deaths.is_empty());
        assert_eq!(players[3].abilities()[0].uses_left(), Some(2));
        assert!(texts(&mut rx[3]).iter().any(|t| t.contains("no longer here")));
    }

    #[test]
    fn test_plurality_tie_goes_to_first_reached_max() {
        let (mut players, _rx) = roster(&[
            ("don", &catalog::GODFATHER),
            ("goon", &catalog::MAFIOSO),
            ("a", &catalog::CITIZEN),
            ("b", &catalog::CITIZEN),
        ]);
        set_target(&mut players, "goon", "b");
        set_target(&mut players, "don", "a");

        let report = classic().resolve(&mut players, &mut [], &mut rng());

        // the godfather wakes first, so his pick reaches one vote first
        assert_eq!(report.deaths, vec!["a".to_string()]);
    }

    #[test]
    fn test_godfather_immune_and_hidden() {
        let (mut players, mut rx) = roster(&[
            ("don", &catalog::GODFATHER),
            ("sheriff", &catalog::SHERIFF),
            ("vigi", &catalog::VIGILANTE),
        ]);
        set_target(&mut players, "sheriff", "don");
        set_target(&mut players, "vigi", "don");

        let report = classic().resolve(&mut players, &mut [], &mut rng());

        assert!(report.deaths.is_empty());
        assert!(texts(&mut rx[1]).iter().any(|t| t == "don is not suspicious."));
        assert!(texts(&mut rx[2]).iter().any(|t| t.contains("immune")));
    }

    #[test]
    fn test_robber_takes_card_but_keeps_wake_slot() {
        let (mut players, mut rx) = roster(&[
            ("seer", &catalog::SEER),
            ("robber", &catalog::ROBBER),
            ("wolf", &catalog::WEREWOLF),
        ]);
        set_target(&mut players, "robber", "wolf");
        set_target(&mut players, "seer", "robber");

        NightResolver::new(ONE_DAY_PRIORITY, &[]).resolve(&mut players, &mut [], &mut rng());

        // the seer wakes before the robber and sees the original card
        assert!(texts(&mut rx[0]).iter().any(|t| t == "robber is the Robber."));
        assert_eq!(players[1].role().id, RoleId::Werewolf);
        assert_eq!(players[2].role().id, RoleId::Robber);
        assert!(texts(&mut rx[1]).iter().any(|t| t.contains("You are now the Werewolf")));
    }

    #[test]
    fn test_doppelganger_acts_as_copied_role() {
        let (mut players, mut rx) = roster(&[
            ("dopple", &catalog::DOPPELGANGER),
            ("seer", &catalog::SEER),
            ("wolf", &catalog::WEREWOLF),
        ]);
        set_target(&mut players, "dopple", "seer");

        NightResolver::new(ONE_DAY_PRIORITY, &[]).resolve(&mut players, &mut [], &mut rng());

        assert_eq!(players[0].role().id, RoleId::Seer);
        assert_eq!(players[0].action_role().id, RoleId::Seer);
        // the same target is read again by the copied seer ability
        let seen = texts(&mut rx[0]);
        assert!(seen.iter().any(|t| t.contains("copy of the Seer")));
        assert!(seen.iter().any(|t| t == "seer is the Seer."));
    }

    #[test]
    fn test_troublemaker_and_drunk_move_cards() {
        let (mut players, _rx) = roster(&[
            ("tm", &catalog::TROUBLEMAKER),
            ("drunk", &catalog::DRUNK),
            ("wolf", &catalog::WEREWOLF),
            ("tanner", &catalog::TANNER),
        ]);
        players[0].target = Some("wolf".to_string());
        players[0].second_target = Some("tanner".to_string());
        let mut center: Vec<RoleRef> = vec![&catalog::VILLAGER, &catalog::VILLAGER, &catalog::VILLAGER];

        NightResolver::new(ONE_DAY_PRIORITY, &[]).resolve(&mut players, &mut center, &mut rng());

        assert_eq!(players[2].role().id, RoleId::Tanner);
        assert_eq!(players[3].role().id, RoleId::Werewolf);
        assert_eq!(players[1].role().id, RoleId::Villager);
        assert_eq!(center.iter().filter(|r| r.id == RoleId::Drunk).count(), 1);
    }
}

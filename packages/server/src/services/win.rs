//! Win-condition evaluation against the current roster.

use crate::models::color::Color;
use crate::models::player::{alive_count, Player};
use crate::models::role::{Alignment, Passive, WinCondition};
use crate::models::user::Sound;

fn alive_with(players: &[Player], alignment: Alignment) -> usize {
    players
        .iter()
        .filter(|p| p.is_alive() && p.alignment() == alignment)
        .count()
}

/// At least one town member alive and no hostile player left.
pub fn town_wins(players: &[Player]) -> bool {
    alive_with(players, Alignment::Town) > 0 && alive_with(players, Alignment::Hostile) == 0
}

/// At least one hostile alive, and either no town left or a one-on-one.
pub fn hostile_wins(players: &[Player]) -> bool {
    let town = alive_with(players, Alignment::Town);
    let hostile = alive_with(players, Alignment::Hostile);
    hostile > 0 && (town == 0 || (town == 1 && hostile == 1))
}

pub fn last_standing(players: &[Player], index: usize) -> bool {
    players[index].is_alive() && alive_count(players) <= 2
}

fn lycan_in_play(players: &[Player]) -> bool {
    players.iter().any(|p| p.role().has_passive(Passive::Lycan))
}

fn lycan_hanged(players: &[Player]) -> bool {
    players
        .iter()
        .any(|p| p.was_hanged() && p.role().has_passive(Passive::Lycan))
}

fn anyone_hanged(players: &[Player]) -> bool {
    players.iter().any(Player::was_hanged)
}

fn tanner_hanged(players: &[Player]) -> bool {
    players
        .iter()
        .any(|p| p.was_hanged() && p.role().win == WinCondition::Hanged)
}

/// Whether the player at `index` has met the win condition of the role they
/// currently hold.
pub fn player_wins(players: &[Player], index: usize) -> bool {
    let player = &players[index];
    match player.role().win {
        WinCondition::Town => town_wins(players),
        WinCondition::Hostile => hostile_wins(players),
        WinCondition::Survive => player.is_alive(),
        WinCondition::Hanged => player.was_hanged(),
        WinCondition::LastStanding => last_standing(players, index),
        WinCondition::LycanHanged => {
            lycan_hanged(players) || (!lycan_in_play(players) && !anyone_hanged(players))
        }
        WinCondition::NoLycanHanged => {
            lycan_in_play(players) && !lycan_hanged(players) && !tanner_hanged(players)
        }
    }
}

/// Top-level check run after every death: town, hostile or a last-standing
/// neutral ends the game, and so does an empty graveyard of a roster.
pub fn game_over(players: &[Player]) -> bool {
    if players.is_empty() {
        return false;
    }
    if alive_count(players) == 0 || town_wins(players) || hostile_wins(players) {
        return true;
    }
    players.iter().enumerate().any(|(i, p)| {
        p.role().win == WinCondition::LastStanding && last_standing(players, i)
    })
}

/// `(username, won)` for every player, in roster order.
pub fn standings(players: &[Player]) -> Vec<(String, bool)> {
    (0..players.len())
        .map(|i| (players[i].username().to_string(), player_wins(players, i)))
        .collect()
}

/// Reveals every role and tells each player whether they won.
pub fn announce_standings(players: &[Player]) {
    let reveal: Vec<String> = players
        .iter()
        .map(|p| format!("{} was the {}", p.username(), p.role().name))
        .collect();
    let reveal = reveal.join(", ");

    for (player, (_, won)) in players.iter().zip(standings(players)) {
        player.user.send_colored(format!("{}.", reveal), Color::Highlight, None);
        if won {
            player.user.send_colored("You won!", Color::Highlight, None);
        } else {
            player.user.send_colored("You lost.", Color::Danger, None);
        }
        player.user.sound(Sound::Alert);
    }
    log::info!(
        "standings: {:?}",
        standings(players)
            .into_iter()
            .filter(|(_, won)| *won)
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::RoleRef;
    use crate::models::user::User;
    use crate::services::catalog;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn roster(roles: &[RoleRef]) -> Vec<Player> {
        roles
            .iter()
            .enumerate()
            .map(|(i, role)| {
                let (user, _rx) = User::channel(format!("p{}", i), false);
                Player::new(user, Color::Red, role)
            })
            .collect()
    }

    #[test]
    fn test_town_and_hostile_never_win_together() {
        let pool: [RoleRef; 6] = [
            &catalog::CITIZEN,
            &catalog::DOCTOR,
            &catalog::GODFATHER,
            &catalog::MAFIOSO,
            &catalog::SERIAL_KILLER,
            &catalog::JESTER,
        ];
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..2000 {
            let size = rng.gen_range(1..=15);
            let roles: Vec<RoleRef> = (0..size).map(|_| pool[rng.gen_range(0..pool.len())]).collect();
            let mut players = roster(&roles);
            for p in players.iter_mut() {
                if rng.gen_bool(0.5) {
                    p.kill();
                }
            }
            assert!(
                !(town_wins(&players) && hostile_wins(&players)),
                "both sides won with {:?}",
                players
                    .iter()
                    .map(|p| (p.role().name, p.is_alive()))
                    .collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_one_on_one_goes_to_hostile() {
        let mut players = roster(&[&catalog::CITIZEN, &catalog::SHERIFF, &catalog::MAFIOSO]);
        assert!(!game_over(&players));

        players[0].kill();
        assert!(hostile_wins(&players));
        assert!(!town_wins(&players));
        assert!(game_over(&players));
    }

    #[test]
    fn test_serial_killer_ends_game_when_last_standing() {
        let mut players = roster(&[
            &catalog::SERIAL_KILLER,
            &catalog::JESTER,
            &catalog::CITIZEN,
            &catalog::CITIZEN,
        ]);
        players[2].kill();
        players[3].kill();

        assert!(game_over(&players));
        let standings = standings(&players);
        assert!(standings[0].1);
        assert!(!standings[1].1);
    }

    #[test]
    fn test_hanged_jester_wins_even_when_town_does() {
        let mut players = roster(&[&catalog::JESTER, &catalog::CITIZEN, &catalog::MAFIOSO]);
        players[0].hang();
        players[2].hang();

        let standings = standings(&players);
        assert_eq!(standings, vec![
            ("p0".to_string(), true),
            ("p1".to_string(), true),
            ("p2".to_string(), false),
        ]);
    }

    #[test]
    fn test_one_day_lycan_predicates() {
        let mut players = roster(&[&catalog::WEREWOLF, &catalog::SEER, &catalog::MINION, &catalog::TANNER]);
        // nobody hanged: the werewolf team wins
        assert!(!player_wins(&players, 1));
        assert!(player_wins(&players, 2));

        players[3].hang();
        assert!(!player_wins(&players, 0));
        assert!(player_wins(&players, 3));

        players[0].hang();
        assert!(player_wins(&players, 1));
        assert!(!player_wins(&players, 2));
    }

    #[test]
    fn test_village_wins_without_lycan_only_if_nobody_hanged() {
        let mut players = roster(&[&catalog::VILLAGER, &catalog::SEER, &catalog::MINION]);
        assert!(player_wins(&players, 0));
        assert!(!player_wins(&players, 2));

        players[1].hang();
        assert!(!player_wins(&players, 0));
    }
}

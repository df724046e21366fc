use std::time::Duration;

use crate::models::player::{alive_count, find_player, Player, Verdict};
use crate::models::stopwatch::Stopwatch;

/// Votes needed to put someone on trial: a strict majority of the living.
pub fn majority(alive: usize) -> usize {
    alive / 2 + 1
}

/// Nomination counts derived from the living players' current votes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteTally {
    counts: Vec<(String, usize)>,
}

impl VoteTally {
    /// Only living voters count, and only for living targets. Targets are
    /// listed in the order they first received a vote.
    pub fn from_players(players: &[Player]) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for voter in players.iter().filter(|p| p.is_alive()) {
            let Some(target) = voter.vote.as_deref().and_then(|v| find_player(players, v)) else {
                continue;
            };
            if !players[target].is_alive() {
                continue;
            }
            let name = players[target].username();
            match counts.iter_mut().find(|(n, _)| n == name) {
                Some((_, count)) => *count += 1,
                None => counts.push((name.to_string(), 1)),
            }
        }
        Self { counts }
    }

    pub fn count(&self, username: &str) -> usize {
        self.counts
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(username))
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn max(&self) -> usize {
        self.counts.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }

    /// Everyone tied at the top count.
    pub fn leaders(&self) -> Vec<&str> {
        let max = self.max();
        self.counts
            .iter()
            .filter(|(_, c)| max > 0 && *c == max)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// The first target to have reached `threshold` votes.
    pub fn reaching(&self, threshold: usize) -> Option<&str> {
        self.counts
            .iter()
            .find(|(_, c)| *c >= threshold)
            .map(|(n, _)| n.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerdictCount {
    pub guilty: usize,
    pub innocent: usize,
    pub abstain: usize,
}

impl VerdictCount {
    /// Living non-nominees only.
    pub fn from_players(players: &[Player], nominee: &str) -> Self {
        let mut count = Self::default();
        for p in players
            .iter()
            .filter(|p| p.is_alive() && !p.username().eq_ignore_ascii_case(nominee))
        {
            match p.final_vote {
                Verdict::Guilty => count.guilty += 1,
                Verdict::Innocent => count.innocent += 1,
                Verdict::Abstain => count.abstain += 1,
            }
        }
        count
    }

    /// Ties acquit.
    pub fn hangs(&self) -> bool {
        self.guilty > self.innocent
    }
}

/// Per-day trial bookkeeping: the nomination clock that pauses while
/// someone is on the stand, how many trials have been held and who is on
/// trial right now.
#[derive(Debug, Clone, Default)]
pub struct Trial {
    clock: Stopwatch,
    trials_held: u32,
    nominee: Option<String>,
}

impl Trial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_day(&mut self) {
        self.clock.reset();
        self.trials_held = 0;
        self.nominee = None;
    }

    pub fn resume_nomination(&mut self) {
        self.nominee = None;
        self.clock.start();
    }

    pub fn begin(&mut self, nominee: &str) {
        self.clock.stop();
        self.trials_held += 1;
        self.nominee = Some(nominee.to_string());
    }

    pub fn nominee(&self) -> Option<&str> {
        self.nominee.as_deref()
    }

    pub fn trials_held(&self) -> u32 {
        self.trials_held
    }

    pub fn nomination_remaining(&self, length: Duration) -> Duration {
        self.clock.remaining(length)
    }

    /// Whether an acquittal goes back to nominations.
    pub fn can_continue(&self, max_trials: u32, length: Duration) -> bool {
        self.trials_held < max_trials && !self.nomination_remaining(length).is_zero()
    }

    /// The nominee for a trial, if anyone has the votes right now.
    pub fn check_nominations(&self, players: &[Player]) -> Option<String> {
        let tally = VoteTally::from_players(players);
        tally
            .reaching(majority(alive_count(players)))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::color::Color;
    use crate::models::user::User;
    use crate::services::catalog;

    fn town(size: usize) -> Vec<Player> {
        (0..size)
            .map(|i| {
                let (user, _rx) = User::channel(format!("p{}", i), false);
                Player::new(user, Color::Red, &catalog::CITIZEN)
            })
            .collect()
    }

    fn vote(players: &mut [Player], voter: usize, target: usize) {
        let name = players[target].username().to_string();
        players[voter].vote = Some(name);
    }

    #[test]
    fn test_majority_threshold() {
        assert_eq!(majority(1), 1);
        assert_eq!(majority(4), 3);
        assert_eq!(majority(5), 3);
        assert_eq!(majority(7), 4);
    }

    #[test]
    fn test_nomination_needs_exactly_majority_of_living() {
        let mut players = town(7);
        players[6].kill();
        // six alive, so four votes are needed
        for voter in 0..3 {
            vote(&mut players, voter, 5);
        }
        // the dead do not count
        vote(&mut players, 6, 5);

        let trial = Trial::new();
        assert_eq!(trial.check_nominations(&players), None);

        vote(&mut players, 3, 5);
        assert_eq!(trial.check_nominations(&players), Some("p5".to_string()));
    }

    #[test]
    fn test_votes_for_dead_targets_are_ignored() {
        let mut players = town(4);
        vote(&mut players, 0, 3);
        vote(&mut players, 1, 3);
        players[3].kill();

        let tally = VoteTally::from_players(&players);
        assert_eq!(tally.count("p3"), 0);
        assert!(tally.leaders().is_empty());
    }

    #[test]
    fn test_verdict_ties_acquit() {
        let mut players = town(5);
        assert!(!VerdictCount::from_players(&players, "p0").hangs());

        players[1].final_vote = Verdict::Guilty;
        players[2].final_vote = Verdict::Innocent;
        assert!(!VerdictCount::from_players(&players, "p0").hangs());

        players[3].final_vote = Verdict::Guilty;
        // the nominee's own vote is never counted
        players[0].final_vote = Verdict::Innocent;
        let count = VerdictCount::from_players(&players, "p0");
        assert_eq!(count, VerdictCount { guilty: 2, innocent: 1, abstain: 1 });
        assert!(count.hangs());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nomination_clock_pauses_during_trial() {
        let length = Duration::from_secs(60);
        let mut trial = Trial::new();
        trial.resume_nomination();
        tokio::time::advance(Duration::from_secs(20)).await;

        trial.begin("p1");
        tokio::time::advance(Duration::from_secs(40)).await;
        assert_eq!(trial.nomination_remaining(length), Duration::from_secs(40));
        assert!(trial.can_continue(3, length));

        trial.resume_nomination();
        assert_eq!(trial.nominee(), None);
        trial.begin("p2");
        trial.begin("p3");
        assert!(!trial.can_continue(3, length));
    }
}

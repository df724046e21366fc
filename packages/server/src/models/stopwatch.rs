use std::time::Duration;
use tokio::time::Instant;

/// Pausable elapsed-time counter. Every countdown in a session is a
/// `Stopwatch` compared against a fixed length.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    started_at: Option<Instant>,
    banked: Duration,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// Pauses the count, keeping the time elapsed so far.
    pub fn stop(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.banked += started_at.elapsed();
        }
    }

    pub fn reset(&mut self) {
        self.started_at = None;
        self.banked = Duration::ZERO;
    }

    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(started_at) => self.banked + started_at.elapsed(),
            None => self.banked,
        }
    }

    /// Time left before `length` has elapsed, saturating at zero.
    pub fn remaining(&self, length: Duration) -> Duration {
        length.saturating_sub(self.elapsed())
    }
}

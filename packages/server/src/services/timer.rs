use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::models::game::SessionId;

use super::registry::LobbyEvent;

/// Phase transitions a session can schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAlarm {
    CloseSession,
    ResolveNight,
    EndDiscussion,
    EndNomination,
    EndDefense,
    EndVerdict,
    EndDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alarm {
    pub session: SessionId,
    pub generation: u64,
    pub phase: PhaseAlarm,
}

/// Something that can deliver an [`Alarm`] back to the event loop later.
pub trait Scheduler: Send {
    fn schedule(&mut self, alarm: Alarm, after: Duration);
}

/// Sleeps on the runtime, then posts the alarm onto the registry queue so it
/// is serialized with every other inbound event.
#[derive(Clone)]
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<LobbyEvent>,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<LobbyEvent>) -> Self {
        Self { events }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, alarm: Alarm, after: Duration) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if events.send(LobbyEvent::Alarm(alarm)).is_err() {
                log::debug!("event loop gone, dropping {:?}", alarm.phase);
            }
        });
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    phase: PhaseAlarm,
    deadline: Instant,
}

/// The single phase-advance timer of a session.
///
/// Arming bumps the generation, so any alarm scheduled earlier no longer
/// matches and is ignored when it fires.
#[derive(Debug)]
pub struct PhaseTimer {
    session: SessionId,
    generation: u64,
    pending: Option<Pending>,
}

impl PhaseTimer {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            generation: 0,
            pending: None,
        }
    }

    pub fn arm(&mut self, phase: PhaseAlarm, after: Duration, scheduler: &mut dyn Scheduler) {
        self.generation += 1;
        self.pending = Some(Pending {
            phase,
            deadline: Instant::now() + after,
        });
        scheduler.schedule(
            Alarm {
                session: self.session,
                generation: self.generation,
                phase,
            },
            after,
        );
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    /// Accepts an alarm if it is the one currently pending. A matching alarm
    /// can only be accepted once.
    pub fn fire(&mut self, alarm: &Alarm) -> Option<PhaseAlarm> {
        if alarm.session != self.session || alarm.generation != self.generation {
            return None;
        }
        let pending = self.pending.take()?;
        self.generation += 1;
        Some(pending.phase)
    }

    /// Fires the pending phase right now, invalidating its scheduled alarm.
    pub fn skip(&mut self) -> Option<PhaseAlarm> {
        let pending = self.pending.take()?;
        self.generation += 1;
        Some(pending.phase)
    }

    pub fn pending(&self) -> Option<PhaseAlarm> {
        self.pending.map(|p| p.phase)
    }

    pub fn remaining(&self) -> Duration {
        self.pending
            .map(|p| p.deadline.saturating_duration_since(Instant::now()))
            .unwrap_or_default()
    }
}

use tokio::sync::{mpsc, watch};

use crate::models::config::GameConfig;
use crate::models::game::{GameType, SessionId, SessionSummary};
use crate::services::registry::{run_event_loop, LobbyEvent, SessionRegistry};
use crate::utils::config::CONFIG;

/// Handles shared by every request. The registry itself lives in its own
/// task; handlers only talk to it through the event queue and read the
/// latest session listing from the watch channel.
#[derive(Clone)]
pub struct AppState {
    pub events: mpsc::UnboundedSender<LobbyEvent>,
    pub summaries: watch::Receiver<Vec<SessionSummary>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(GameConfig::from_env(), CONFIG.default_game_type)
    }

    /// Spawns the registry task, so this must be called inside a tokio runtime.
    pub fn with_config(config: GameConfig, default_type: GameType) -> Self {
        let (registry, summaries) = SessionRegistry::new(config, default_type);
        let (events, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_event_loop(registry, rx, events.clone()));
        AppState { events, summaries }
    }

    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        self.summaries.borrow().clone()
    }

    pub fn find_session(&self, id: SessionId) -> Option<SessionSummary> {
        self.summaries.borrow().iter().find(|s| s.id == id).cloned()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

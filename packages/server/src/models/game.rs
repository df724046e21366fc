use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type SessionId = Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Classic,
    OneDay,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Classic => write!(f, "classic"),
            GameType::OneDay => write!(f, "oneday"),
        }
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" | "mafia" => Ok(GameType::Classic),
            "oneday" | "one_day" | "onenight" | "werewolf" => Ok(GameType::OneDay),
            other => Err(format!("Unknown game type: {}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Waiting,  // not enough players yet
    Starting, // countdown running
    InPlay,
    EndChat,  // post-game discussion window
    Closed,
}

/// What a variant wants the host to do after handling an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    GameOver,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub name: String,
    pub game_type: GameType,
    pub lifecycle: Lifecycle,
    pub players: Vec<String>,
    pub min_players: usize,
    pub max_players: usize,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}/{} players, {:?}",
            self.name,
            self.game_type,
            self.players.len(),
            self.max_players,
            self.lifecycle
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("This game is full.")]
    SessionFull,
    #[error("This game has already started.")]
    AlreadyInPlay,
    #[error("Someone named {0} is already in this game.")]
    DuplicateUsername(String),
    #[error("This game is closing.")]
    Closing,
}

/// Validation failures of gameplay commands. The message is what the
/// issuing player is told; session state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("There is no player named {0}.")]
    UnknownPlayer(String),
    #[error("{0} is already dead.")]
    TargetDead(String),
    #[error("You cannot target yourself.")]
    SelfTarget,
    #[error("You can only target yourself.")]
    SelfOnly,
    #[error("You cannot do that now.")]
    WrongPhase,
    #[error("The dead cannot do that.")]
    ActorDead,
    #[error("Your role has no night action.")]
    NoNightAction,
    #[error("You have no uses of {0} remaining.")]
    NoUsesRemaining(&'static str),
    #[error("Your role needs two different targets.")]
    NeedsTwoTargets,
    #[error("You cannot vote in this trial.")]
    CannotVote,
    #[error("You cannot talk right now.")]
    CannotTalk,
}

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GameConfig {
    // 状態遷移を評価する間隔
    pub tick: Duration,
    pub start_wait: Duration,
    pub end_chat: Duration,
    pub night: Duration,
    pub discussion: Duration,
    pub nomination: Duration,
    pub defense: Duration,
    pub verdict: Duration,
    pub one_day_discussion: Duration,
    pub max_trials_per_day: u32,
    pub max_deathless_days: u32,
    // 残り時間の警告を出すしきい値
    pub warn_threshold: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        let debug_mode = cfg!(debug_assertions) || env::var("DEBUG_MODE").is_ok();
        if debug_mode {
            Self::debug()
        } else {
            Self::standard()
        }
    }
}

impl GameConfig {
    pub fn standard() -> Self {
        Self {
            tick: Duration::from_secs(1),
            start_wait: Duration::from_secs(30),
            end_chat: Duration::from_secs(30),
            night: Duration::from_secs(30),
            discussion: Duration::from_secs(30),
            nomination: Duration::from_secs(60),
            defense: Duration::from_secs(20),
            verdict: Duration::from_secs(20),
            one_day_discussion: Duration::from_secs(180),
            max_trials_per_day: 3,
            max_deathless_days: 3,
            warn_threshold: Duration::from_secs(10),
        }
    }

    pub fn debug() -> Self {
        Self {
            start_wait: Duration::from_secs(10),
            end_chat: Duration::from_secs(10),
            night: Duration::from_secs(10),
            discussion: Duration::from_secs(5),
            nomination: Duration::from_secs(20),
            defense: Duration::from_secs(5),
            verdict: Duration::from_secs(5),
            one_day_discussion: Duration::from_secs(30),
            warn_threshold: Duration::from_secs(3),
            ..Self::standard()
        }
    }

    pub fn from_env() -> Self {
        let base = match env::var("DEBUG_ENABLED") {
            Ok(v) if v == "true" => Self::debug(),
            Ok(_) => Self::standard(),
            Err(_) => Self::default(),
        };

        Self {
            start_wait: secs_from_env("GAME_START_WAIT_SECONDS").unwrap_or(base.start_wait),
            end_chat: secs_from_env("GAME_END_CHAT_SECONDS").unwrap_or(base.end_chat),
            night: secs_from_env("GAME_NIGHT_SECONDS").unwrap_or(base.night),
            discussion: secs_from_env("GAME_DISCUSSION_SECONDS").unwrap_or(base.discussion),
            nomination: secs_from_env("GAME_NOMINATION_SECONDS").unwrap_or(base.nomination),
            defense: secs_from_env("GAME_DEFENSE_SECONDS").unwrap_or(base.defense),
            verdict: secs_from_env("GAME_VERDICT_SECONDS").unwrap_or(base.verdict),
            one_day_discussion: secs_from_env("GAME_ONE_DAY_DISCUSSION_SECONDS")
                .unwrap_or(base.one_day_discussion),
            max_trials_per_day: env::var("GAME_MAX_TRIALS_PER_DAY")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(base.max_trials_per_day),
            max_deathless_days: env::var("GAME_MAX_DEATHLESS_DAYS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(base.max_deathless_days),
            ..base
        }
    }
}

fn secs_from_env(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::domain::rules::{DEFAULT_PLAYER_COUNT, DEFAULT_SPEECH_TIME_LIMIT_SECS};
use crate::domain::RoleCounts;
use crate::error::AppError;

const DEFAULT_VOTE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_DECISION_RETRIES: u32 = 2;

/// Fixed waits and timeouts used by a running session.
///
/// Pauses only pace the narration; they always complete. The vote timeout
/// bounds autonomous vote collection, the statement timeout bounds a human's
/// final statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub short_pause: Duration,
    pub long_pause: Duration,
    pub vote_timeout: Duration,
    pub statement_timeout: Duration,
}

impl SessionTimings {
    pub fn standard() -> Self {
        Self {
            short_pause: Duration::from_millis(800),
            long_pause: Duration::from_secs(2),
            vote_timeout: Duration::from_secs(DEFAULT_VOTE_TIMEOUT_SECS),
            statement_timeout: Duration::from_secs(DEFAULT_STATEMENT_TIMEOUT_SECS),
        }
    }

    pub fn fast() -> Self {
        Self {
            short_pause: Duration::from_millis(50),
            long_pause: Duration::from_millis(150),
            ..Self::standard()
        }
    }

    /// No pacing at all. Timeouts keep their standard values.
    pub fn instant() -> Self {
        Self {
            short_pause: Duration::ZERO,
            long_pause: Duration::ZERO,
            ..Self::standard()
        }
    }

    pub fn with_vote_timeout(mut self, timeout: Duration) -> Self {
        self.vote_timeout = timeout;
        self
    }

    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    Normal,
    Fast,
    None,
}

impl FromStr for Pacing {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Pacing::Normal),
            "fast" => Ok(Pacing::Fast),
            "none" => Ok(Pacing::None),
            other => Err(AppError::config(format!("unknown pacing '{other}'"))),
        }
    }
}

/// Per-session game settings, shared by every session the process runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameConfig {
    pub player_count: u8,
    pub role_counts: RoleCounts,
    pub speech_time_limit_secs: u64,
    /// Extra attempts after a failed or invalid provider answer.
    pub decision_retries: u32,
    #[serde(skip)]
    pub timings: SessionTimings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: DEFAULT_PLAYER_COUNT,
            role_counts: RoleCounts::default(),
            speech_time_limit_secs: DEFAULT_SPEECH_TIME_LIMIT_SECS,
            decision_retries: DEFAULT_DECISION_RETRIES,
            timings: SessionTimings::standard(),
        }
    }
}

impl GameConfig {
    /// Reads `NIGHTFALL_*` variables on top of the defaults and validates the result.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let player_count = parse_var("NIGHTFALL_PLAYER_COUNT", defaults.player_count)?;
        let role_counts = match env::var("NIGHTFALL_ROLE_COUNTS") {
            Ok(raw) => raw
                .parse::<RoleCounts>()
                .map_err(|e| AppError::config(format!("NIGHTFALL_ROLE_COUNTS: {e}")))?,
            Err(_) => defaults.role_counts,
        };
        let speech_time_limit_secs = parse_var(
            "NIGHTFALL_SPEECH_TIME_LIMIT_SECS",
            defaults.speech_time_limit_secs,
        )?;
        let decision_retries = parse_var("NIGHTFALL_DECISION_RETRIES", defaults.decision_retries)?;

        let pacing = match env::var("NIGHTFALL_PACING") {
            Ok(raw) => raw.parse::<Pacing>()?,
            Err(_) => Pacing::Normal,
        };
        let base = match pacing {
            Pacing::Normal => SessionTimings::standard(),
            Pacing::Fast => SessionTimings::fast(),
            Pacing::None => SessionTimings::instant(),
        };
        let timings = base
            .with_vote_timeout(Duration::from_secs(parse_var(
                "NIGHTFALL_VOTE_TIMEOUT_SECS",
                DEFAULT_VOTE_TIMEOUT_SECS,
            )?))
            .with_statement_timeout(Duration::from_secs(parse_var(
                "NIGHTFALL_STATEMENT_TIMEOUT_SECS",
                DEFAULT_STATEMENT_TIMEOUT_SECS,
            )?));

        let config = Self {
            player_count,
            role_counts,
            speech_time_limit_secs,
            decision_retries,
            timings,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.role_counts
            .validate(self.player_count)
            .map_err(|e| AppError::config(e.to_string()))
    }

    pub fn decision_attempts(&self) -> u32 {
        self.decision_retries.saturating_add(1)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{name} has an invalid value: '{raw}'"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use serial_test::serial;

    use super::*;

    const VARS: &[&str] = &[
        "NIGHTFALL_PLAYER_COUNT",
        "NIGHTFALL_ROLE_COUNTS",
        "NIGHTFALL_SPEECH_TIME_LIMIT_SECS",
        "NIGHTFALL_DECISION_RETRIES",
        "NIGHTFALL_PACING",
        "NIGHTFALL_VOTE_TIMEOUT_SECS",
        "NIGHTFALL_STATEMENT_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn defaults_match_the_classic_table() {
        clear_env();
        let config = GameConfig::from_env().expect("defaults are valid");
        assert_eq!(config.player_count, 7);
        assert_eq!(config.role_counts, RoleCounts::default());
        assert_eq!(config.speech_time_limit_secs, 30);
        assert_eq!(config.decision_attempts(), 3);
        assert_eq!(config.timings.vote_timeout, Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn reads_overrides() {
        clear_env();
        env::set_var("NIGHTFALL_PLAYER_COUNT", "8");
        env::set_var(
            "NIGHTFALL_ROLE_COUNTS",
            "eliminator=2,investigator=1,protector=1,retaliator=1,bystander=3",
        );
        env::set_var("NIGHTFALL_PACING", "none");
        env::set_var("NIGHTFALL_VOTE_TIMEOUT_SECS", "5");

        let config = GameConfig::from_env().expect("valid overrides");
        assert_eq!(config.player_count, 8);
        assert_eq!(config.role_counts.bystander, 3);
        assert_eq!(config.timings.short_pause, Duration::ZERO);
        assert_eq!(config.timings.vote_timeout, Duration::from_secs(5));
        clear_env();
    }

    #[test]
    #[serial]
    fn rejects_counts_that_do_not_fill_the_table() {
        clear_env();
        env::set_var("NIGHTFALL_PLAYER_COUNT", "9");
        let err = GameConfig::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
        clear_env();
    }

    #[test]
    #[serial]
    fn rejects_garbage_numbers() {
        clear_env();
        env::set_var("NIGHTFALL_DECISION_RETRIES", "many");
        assert!(GameConfig::from_env().is_err());
        clear_env();
    }
}

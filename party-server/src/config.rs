use std::env;
use std::str::FromStr;
use std::time::Duration;

use party_core::RoundSettings;
use party_types::GameType;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },

    #[error("unknown game '{0}' in ENABLED_GAMES")]
    UnknownGame(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub round_seconds: u64,
    pub vote_seconds: u64,
    pub win_points: u32,
    pub word_points: u32,
    pub madlibs_submission_cap: usize,
    pub recent_game_window: usize,
    pub enabled_games: Vec<GameType>,
    pub connection_timeout_seconds: u64,
    pub rate_limit_burst: u32,
    pub rate_limit_refill_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            round_seconds: party_core::DEFAULT_ROUND_SECONDS,
            vote_seconds: party_core::DEFAULT_VOTE_SECONDS,
            win_points: party_core::DEFAULT_WIN_POINTS,
            word_points: party_core::DEFAULT_WORD_POINTS,
            madlibs_submission_cap: party_core::DEFAULT_MADLIBS_SUBMISSION_CAP,
            recent_game_window: party_core::DEFAULT_RECENT_GAME_WINDOW,
            enabled_games: GameType::ALL.to_vec(),
            connection_timeout_seconds: 300,
            rate_limit_burst: 30,
            rate_limit_refill_ms: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let config = Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            round_seconds: positive(
                parse_or(&lookup, "ROUND_SECONDS", defaults.round_seconds)?,
                "ROUND_SECONDS",
            )?,
            vote_seconds: positive(
                parse_or(&lookup, "VOTE_SECONDS", defaults.vote_seconds)?,
                "VOTE_SECONDS",
            )?,
            win_points: parse_or(&lookup, "WIN_POINTS", defaults.win_points)?,
            word_points: parse_or(&lookup, "WORD_POINTS", defaults.word_points)?,
            madlibs_submission_cap: positive(
                parse_or(&lookup, "MADLIBS_SUBMISSION_CAP", defaults.madlibs_submission_cap)?,
                "MADLIBS_SUBMISSION_CAP",
            )?,
            recent_game_window: parse_or(
                &lookup,
                "RECENT_GAME_WINDOW",
                defaults.recent_game_window,
            )?,
            enabled_games: match lookup("ENABLED_GAMES") {
                Some(list) => parse_games(&list)?,
                None => defaults.enabled_games,
            },
            connection_timeout_seconds: parse_or(
                &lookup,
                "CONNECTION_TIMEOUT_SECONDS",
                defaults.connection_timeout_seconds,
            )?,
            rate_limit_burst: positive(
                parse_or(&lookup, "RATE_LIMIT_BURST", defaults.rate_limit_burst)?,
                "RATE_LIMIT_BURST",
            )?,
            rate_limit_refill_ms: positive(
                parse_or(&lookup, "RATE_LIMIT_REFILL_MS", defaults.rate_limit_refill_ms)?,
                "RATE_LIMIT_REFILL_MS",
            )?,
        };

        Ok(config)
    }

    pub fn round_settings(&self) -> RoundSettings {
        RoundSettings {
            round_duration: Duration::from_secs(self.round_seconds),
            vote_duration: Duration::from_secs(self.vote_seconds),
            win_points: self.win_points,
            word_points: self.word_points,
            madlibs_submission_cap: self.madlibs_submission_cap,
            recent_window: self.recent_game_window,
            enabled_games: Vec::new(),
        }
        .with_games(&self.enabled_games)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_seconds)
    }

    pub fn rate_limit_refill(&self) -> Duration {
        Duration::from_millis(self.rate_limit_refill_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn positive<T>(value: T, key: &'static str) -> Result<T, ConfigError>
where
    T: PartialEq + Default,
{
    if value == T::default() {
        Err(ConfigError::Zero { key })
    } else {
        Ok(value)
    }
}

/// Comma separated game ids. An empty list enables every game.
fn parse_games(list: &str) -> Result<Vec<GameType>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<GameType>()
                .map_err(|_| ConfigError::UnknownGame(id.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.round_seconds, 30);
        assert_eq!(config.vote_seconds, 30);
        assert_eq!(config.enabled_games.len(), 7);

        let settings = config.round_settings();
        assert_eq!(settings.round_duration, Duration::from_secs(30));
        assert_eq!(settings.win_points, 3);
        assert_eq!(settings.madlibs_submission_cap, 20);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("ROUND_SECONDS", "5"),
            ("ENABLED_GAMES", "madlibs, Imitations,"),
            ("RATE_LIMIT_BURST", "4"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.round_seconds, 5);
        assert_eq!(
            config.enabled_games,
            vec![GameType::MadLibs, GameType::Imitations]
        );
        assert_eq!(config.rate_limit_burst, 4);
        assert_eq!(
            config.round_settings().enabled_games,
            vec![GameType::MadLibs, GameType::Imitations]
        );
    }

    #[test]
    fn test_invalid_values_are_reported() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err(),
            ConfigError::InvalidValue {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[("VOTE_SECONDS", "0")])).unwrap_err(),
            ConfigError::Zero {
                key: "VOTE_SECONDS"
            }
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[("ENABLED_GAMES", "bingo")])).unwrap_err(),
            ConfigError::UnknownGame("bingo".to_string())
        );
    }

    #[test]
    fn test_empty_game_list_enables_all() {
        let config = Config::from_lookup(lookup_from(&[("ENABLED_GAMES", " , ")])).unwrap();
        assert_eq!(config.round_settings().enabled_games.len(), 7);
    }
}

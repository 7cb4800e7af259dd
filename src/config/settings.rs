use anyhow::{Context, Result};
use std::str::FromStr;

use crate::api::DEFAULT_BASE_URL;
use crate::http::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS};
use crate::staleness::DEFAULT_PLAYER_COOLDOWN_DAYS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "production" | "prod" => RunMode::Production,
            _ => RunMode::Development,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, RunMode::Development)
    }
}

#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: "wpt-scraper/0.1".to_string(),
            timeout_secs: 30,
            retries: DEFAULT_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: RunMode,
    pub database_path: String,
    pub snapshot_dir: String,
    pub scraper: ScraperSettings,
    pub player_cooldown_days: i64,
    /// Only keep players scoring at least this much on full listing scrapes
    pub player_min_score: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Development,
            database_path: "wpt.db".to_string(),
            snapshot_dir: "temp".to_string(),
            scraper: ScraperSettings::default(),
            player_cooldown_days: DEFAULT_PLAYER_COOLDOWN_DAYS,
            player_min_score: None,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by the environment, after loading `.env` if present
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let scraper = ScraperSettings::default();

        Ok(Self {
            mode: lookup("APP_ENV")
                .map(|label| RunMode::from_label(&label))
                .unwrap_or(defaults.mode),
            database_path: lookup("DATABASE_PATH").unwrap_or(defaults.database_path),
            snapshot_dir: lookup("SNAPSHOT_DIR").unwrap_or(defaults.snapshot_dir),
            scraper: ScraperSettings {
                base_url: lookup("WPT_BASE_URL").unwrap_or(scraper.base_url),
                user_agent: scraper.user_agent,
                timeout_secs: parse_var(&lookup, "FETCH_TIMEOUT_SECS")?.unwrap_or(scraper.timeout_secs),
                retries: parse_var(&lookup, "FETCH_RETRIES")?.unwrap_or(scraper.retries),
                retry_delay_ms: parse_var(&lookup, "FETCH_RETRY_DELAY_MS")?.unwrap_or(scraper.retry_delay_ms),
            },
            player_cooldown_days: parse_var(&lookup, "PLAYER_COOLDOWN_DAYS")?.unwrap_or(defaults.player_cooldown_days),
            player_min_score: parse_var(&lookup, "PLAYER_MIN_SCORE")?,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.mode, RunMode::Development);
        assert_eq!(config.database_path, "wpt.db");
        assert_eq!(config.scraper.retries, 4);
        assert_eq!(config.scraper.retry_delay_ms, 3000);
        assert_eq!(config.player_cooldown_days, 30);
        assert_eq!(config.player_min_score, None);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("FETCH_RETRIES", "2"),
            ("PLAYER_MIN_SCORE", "1500"),
            ("WPT_BASE_URL", "http://localhost:9000"),
        ]))
        .unwrap();

        assert_eq!(config.mode, RunMode::Production);
        assert_eq!(config.scraper.retries, 2);
        assert_eq!(config.player_min_score, Some(1500));
        assert_eq!(config.scraper.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        assert!(AppConfig::from_lookup(lookup(&[("FETCH_RETRIES", "many")])).is_err());
    }
}

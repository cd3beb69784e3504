//! Client configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development.

use crate::eta::SpeedUnit;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without trailing slash
    pub api_base_url: String,
    /// Timeout applied to every backend request
    pub api_timeout: Duration,
    /// Period of the live tracking poll
    pub poll_interval: Duration,
    /// Unit the backend reports bus speed in
    pub speed_unit: SpeedUnit,
    /// Directory backing the secure session store
    pub session_dir: PathBuf,

    // --- Optional credentials for the headless binary ---
    pub login_email: Option<String>,
    pub login_password: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            api_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            speed_unit: SpeedUnit::KilometersPerHour,
            session_dir: PathBuf::from(".bus-tracker"),
            login_email: None,
            login_password: None,
        }
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_SECS: u64 = 10;

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let speed_unit = match env::var("SPEED_UNIT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("SPEED_UNIT", raw))?,
            Err(_) => SpeedUnit::KilometersPerHour,
        };

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("API_BASE_URL"))?,
            api_timeout: Duration::from_secs(secs_from_env(
                "API_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            poll_interval: Duration::from_secs(secs_from_env(
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_SECS,
            )),
            speed_unit,
            session_dir: env::var("SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".bus-tracker")),
            login_email: env::var("LOGIN_EMAIL").ok().filter(|v| !v.is_empty()),
            login_password: env::var("LOGIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        })
    }
}

/// Read a positive number of seconds, falling back on absent or bad values.
fn secs_from_env(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("API_BASE_URL", "http://10.0.0.5:8000/");
        env::set_var("API_TIMEOUT_SECS", "not-a-number");
        env::set_var("POLL_INTERVAL_SECS", "5");
        env::set_var("SPEED_UNIT", "mps");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "http://10.0.0.5:8000");
        assert_eq!(config.api_timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.speed_unit, SpeedUnit::MetersPerSecond);
    }
}

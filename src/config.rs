use std::{fs, io, net::SocketAddr, path::Path};

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::Duration;

use crate::service::notice::{Messages, DEFAULT_CHECKOUT_MESSAGE, DEFAULT_NOTICE_MESSAGE};

pub const CONFIG_PATH_ENV: &str = "RESTAURANT_SCHEDULE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] io::Error),
    #[error("could not deserialize config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown time zone '{0}'")]
    Timezone(String),
    #[error("invalid bind address '{0}'")]
    Address(String),
}

fn default_bind_address() -> String {
    "127.0.0.1:7878".to_string()
}

fn default_database_path() -> String {
    "data.db".to_string()
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

fn default_nonce_lifetime_secs() -> u64 {
    24 * 60 * 60
}

fn default_notice_message() -> String {
    DEFAULT_NOTICE_MESSAGE.to_string()
}

fn default_checkout_message() -> String {
    DEFAULT_CHECKOUT_MESSAGE.to_string()
}

/// Service settings, read from a JSON file. Every field is optional.
///
/// Without an `admin_token` the admin endpoints refuse every request.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// IANA name of the restaurant's local time zone.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub admin_token: Option<String>,
    #[serde(default = "default_nonce_lifetime_secs")]
    pub nonce_lifetime_secs: u64,
    #[serde(default = "default_notice_message")]
    pub notice_message: String,
    #[serde(default = "default_checkout_message")]
    pub checkout_message: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            database_path: default_database_path(),
            timezone: default_timezone(),
            admin_token: None,
            nonce_lifetime_secs: default_nonce_lifetime_secs(),
            notice_message: default_notice_message(),
            checkout_message: default_checkout_message(),
        }
    }
}

impl Config {
    pub fn from_config(config: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(config)?)
    }

    /// Reads the file at `path`. `Ok(None)` when there is no such file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        match fs::read_to_string(path) {
            Ok(config) => Ok(Some(Self::from_config(&config)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::Timezone(self.timezone.clone()))
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address
            .parse()
            .map_err(|_| ConfigError::Address(self.bind_address.clone()))
    }

    pub fn nonce_lifetime(&self) -> Duration {
        Duration::from_secs(self.nonce_lifetime_secs)
    }

    pub fn messages(&self) -> Messages {
        Messages {
            notice: self.notice_message.clone(),
            checkout: self.checkout_message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = Config::from_config("{}").unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:7878");
        assert_eq!(config.database_path, "data.db");
        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::London);
        assert_eq!(config.admin_token, None);
        assert_eq!(config.nonce_lifetime(), Duration::from_secs(86400));
        assert_eq!(config.messages().notice, DEFAULT_NOTICE_MESSAGE);
    }

    #[test]
    fn reads_every_field() {
        let config = Config::from_config(
            r#"{
                "bind_address": "0.0.0.0:8080",
                "database_path": "/var/lib/schedule.db",
                "timezone": "America/New_York",
                "admin_token": "secret",
                "nonce_lifetime_secs": 600,
                "notice_message": "Closed",
                "checkout_message": "No orders now"
            }"#,
        )
        .unwrap();
        assert_eq!(config.bind_address().unwrap().port(), 8080);
        assert_eq!(config.timezone().unwrap(), chrono_tz::America::New_York);
        assert_eq!(config.admin_token.as_deref(), Some("secret"));
        assert_eq!(config.nonce_lifetime(), Duration::from_secs(600));
        assert_eq!(config.messages().checkout, "No orders now");
    }

    #[test]
    fn rejects_bad_values() {
        let config = Config::from_config(r#"{"timezone": "Mars/Olympus", "bind_address": "nowhere"}"#).unwrap();
        assert!(matches!(config.timezone(), Err(ConfigError::Timezone(_))));
        assert!(matches!(config.bind_address(), Err(ConfigError::Address(_))));
        assert!(matches!(Config::from_config("[1, 2]"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        assert!(Config::from_file("/nonexistent/restaurant-schedule.json").unwrap().is_none());
    }
}

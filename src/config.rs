use std::time::Duration;

use thiserror::Error;

use crate::relay::RelayConfig;

const DEFAULT_DATABASE_URL: &str = "sqlite://newday_platform.db";
const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Process configuration, read once at startup.
///
/// | Env var              | Default                                |
/// |----------------------|----------------------------------------|
/// | `DATABASE_URL`       | `sqlite://newday_platform.db`          |
/// | `HOST`               | `127.0.0.1`                            |
/// | `PORT`               | `8001`                                 |
/// | `ALLOWED_ORIGINS`    | empty                                  |
/// | `N8N_WEBHOOK_URL`    | unset                                  |
/// | `N8N_API_KEY`        | unset                                  |
/// | `RELAY_TIMEOUT_SECS` | `30`                                   |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub relay: RelayConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "port number",
                value,
            })?,
            None => 8001,
        };

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let timeout_secs = match lookup("RELAY_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "RELAY_TIMEOUT_SECS",
                expected: "number of seconds",
                value,
            })?,
            None => DEFAULT_RELAY_TIMEOUT_SECS,
        };

        let relay = RelayConfig {
            webhook_url: non_empty(lookup("N8N_WEBHOOK_URL")),
            api_key: non_empty(lookup("N8N_API_KEY")),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            database_url,
            host,
            port,
            allowed_origins,
            relay,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

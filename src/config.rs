// Application configuration
// Read from the process environment after `.env` has been loaded

use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Runtime configuration for the relay
#[derive(Debug)]
pub struct AppConfig {
    /// Base URL of the hosted auth project, e.g. `https://xyz.supabase.co`
    pub supabase_url: String,
    /// API key sent with every provider call
    pub supabase_key: SecretString,
    pub bind_addr: SocketAddr,
    /// Upper bound for a single provider call
    pub provider_timeout: Duration,
}

impl AppConfig {
    /// Loads configuration from environment variables
    ///
    /// # Variables
    /// * `SUPABASE_URL` - required
    /// * `SUPABASE_KEY` - required
    /// * `HOST` - defaults to `0.0.0.0`
    /// * `PORT` - defaults to `3000`
    /// * `PROVIDER_TIMEOUT_SECS` - defaults to `10`, must be positive
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let supabase_url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        let supabase_key = SecretString::from(required("SUPABASE_KEY")?);

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "HOST",
                reason: e.to_string(),
            })?;

        let timeout_secs = match lookup("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        name: "PROVIDER_TIMEOUT_SECS",
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Ok(secs) => secs,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "PROVIDER_TIMEOUT_SECS",
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };

        Ok(Self {
            supabase_url,
            supabase_key,
            bind_addr,
            provider_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

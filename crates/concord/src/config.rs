//! Provider process configuration.
//!
//! Layered the usual way: an optional TOML file under the user config
//! directory, `CONCORD_*` environment variables on top, and the
//! conventional `DISCORD_TOKEN` variable as the token of last resort.
//! `.env` files are honored via dotenvy.

use concord_error::{ConcordResult, ConfigError};
use concord_transport::RestConfig;
use derive_getters::Getters;
use serde::Deserialize;
use std::time::Duration;

fn default_socket_path() -> String {
    "/tmp/concord.sock".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    5
}

/// Settings for the provider binary.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct ProviderConfig {
    /// Bot token; may also arrive later in a Configure frame.
    #[serde(default)]
    token: Option<String>,
    /// Application client id; accepted for compatibility, the token is
    /// what authenticates.
    #[serde(default)]
    client_id: Option<String>,
    /// Application client secret; accepted for compatibility.
    #[serde(default)]
    client_secret: Option<String>,
    /// Unix socket the plugin endpoint binds.
    #[serde(default = "default_socket_path")]
    socket_path: String,
    /// Optional user-agent override.
    #[serde(default)]
    user_agent: Option<String>,
    /// Per-request deadline in seconds.
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
    /// Retry budget per request.
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,
}

impl ProviderConfig {
    /// Load from the config file, the environment, and `.env`.
    pub fn load() -> ConcordResult<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(dir) = dirs::config_dir() {
            let file = dir.join("concord").join("config.toml");
            builder = builder.add_source(config::File::from(file).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix("CONCORD"));

        let mut settings: ProviderConfig = builder
            .build()
            .map_err(|e| ConfigError::new(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(e.to_string()))?;

        if settings.token.is_none() {
            settings.token = std::env::var("DISCORD_TOKEN").ok();
        }
        if settings.client_id.is_none() {
            settings.client_id = std::env::var("DISCORD_CLIENT_ID").ok();
        }
        if settings.client_secret.is_none() {
            settings.client_secret = std::env::var("DISCORD_CLIENT_SECRET").ok();
        }
        Ok(settings)
    }

    /// Build the transport config, requiring a token.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when no token is configured.
    pub fn rest_config(&self) -> ConcordResult<RestConfig> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ConfigError::new("no bot token: set DISCORD_TOKEN or CONCORD_TOKEN"))?;
        let mut builder = RestConfig::builder();
        builder
            .token(token)
            .request_timeout(Duration::from_secs(self.timeout_seconds))
            .max_attempts(self.max_attempts);
        if let Some(user_agent) = &self.user_agent {
            builder.user_agent(user_agent.clone());
        }
        builder
            .build()
            .map_err(|e| ConfigError::new(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply() {
        let settings: ProviderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.socket_path(), "/tmp/concord.sock");
        assert_eq!(*settings.timeout_seconds(), 60);
        assert_eq!(*settings.max_attempts(), 5);
        assert!(settings.token().is_none());
    }

    #[test]
    fn test_rest_config_requires_token() {
        let settings: ProviderConfig = serde_json::from_str("{}").unwrap();
        assert!(settings.rest_config().is_err());

        let settings: ProviderConfig =
            serde_json::from_str(r#"{"token": "abc", "timeout_seconds": 5}"#).unwrap();
        let rest = settings.rest_config().unwrap();
        assert_eq!(rest.request_timeout(), &Duration::from_secs(5));
    }
}

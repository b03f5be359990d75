//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Chat policy configuration.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Moderation policy configuration.
    #[serde(default)]
    pub moderation: ModerationConfig,
    /// Access token configuration.
    pub access_token: AccessTokenConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Chat message policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Maximum message length in characters (measured after sanitization).
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Phrases that cause outright rejection of a message.
    #[serde(default)]
    pub blocked_phrases: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: default_max_message_length(),
            blocked_phrases: Vec::new(),
        }
    }
}

/// Moderation policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Mute duration applied when a moderator gives none.
    #[serde(default = "default_mute_minutes")]
    pub default_mute_minutes: i64,
    /// Interval between expired-restriction sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            default_mute_minutes: default_mute_minutes(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Access token (media-room credential) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenConfig {
    /// HMAC signing secret for issued tokens.
    pub signing_secret: String,
    /// Token lifetime; fixed regardless of stream duration.
    #[serde(default = "default_token_ttl_hours")]
    pub ttl_hours: i64,
}

const fn default_max_message_length() -> usize {
    500
}

const fn default_mute_minutes() -> i64 {
    60
}

const fn default_sweep_interval_secs() -> u64 {
    60
}

const fn default_token_ttl_hours() -> i64 {
    24
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `STREAMGATE_ENV`)
    /// 3. Environment variables with `STREAMGATE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("STREAMGATE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("STREAMGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("STREAMGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

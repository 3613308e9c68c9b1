//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::time::Duration;
use typing_core::{RoomId, UserId};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub typing: TypingConfig,
    pub sync: SyncConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Typing timeout policy applied at the REST boundary
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TypingConfig {
    /// Upper bound for client-supplied timeouts (ms)
    #[serde(default = "default_max_typing_timeout")]
    pub max_timeout_ms: u64,
}

impl TypingConfig {
    /// Clamp a client-supplied timeout to the configured maximum
    #[must_use]
    pub fn clamp_timeout(&self, timeout_ms: u64) -> u64 {
        timeout_ms.min(self.max_timeout_ms)
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            max_timeout_ms: default_max_typing_timeout(),
        }
    }
}

/// Long-poll settings for the sync endpoint
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SyncConfig {
    /// Longest a sync request may wait for new typing events (ms)
    #[serde(default = "default_sync_max_wait")]
    pub max_wait_ms: u64,
    /// Events returned when the client gives no limit
    #[serde(default = "default_sync_limit")]
    pub default_limit: usize,
}

impl SyncConfig {
    /// Longest a sync request may wait
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: default_sync_max_wait(),
            default_limit: default_sync_limit(),
        }
    }
}

/// Access token seeded into the in-memory authenticator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedToken {
    pub token: String,
    pub user_id: UserId,
    #[serde(default)]
    pub is_guest: bool,
}

/// Identities and room memberships loaded at startup
///
/// Authentication and membership live outside the typing engine; the binary
/// ships in-memory stand-ins that are filled from this section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub tokens: Vec<SeedToken>,
    #[serde(default)]
    pub rooms: Vec<(RoomId, Vec<UserId>)>,
}

impl SeedConfig {
    /// Parse `token=@user:server[:guest]` entries separated by commas
    pub fn parse_tokens(raw: &str) -> Result<Vec<SeedToken>, ConfigError> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|entry| {
                let (token, rest) = entry
                    .split_once('=')
                    .ok_or_else(|| ConfigError::InvalidValue("AUTH_TOKENS", entry.to_string()))?;
                let (user, is_guest) = match rest.strip_suffix(":guest") {
                    Some(user) => (user, true),
                    None => (rest, false),
                };
                let user_id = UserId::parse(user)
                    .map_err(|e| ConfigError::InvalidValue("AUTH_TOKENS", format!("{entry}: {e}")))?;
                if token.is_empty() {
                    return Err(ConfigError::InvalidValue("AUTH_TOKENS", entry.to_string()));
                }
                Ok(SeedToken {
                    token: token.to_string(),
                    user_id,
                    is_guest,
                })
            })
            .collect()
    }

    /// Parse `!room=@a,@b;!room2=@c` entries
    pub fn parse_rooms(raw: &str) -> Result<Vec<(RoomId, Vec<UserId>)>, ConfigError> {
        raw.split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|entry| {
                let (room, members) = entry
                    .split_once('=')
                    .ok_or_else(|| ConfigError::InvalidValue("ROOM_MEMBERS", entry.to_string()))?;
                let room_id = RoomId::parse(room.trim())
                    .map_err(|e| ConfigError::InvalidValue("ROOM_MEMBERS", format!("{entry}: {e}")))?;
                let members = members
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|m| {
                        UserId::parse(m).map_err(|e| {
                            ConfigError::InvalidValue("ROOM_MEMBERS", format!("{m}: {e}"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((room_id, members))
            })
            .collect()
    }
}

// Default value functions
fn default_app_name() -> String {
    "typing-stream".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8008
}

fn default_max_typing_timeout() -> u64 {
    120_000 // 2 minutes
}

fn default_sync_max_wait() -> u64 {
    30_000
}

fn default_sync_limit() -> usize {
    100
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("API_PORT")?.unwrap_or_else(default_port),
            },
            typing: TypingConfig {
                max_timeout_ms: parse_var("TYPING_MAX_TIMEOUT_MS")?
                    .unwrap_or_else(default_max_typing_timeout),
            },
            sync: SyncConfig {
                max_wait_ms: parse_var("SYNC_MAX_WAIT_MS")?.unwrap_or_else(default_sync_max_wait),
                default_limit: parse_var("SYNC_DEFAULT_LIMIT")?.unwrap_or_else(default_sync_limit),
            },
            seed: SeedConfig {
                tokens: env::var("AUTH_TOKENS")
                    .map(|raw| SeedConfig::parse_tokens(&raw))
                    .unwrap_or_else(|_| Ok(Vec::new()))?,
                rooms: env::var("ROOM_MEMBERS")
                    .map(|raw| SeedConfig::parse_rooms(&raw))
                    .unwrap_or_else(|_| Ok(Vec::new()))?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Configuration with defaults for every section and nothing seeded
    #[must_use]
    pub fn local() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: default_env(),
            },
            api: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            typing: TypingConfig::default(),
            sync: SyncConfig::default(),
            seed: SeedConfig::default(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.typing.max_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "TYPING_MAX_TIMEOUT_MS",
                "must be greater than zero".to_string(),
            ));
        }
        if self.sync.default_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "SYNC_DEFAULT_LIMIT",
                "must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

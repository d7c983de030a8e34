use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod manager;

pub use manager::ConfigManager;

/// Token environment override; takes precedence over the stored token.
pub const TOKEN_ENV_VAR: &str = "GLSWEEP_TOKEN";

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub remote: RemoteConfig,
    pub sweep: SweepConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RemoteConfig {
    /// Hosting base URL, e.g. `https://gitlab.com`.
    pub base_url: String,
    /// API token; may stay empty when `GLSWEEP_TOKEN` is set.
    pub token: String,
    /// Default project path or numeric id.
    pub project: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SweepConfig {
    /// Prefix prepended to a branch name when archiving.
    pub archive_prefix: String,
    /// Default target branch for merge classification.
    pub default_target: Option<String>,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::Io(error)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Json(error)
    }
}

impl Config {
    pub fn load_or_create() -> Result<Self> {
        ConfigManager::load_or_create()
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.remote.base_url)
            .map_err(|e| ConfigError::Validation(format!("invalid base URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "base URL must be http(s), got '{}'",
                url.scheme()
            )));
        }

        let prefix = &self.sweep.archive_prefix;
        if prefix.is_empty() {
            return Err(ConfigError::Validation(
                "archive prefix must not be empty".to_string(),
            ));
        }
        if prefix.starts_with('/') || prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "archive prefix '{}' must not start with '/' or contain whitespace",
                prefix
            )));
        }

        Ok(())
    }

    /// The token to authenticate with, preferring the environment override.
    pub fn resolve_token(&self) -> crate::utils::Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.is_empty() {
                return Ok(token);
            }
        }
        if self.remote.token.is_empty() {
            return Err(crate::utils::SweepError::config_error(format!(
                "no API token configured; run 'glsweep config' or set {}",
                TOKEN_ENV_VAR
            )));
        }
        Ok(self.remote.token.clone())
    }

    pub fn archive_prefix(&self) -> &str {
        &self.sweep.archive_prefix
    }

    pub fn default_target(&self) -> Option<&str> {
        self.sweep.default_target.as_deref()
    }
}

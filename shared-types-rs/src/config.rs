// shared-types-rs/src/config.rs
// Centralized configuration loader for the PhotoNotes admin services

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static PHOTONOTES_CONFIG: OnceCell<Arc<PhotoNotesConfig>> = OnceCell::new();

const DEFAULT_CONFIG_PATH: &str = "./config/photonotes.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration not initialized")]
    NotInitialized,

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PhotoNotesConfig {
    pub project: ProjectConfig,
    pub functions: FunctionsConfig,
    pub auth: AuthConfig,
    pub bootstrap: BootstrapConfig,
    pub logging: LoggingConfig,
}

/// Opaque tenant parameters addressing the identity provider and document store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub project_id: String,
    pub auth_domain: Option<String>,
    pub api_key: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_id: "photonotes-dev".to_string(),
            auth_domain: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FunctionsConfig {
    /// Base URL of the callable functions; unset leaves the console uninitialized.
    pub url: Option<String>,
    pub port: u16,
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self { url: None, port: 5001 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: 3600,
        }
    }
}

/// First-admin bootstrap switch; off unless explicitly enabled.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl PhotoNotesConfig {
    /// Load configuration once per process.
    ///
    /// Reads `.env`, then the TOML file named by `PHOTONOTES_CONFIG_PATH`
    /// (defaults apply when the default path does not exist), then applies
    /// environment overrides.
    pub fn load() -> Result<Arc<PhotoNotesConfig>, ConfigError> {
        if let Some(config) = PHOTONOTES_CONFIG.get() {
            return Ok(Arc::clone(config));
        }

        dotenv::dotenv().ok();

        let explicit = env::var("PHOTONOTES_CONFIG_PATH").ok();
        let config_path = explicit
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let path = PathBuf::from(&config_path);

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else if explicit.is_some() {
            return Err(ConfigError::FileNotFound(config_path));
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path);
            PhotoNotesConfig::default()
        };
        config.apply_env_overrides()?;

        let config_arc = Arc::new(config);
        match PHOTONOTES_CONFIG.set(Arc::clone(&config_arc)) {
            Ok(()) => Ok(config_arc),
            // Another caller won the race; hand out its instance.
            Err(_) => Self::get(),
        }
    }

    /// Get the global configuration instance
    pub fn get() -> Result<Arc<PhotoNotesConfig>, ConfigError> {
        PHOTONOTES_CONFIG
            .get()
            .map(Arc::clone)
            .ok_or(ConfigError::NotInitialized)
    }

    /// Parse a TOML configuration file without touching the global instance.
    pub fn from_file(path: &Path) -> Result<PhotoNotesConfig, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<PhotoNotesConfig, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply `PHOTONOTES_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(project_id) = env::var("PHOTONOTES_PROJECT_ID") {
            self.project.project_id = project_id;
        }
        if let Ok(url) = env::var("PHOTONOTES_FUNCTIONS_URL") {
            self.functions.url = Some(url);
        }
        if let Ok(secret) = env::var("PHOTONOTES_JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        if let Ok(ttl) = env::var("PHOTONOTES_TOKEN_TTL_SECS") {
            self.auth.token_ttl_secs = ttl
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("PHOTONOTES_TOKEN_TTL_SECS={}", ttl)))?;
        }
        if let Ok(enabled) = env::var("PHOTONOTES_BOOTSTRAP_ENABLED") {
            self.bootstrap.enabled = matches!(enabled.as_str(), "1" | "true" | "yes");
        }
        if let Ok(level) = env::var("PHOTONOTES_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }
}

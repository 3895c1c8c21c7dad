//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not fatal: a warning is logged and defaults are
//! used. A TOML file that exists but does not parse is a configuration error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "MIXWHEEL_CONFIG";
pub const BIND_ADDRESS_ENV: &str = "MIXWHEEL_BIND_ADDRESS";
pub const PORT_ENV: &str = "MIXWHEEL_PORT";
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";
pub const REDIRECT_URI_ENV: &str = "SPOTIFY_CALLBACK_URL";

/// Longest accepted session idle timeout (one week)
pub const MAX_SESSION_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level; `RUST_LOG` still overrides it
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// On-disk configuration; every field optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    /// OAuth client id registered with the catalog service
    pub client_id: Option<String>,
    /// OAuth redirect URI, must point at `/auth/callback`
    pub redirect_uri: Option<String>,
    pub api_base_url: Option<String>,
    pub accounts_url: Option<String>,
    pub session_ttl_minutes: Option<i64>,
    pub logging: LoggingConfig,
}

/// Compiled fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub bind_address: String,
    pub port: u16,
    pub api_base_url: String,
    pub accounts_url: String,
    pub session_ttl_minutes: i64,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3001,
            api_base_url: "https://api.spotify.com/v1".to_string(),
            accounts_url: "https://accounts.spotify.com/authorize".to_string(),
            session_ttl_minutes: 60,
            log_level: "info".to_string(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
}

/// Fully resolved service settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_address: String,
    pub port: u16,
    pub client_id: String,
    pub redirect_uri: String,
    pub api_base_url: String,
    pub accounts_url: String,
    pub session_ttl_minutes: i64,
    pub log_level: String,
}

impl Settings {
    /// Resolve settings from CLI, environment, TOML file and defaults
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let toml_config = match config_file_path(cli.config_path.as_deref()) {
            Some(path) => load_toml_config(&path)?,
            None => {
                warn!("No config file location available, using defaults");
                TomlConfig::default()
            }
        };
        Self::from_sources(cli, &toml_config)
    }

    /// Resolve against an already-loaded TOML config
    pub fn from_sources(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::default();

        let bind_address = cli
            .bind_address
            .clone()
            .or_else(|| env_value(BIND_ADDRESS_ENV))
            .or_else(|| toml_config.bind_address.clone())
            .unwrap_or(defaults.bind_address);

        let port = match cli.port {
            Some(port) => port,
            None => match env_value(PORT_ENV) {
                Some(raw) => raw.parse::<u16>().map_err(|_| {
                    Error::Config(format!("{} is not a valid port: {}", PORT_ENV, raw))
                })?,
                None => toml_config.port.unwrap_or(defaults.port),
            },
        };

        let client_id = cli
            .client_id
            .clone()
            .or_else(|| env_value(CLIENT_ID_ENV))
            .or_else(|| toml_config.client_id.clone())
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "Catalog client id not configured. Set it with one of:\n\
                     1. Command line: --client-id <id>\n\
                     2. Environment: {}=<id>\n\
                     3. TOML config: client_id = \"<id>\"",
                    CLIENT_ID_ENV
                ))
            })?;

        let redirect_uri = cli
            .redirect_uri
            .clone()
            .or_else(|| env_value(REDIRECT_URI_ENV))
            .or_else(|| toml_config.redirect_uri.clone())
            .unwrap_or_else(|| format!("http://{}:{}/auth/callback", bind_address, port));

        let session_ttl_minutes = toml_config
            .session_ttl_minutes
            .unwrap_or(defaults.session_ttl_minutes);
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&session_ttl_minutes) {
            return Err(Error::Config(format!(
                "session_ttl_minutes must be between 1 and {}, got {}",
                MAX_SESSION_TTL_MINUTES, session_ttl_minutes
            )));
        }

        Ok(Self {
            bind_address,
            port,
            client_id,
            redirect_uri,
            api_base_url: toml_config
                .api_base_url
                .clone()
                .unwrap_or(defaults.api_base_url),
            accounts_url: toml_config
                .accounts_url
                .clone()
                .unwrap_or(defaults.accounts_url),
            session_ttl_minutes,
            log_level: toml_config.logging.level.clone(),
        })
    }

    /// "host:port" for binding the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Locate the config file: CLI path, then `MIXWHEEL_CONFIG`, then the
/// platform config directory (`~/.config/mixwheel/config.toml` on Linux)
pub fn config_file_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_value(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("mixwheel").join("config.toml"))
}

/// Load a TOML config file
///
/// A missing file yields defaults with a warning.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

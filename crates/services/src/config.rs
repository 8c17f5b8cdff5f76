//! Client configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `CAMPUS_*` environment variables, then command-line overrides.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5135/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "CAMPUS_API_URL";
pub const ENV_TOKEN: &str = "CAMPUS_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "CAMPUS_TIMEOUT_SECS";

const CONFIG_DIR_NAME: &str = "campus";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the REST API, e.g. `http://localhost:5135/api`.
    pub base_url: String,
    /// Bearer token (JWT) for user-scoped requests.
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Command-line overrides; `None` keeps the resolved value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// `<config_dir>/campus/config.toml`, if the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for invalid TOML and
    /// `ConfigError::InvalidTimeout` for a zero timeout.
    pub fn from_toml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                var: "timeout_secs",
                value: "0".to_owned(),
            });
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw, path)
    }

    /// Defaults overlaid with the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTimeout` for a malformed timeout variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|key| env::var(key).ok())
    }

    /// Overlay `CAMPUS_*` variables read through `lookup`. Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTimeout` if `CAMPUS_TIMEOUT_SECS` is not a
    /// positive integer.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = read(ENV_API_URL) {
            self.base_url = base_url.trim().to_owned();
        }
        if let Some(token) = read(ENV_TOKEN) {
            self.token = Some(token.trim().to_owned());
        }
        if let Some(raw) = read(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout {
                    var: ENV_TIMEOUT_SECS,
                    value: raw,
                })?;
        }
        Ok(self)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(base_url) = &overrides.base_url {
            self.base_url.clone_from(base_url);
        }
        if let Some(token) = &overrides.token {
            self.token = Some(token.clone());
        }
        if let Some(secs) = overrides.timeout_secs.filter(|secs| *secs > 0) {
            self.timeout_secs = secs;
        }
    }

    /// Resolve defaults, file and environment.
    ///
    /// An explicit `path` must exist; the default location is optional.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a config file is unreadable or invalid, or an
    /// environment variable is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        base.apply_env(|key| env::var(key).ok())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

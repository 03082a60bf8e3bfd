//! Client configuration: defaults, then an optional TOML file, then
//! `ADMINLIST_*` environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use adminlist_core::ConfigError;
use adminlist_observability::LogFormat;
use serde::{Deserialize, Serialize};

use crate::pipeline::{DEFAULT_PAGE_SIZE, SearchOptions};

pub const CONFIG_PATH_ENV: &str = "ADMINLIST_CONFIG";
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    /// SQLite file for the cache and saved filters; the OS data directory
    /// when unset.
    pub cache_db_path: Option<PathBuf>,
    pub log_format: LogFormat,
    pub search: SearchOptions,
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            cache_db_path: None,
            log_format: LogFormat::default(),
            search: SearchOptions::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match non_empty(lookup(CONFIG_PATH_ENV)) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env_overrides_from(lookup)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&contents).map_err(|reason| ConfigError::Parse {
            path: path.display().to_string(),
            reason,
        })
    }

    fn from_toml(contents: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;
        if config.page_size == 0 {
            return Err("page_size must be at least 1".to_string());
        }
        Ok(config)
    }

    pub fn apply_env_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = non_empty(lookup("ADMINLIST_API_URL")) {
            self.api_url = url;
        }
        if let Some(token) = non_empty(lookup("ADMINLIST_AUTH_TOKEN")) {
            self.auth_token = Some(token);
        }
        if let Some(path) = non_empty(lookup("ADMINLIST_CACHE_DB")) {
            self.cache_db_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = non_empty(lookup("ADMINLIST_LOG_FORMAT")) {
            self.log_format = raw
                .parse()
                .map_err(|_| invalid("ADMINLIST_LOG_FORMAT", &raw))?;
        }
        if let Some(raw) = non_empty(lookup("ADMINLIST_DEBOUNCE_MS")) {
            self.search.debounce_ms = raw
                .parse()
                .map_err(|_| invalid("ADMINLIST_DEBOUNCE_MS", &raw))?;
        }
        if let Some(raw) = non_empty(lookup("ADMINLIST_PAGE_SIZE")) {
            self.page_size = raw
                .parse::<usize>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| invalid("ADMINLIST_PAGE_SIZE", &raw))?;
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

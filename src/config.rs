use nutrisync_core::{ReadPolicy, WaterSyncPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
    Flag,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
            ConfigSource::Flag => write!(f, "flag"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Remote store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Remote database URL (e.g. "sqlite:///srv/nutrisync/remote.db")
    pub database_url: Option<String>,
    /// Upper bound on each remote call, in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            timeout_secs: 5,
        }
    }
}

impl RemoteConfig {
    pub fn is_configured(&self) -> bool {
        self.database_url.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Sync behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub read_policy: ReadPolicy,
    pub water_policy: WaterSyncPolicy,
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the local cache database
    pub cache_path: ConfigValue<PathBuf>,
    /// Signed-in user; unset means local-only
    pub user_id: ConfigValue<Option<String>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    cache_path: Option<PathBuf>,
    user_id: Option<String>,
    remote: Option<RemoteConfig>,
    sync: Option<SyncConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut cache_path = ConfigValue::new(
            Self::default_data_dir().join("cache.db"),
            ConfigSource::Default,
        );
        let mut user_id = ConfigValue::new(None, ConfigSource::Default);
        let mut config_file = None;
        let mut remote = RemoteConfig::default();
        let mut sync = SyncConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(cache) = file_config.cache_path {
                cache_path = ConfigValue::new(resolve_relative(&path, cache), ConfigSource::File);
            }
            if let Some(user) = file_config.user_id {
                user_id = ConfigValue::new(Some(user), ConfigSource::File);
            }
            if let Some(remote_config) = file_config.remote {
                remote = remote_config;
            }
            if let Some(sync_config) = file_config.sync {
                sync = sync_config;
            }
        }

        if let Ok(cache) = std::env::var("NUTRISYNC_CACHE_PATH") {
            cache_path = ConfigValue::new(PathBuf::from(cache), ConfigSource::Environment);
        }
        if let Ok(user) = std::env::var("NUTRISYNC_USER") {
            user_id = ConfigValue::new(Some(user), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("NUTRISYNC_REMOTE_URL") {
            remote.database_url = Some(url);
        }
        if let Ok(secs) = std::env::var("NUTRISYNC_REMOTE_TIMEOUT") {
            remote.timeout_secs = secs
                .parse()
                .map_err(|_| ConfigError::InvalidValue("NUTRISYNC_REMOTE_TIMEOUT", secs))?;
        }

        Ok(Self {
            cache_path,
            user_id,
            config_file,
            remote,
            sync,
        })
    }

    /// Overrides the signed-in user from the command line.
    pub fn with_user(mut self, user: Option<String>) -> Self {
        if let Some(user) = user {
            self.user_id = ConfigValue::new(Some(user), ConfigSource::Flag);
        }
        self
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/nutrisync/
    /// - macOS: ~/Library/Application Support/nutrisync/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutrisync")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/nutrisync/
    /// - macOS: ~/Library/Application Support/nutrisync/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutrisync")
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

// Relative paths in the file are relative to the file itself.
fn resolve_relative(config_path: &Path, value: PathBuf) -> PathBuf {
    if value.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&value))
            .unwrap_or(value)
    } else {
        value
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value '{}' for {}", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

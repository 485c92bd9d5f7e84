use crate::common::constants::{
    CONFIG_FILE_NAME, DEFAULT_API_URL, DEFAULT_DATA_DIR, DEFAULT_LOG_DIR, DEFAULT_TIMEOUT_SECONDS,
    DEFAULT_USER_AGENT,
};
use crate::common::error::{Result, SwipeError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Sqlite,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = SwipeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(SwipeError::Config(format!(
                "unknown store backend '{}' (expected file, sqlite or memory)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus listen address; no exporter is started when unset.
    pub listen_addr: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the daily-rotated JSON log files.
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, then applies environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let config_content = fs::read_to_string(config_path).map_err(|e| {
                SwipeError::Config(format!(
                    "Failed to read config file '{}': {}",
                    config_path.display(),
                    e
                ))
            })?;
            info!("Loaded configuration from {}", config_path.display());
            Self::from_toml_str(&config_content)?
        } else {
            debug!("No config file at {}, using defaults", config_path.display());
            Config::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides from `SWIPE_*` variables, looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SWIPE_API_URL") {
            self.api.base_url = url;
        }
        if let Some(secs) = lookup("SWIPE_TIMEOUT_SECONDS") {
            self.api.timeout_seconds = secs.trim().parse().map_err(|e| {
                SwipeError::Config(format!("Invalid SWIPE_TIMEOUT_SECONDS '{}': {}", secs, e))
            })?;
        }
        if let Some(dir) = lookup("SWIPE_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup("SWIPE_STORE") {
            self.storage.backend = backend.parse()?;
        }
        if let Some(dir) = lookup("SWIPE_LOG_DIR") {
            self.logging.dir = PathBuf::from(dir);
        }
        if let Some(addr) = lookup("SWIPE_METRICS_ADDR") {
            self.metrics.listen_addr = Some(addr).filter(|a| !a.trim().is_empty());
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://")) {
            return Err(SwipeError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_seconds == 0 {
            return Err(SwipeError::Config("api.timeout_seconds must be positive".into()));
        }
        Ok(())
    }
}

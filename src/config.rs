use crate::constants::DEFAULT_API_BASE;
use crate::errors::{IkarusError, IkarusResult};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf, time::Duration};

/// Environment variable that overrides the configured base URL.
pub const API_URL_ENV: &str = "IKARUS_API_URL";

/// Which field name the chat endpoint expects the conversation history under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatContract {
    /// `{ message, conversation_history, top_k }`
    #[default]
    ConversationHistory,
    /// `{ message, messages, top_k }`
    Messages,
}

/// Per-operation request budgets, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub health_secs: u64,
    pub search_secs: u64,
    pub chat_secs: u64,
    pub similar_secs: u64,
    pub analytics_secs: u64,
    pub products_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            health_secs: 10,
            search_secs: 60,
            chat_secs: 120,
            similar_secs: 30,
            analytics_secs: 60,
            products_secs: 60,
        }
    }
}

impl Timeouts {
    pub fn health(&self) -> Duration {
        Duration::from_secs(self.health_secs)
    }

    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }

    pub fn chat(&self) -> Duration {
        Duration::from_secs(self.chat_secs)
    }

    pub fn similar(&self) -> Duration {
        Duration::from_secs(self.similar_secs)
    }

    pub fn analytics(&self) -> Duration {
        Duration::from_secs(self.analytics_secs)
    }

    pub fn products(&self) -> Duration {
        Duration::from_secs(self.products_secs)
    }

    fn all(&self) -> [(&'static str, u64); 6] {
        [
            ("health_secs", self.health_secs),
            ("search_secs", self.search_secs),
            ("chat_secs", self.chat_secs),
            ("similar_secs", self.similar_secs),
            ("analytics_secs", self.analytics_secs),
            ("products_secs", self.products_secs),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub timeouts: Timeouts,
    pub default_top_k: usize,
    pub chat_top_k: usize,
    pub similar_top_k: usize,
    pub chat_contract: ChatContract,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            timeouts: Timeouts::default(),
            default_top_k: 5,
            chat_top_k: 8,
            similar_top_k: 6,
            chat_contract: ChatContract::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the user config file (if any), then applies `.env` and the
    /// base-URL override. The result is meant to be built once at startup and
    /// handed to the client by reference.
    pub fn load() -> IkarusResult<Self> {
        dotenv::dotenv().ok();

        let mut config = match get_config_path() {
            Some(path) => load_or_create(&path)?,
            None => Config::default(),
        };

        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url.trim().to_string();
            }
        }

        validate_config(&config)?;
        Ok(config)
    }
}

/// Loads the file at `path`, writing the defaults there first when it is missing.
/// A failed write only costs persistence, so it is logged and the defaults are used.
pub fn load_or_create(path: &Path) -> IkarusResult<Config> {
    if path.exists() {
        return load_from_path(path);
    }

    let config = Config::default();
    match save_to_path(&config, path) {
        Ok(()) => log::info!("wrote default configuration to {}", path.display()),
        Err(e) => log::warn!("could not write default configuration: {}", e),
    }
    Ok(config)
}

pub fn load_from_path(path: &Path) -> IkarusResult<Config> {
    let config_str = fs::read_to_string(path).map_err(|e| {
        IkarusError::config_error(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config: Config = serde_json::from_str(&config_str)
        .map_err(|e| IkarusError::config_error(format!("Failed to parse config: {}", e)))?;

    validate_config(&config)?;
    Ok(config)
}

pub fn save_to_path(config: &Config, path: &Path) -> IkarusResult<()> {
    validate_config(config)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            IkarusError::config_error(format!("Failed to create config directory: {}", e))
        })?;
    }

    let config_str = serde_json::to_string_pretty(config)
        .map_err(|e| IkarusError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, config_str)
        .map_err(|e| IkarusError::config_error(format!("Failed to write config file: {}", e)))?;

    Ok(())
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("ikarus").join("config.json"))
}

pub fn validate_config(config: &Config) -> IkarusResult<()> {
    let url = config.api_base_url.trim();
    if url.is_empty() {
        return Err(IkarusError::config_error("api_base_url is required"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(IkarusError::config_error(format!(
            "api_base_url must be an http(s) URL, got {}",
            url
        )));
    }

    for (name, secs) in config.timeouts.all() {
        if secs == 0 {
            return Err(IkarusError::config_error(format!(
                "timeouts.{} must be greater than 0",
                name
            )));
        }
    }

    if config.default_top_k == 0 || config.chat_top_k == 0 || config.similar_top_k == 0 {
        return Err(IkarusError::config_error("top_k values must be greater than 0"));
    }

    Ok(())
}

//! Configuration file support for liftlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftlog/config.toml`.
//! Every section is optional.

use crate::advisor::OverloadPolicy;
use crate::balance::DEFAULT_BALANCE_WINDOW_DAYS;
use crate::prs::DEFAULT_PR_WINDOW_DAYS;
use crate::{Error, Result, TrainingStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub policy: OverloadPolicy,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Identity used when querying the repository
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

/// Analytics windows and the default training style
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_pr_window_days")]
    pub pr_window_days: u32,

    #[serde(default = "default_balance_window_days")]
    pub balance_window_days: u32,

    #[serde(default)]
    pub training_style: TrainingStyle,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            pr_window_days: default_pr_window_days(),
            balance_window_days: default_balance_window_days(),
            training_style: TrainingStyle::default(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("liftlog")
}

fn default_user_id() -> String {
    "local".into()
}

fn default_pr_window_days() -> u32 {
    DEFAULT_PR_WINDOW_DAYS
}

fn default_balance_window_days() -> u32 {
    DEFAULT_BALANCE_WINDOW_DAYS
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Check values that deserialize fine but make no sense
    pub fn validate(&self) -> Result<()> {
        if self.analytics.pr_window_days == 0 {
            return Err(Error::Config("pr_window_days must be at least 1".into()));
        }
        if self.analytics.balance_window_days == 0 {
            return Err(Error::Config(
                "balance_window_days must be at least 1".into(),
            ));
        }
        if self.user.id.trim().is_empty() {
            return Err(Error::Config("user id must not be empty".into()));
        }
        self.policy.validate()
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("liftlog").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

//! Configuration file support for fitsched.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitsched/config.toml`.

use crate::{Error, Result, SchedulePreferencesInput};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub equipment: EquipmentConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
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

/// Equipment assumed available for users whose profile declares none
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EquipmentConfig {
    #[serde(default = "default_equipment")]
    pub available: Vec<String>,
}

impl Default for EquipmentConfig {
    fn default() -> Self {
        Self {
            available: default_equipment(),
        }
    }
}

/// Default schedule preferences for users who have none stored yet
///
/// Day names are kept as raw strings here and sanitized at use, so a bad
/// config value degrades the same way bad stored preferences do.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_start_day")]
    pub start_day: String,

    #[serde(default)]
    pub rest_days: Vec<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_day: default_start_day(),
            rest_days: Vec::new(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("fitsched")
}

fn default_equipment() -> Vec<String> {
    vec!["bodyweight".into(), "dumbbell".into(), "bands".into()]
}

fn default_start_day() -> String {
    "Monday".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("fitsched").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// The configured default schedule preferences, as raw sanitizer input
    pub fn schedule_preferences(&self) -> SchedulePreferencesInput {
        SchedulePreferencesInput {
            start_day: Some(self.schedule.start_day.clone()),
            rest_days: Some(self.schedule.rest_days.clone()),
        }
    }
}

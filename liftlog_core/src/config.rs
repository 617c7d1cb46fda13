//! Configuration file support for Liftlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftlog/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
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

/// Progression and trend parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Number of most recent progression points returned per exercise
    #[serde(default = "default_progression_limit")]
    pub progression_limit: usize,

    #[serde(default = "default_trend_threshold_percent")]
    pub trend_threshold_percent: f64,

    /// Points averaged at each end of a series for trend classification
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            progression_limit: default_progression_limit(),
            trend_threshold_percent: default_trend_threshold_percent(),
            trend_window: default_trend_window(),
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

fn default_progression_limit() -> usize {
    50
}

fn default_trend_threshold_percent() -> f64 {
    5.0
}

fn default_trend_window() -> usize {
    3
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
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("liftlog").join("config.toml")
    }

    /// Reject values the analytics cannot work with
    pub fn validate(&self) -> Result<()> {
        let analytics = &self.analytics;
        if analytics.trend_window == 0 {
            return Err(Error::Config("analytics.trend_window must be at least 1".into()));
        }
        if !analytics.trend_threshold_percent.is_finite() || analytics.trend_threshold_percent < 0.0
        {
            return Err(Error::Config(format!(
                "analytics.trend_threshold_percent must be a non-negative number, got {}",
                analytics.trend_threshold_percent
            )));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analytics.progression_limit, 50);
        assert_eq!(config.analytics.trend_threshold_percent, 5.0);
        assert_eq!(config.analytics.trend_window, 3);
        assert!(config.data.data_dir.ends_with("liftlog"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.analytics.progression_limit = 20;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.analytics.progression_limit, 20);
        assert_eq!(loaded.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[analytics]
trend_threshold_percent = 2.5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.analytics.trend_threshold_percent, 2.5);
        assert_eq!(config.analytics.progression_limit, 50); // default
        assert_eq!(config.analytics.trend_window, 3); // default
    }

    #[test]
    fn test_invalid_window_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[analytics]\ntrend_window = 0\n").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

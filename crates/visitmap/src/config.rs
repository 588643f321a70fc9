//! Configuration management for visitmap.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::HashSet;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::{Coordinate, MapView, DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::navigation::{AmapNavigator, DEFAULT_SOURCE};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "visitmap";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "visits.db";

/// Highest zoom level accepted for the default map view.
const MAX_ZOOM: u8 = 20;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `VISITMAP_`, sections split on `__`)
/// 2. TOML config file at `~/.config/visitmap/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Statistics configuration.
    pub stats: StatsConfig,
    /// Map configuration.
    pub map: MapConfig,
    /// Navigation link configuration.
    pub navigation: NavigationConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/visitmap/visits.db`
    pub database_path: Option<PathBuf>,
}

/// Statistics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Years reported individually next to the all-time figures.
    pub tracked_years: Vec<i32>,
}

/// Map view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Latitude of the view shown when there are no schools.
    pub default_center_lat: f64,
    /// Longitude of the view shown when there are no schools.
    pub default_center_lng: f64,
    /// Zoom of the view shown when there are no schools.
    pub default_zoom: u8,
}

/// Navigation link configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Application name sent as `src` in navigation links.
    pub source: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            tracked_years: vec![2025, 2026],
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center_lat: DEFAULT_CENTER.lat,
            default_center_lng: DEFAULT_CENTER.lng,
            default_zoom: DEFAULT_ZOOM,
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("VISITMAP_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let years = &self.stats.tracked_years;
        if years.is_empty() {
            return Err(invalid("tracked_years must not be empty"));
        }
        let mut seen = HashSet::new();
        for &year in years {
            if !(1..=9999).contains(&year) {
                return Err(invalid(format!(
                    "tracked year {year} must be between 1 and 9999"
                )));
            }
            if !seen.insert(year) {
                return Err(invalid(format!("tracked year {year} is listed twice")));
            }
        }

        Coordinate::checked(self.map.default_center_lat, self.map.default_center_lng)
            .map_err(|e| invalid(format!("default map center: {e}")))?;

        if self.map.default_zoom == 0 || self.map.default_zoom > MAX_ZOOM {
            return Err(invalid(format!(
                "default_zoom must be between 1 and {MAX_ZOOM}"
            )));
        }

        if self.navigation.source.trim().is_empty() {
            return Err(invalid("navigation source must not be empty"));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Map view used when there are no schools to show.
    #[must_use]
    pub fn default_view(&self) -> MapView {
        MapView {
            center: Coordinate::new(self.map.default_center_lat, self.map.default_center_lng),
            zoom: self.map.default_zoom,
        }
    }

    /// Navigation link builder for the configured source.
    #[must_use]
    pub fn navigator(&self) -> AmapNavigator {
        AmapNavigator::new(self.navigation.source.clone())
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}

//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the oracle-config.toml file.
//! It provides the zone table, the shared tide reference point, forecast provider
//! settings and the rule calibration.

use crate::conditions::Thresholds;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "oracle-config.toml";

/// Open-Meteo marine variable holding the tide curve.
pub const DEFAULT_TIDE_VARIABLE: &str = "sea_level_height_msl";

/// Application configuration loaded from oracle-config.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Fishing zones, in the order they are listed to the user
    pub zones: Vec<ZoneConfig>,
    /// Single point whose tide curve is used for the whole coastline
    pub tide_reference: Coordinates,
    /// Forecast provider settings
    pub forecast: ForecastConfig,
    /// Rule calibration used by zones without their own
    #[serde(default)]
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A named stretch of coast for wind and wave queries
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ZoneConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Overrides the global thresholds for this zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
}

impl ZoneConfig {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Open-Meteo endpoints and caching
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ForecastConfig {
    /// IANA timezone used to cut the day into hours
    pub timezone: String,
    /// Wind forecast endpoint
    pub weather_url: String,
    /// Wave and tide endpoint
    pub marine_url: String,
    /// Directory for cached provider responses
    pub cache_dir: PathBuf,
    /// Cache TTL in minutes
    pub cache_ttl_minutes: u64,
    /// Hourly marine variable requested for the tide curve
    #[serde(default = "default_tide_variable")]
    pub tide_variable: String,
}

fn default_tide_variable() -> String {
    DEFAULT_TIDE_VARIABLE.to_string()
}

fn zone(name: &str, latitude: f64, longitude: f64) -> ZoneConfig {
    ZoneConfig {
        name: name.to_string(),
        latitude,
        longitude,
        thresholds: None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            zones: vec![
                zone("El Saler", 39.37, -0.25),
                zone("Pinedo", 39.42, -0.33),
                zone("Marina (Malvarrosa)", 39.47, -0.32),
                zone("Alboraya", 39.50, -0.31),
                zone("Faro de Cullera", 39.18, -0.22),
            ],
            // Valencia buoy
            tide_reference: Coordinates {
                latitude: 39.40,
                longitude: -0.20,
            },
            forecast: ForecastConfig {
                timezone: "Europe/Madrid".to_string(),
                weather_url: "https://api.open-meteo.com/v1/forecast".to_string(),
                marine_url: "https://marine-api.open-meteo.com/v1/marine".to_string(),
                cache_dir: std::env::temp_dir().join("fishing-oracle"),
                cache_ttl_minutes: 30,
                tide_variable: default_tide_variable(),
            },
            thresholds: Thresholds::default(),
        }
    }
}

impl Config {
    /// Load configuration from oracle-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        zones = config.zones.len(),
                        "loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), "invalid config file format: {e}");
                    warn!("using default configuration (Valencia coast)");
                    Self::default()
                }
            },
            Err(_) => {
                info!(
                    path = %path.display(),
                    "no config file found, using default configuration (Valencia coast)"
                );
                Self::default()
            }
        }
    }

    /// Save current configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// Zone by name, ignoring case
    pub fn zone(&self, name: &str) -> Option<&ZoneConfig> {
        self.zones.iter().find(|z| z.name.eq_ignore_ascii_case(name))
    }

    /// Calibration for `zone`: its own override or the global thresholds
    pub fn thresholds_for(&self, zone: &ZoneConfig) -> Thresholds {
        zone.thresholds.unwrap_or(self.thresholds)
    }
}

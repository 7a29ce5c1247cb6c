//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! tide-dial.toml file. It provides a centralized way to configure the NOAA
//! station, wake/retry timing, and the schedule store location.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration loaded from tide-dial.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// NOAA station configuration
    pub station: StationConfig,
    /// Wake/sleep timing configuration
    pub timing: TimingConfig,
    /// Schedule persistence configuration
    pub store: StoreConfig,
}

/// NOAA tide station configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationConfig {
    /// NOAA station ID (e.g., "8418150" for Portland, ME).
    /// Empty means unconfigured; the refresh policy treats that as stale.
    pub id: String,
    /// Human-readable station name for reference
    pub name: String,
    /// Base URL of the CO-OPS data API. Overridable for tests.
    pub api_url: String,
}

/// Wake cycle timing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Sleep duration between wake cycles, in minutes
    pub wake_interval_minutes: u64,
    /// Shorter sleep used when the time source fails, in minutes
    pub retry_interval_minutes: u64,
    /// HTTP timeout for the prediction fetch, in seconds
    pub http_timeout_secs: u64,
}

/// Schedule persistence configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Path of the persisted schedule document
    pub path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            station: StationConfig {
                id: "8418150".to_string(),
                name: "Portland, ME".to_string(),
                api_url: "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter".to_string(),
            },
            timing: TimingConfig {
                wake_interval_minutes: 30,
                retry_interval_minutes: 5,
                http_timeout_secs: 30,
            },
            store: StoreConfig {
                path: "tide-schedule.json".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from tide-dial.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path("tide-dial.toml")
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("loaded configuration for station: {}", config.station.name);
                    config
                }
                Err(e) => {
                    warn!("invalid config file format: {e}");
                    warn!("using default configuration (Portland, ME)");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config file found, using default configuration (Portland, ME)");
                Self::default()
            }
        }
    }
}

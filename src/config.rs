//! Startup configuration.
//!
//! One JSON document supplies the OSRM endpoint, the restricted zone set
//! and the simulation knobs. Every field has a default, so a partial (or
//! empty) document is valid.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::osrm::OsrmConfig;
use crate::zones::ZoneSet;

/// Default vehicle speed for the simulation, ~40 km/h city driving.
const DEFAULT_SPEED_MPS: f64 = 11.0;

/// Default dwell threshold before a zone stay raises an alert.
const DEFAULT_DWELL_THRESHOLD_SECS: f64 = 2.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub osrm: OsrmConfig,
    /// Restricted zones, fixed for the lifetime of the process.
    pub zones: ZoneSet,
    pub vehicle_speed_mps: f64,
    pub dwell_threshold_secs: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            osrm: OsrmConfig::default(),
            zones: ZoneSet::default(),
            vehicle_speed_mps: DEFAULT_SPEED_MPS,
            dwell_threshold_secs: DEFAULT_DWELL_THRESHOLD_SECS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// Simulation speed must be finite and positive; zero or negative
    /// speed would stall the vehicle simulation.
    NonPositiveSpeed(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config read failed: {}", err),
            ConfigError::Parse(err) => write!(f, "config parse failed: {}", err),
            ConfigError::NonPositiveSpeed(speed) => {
                write!(f, "vehicle_speed_mps must be positive, got {}", speed)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl GuardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GuardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.vehicle_speed_mps.is_finite() || self.vehicle_speed_mps <= 0.0 {
            return Err(ConfigError::NonPositiveSpeed(self.vehicle_speed_mps));
        }
        Ok(())
    }
}

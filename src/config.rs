//! Path construction parameters, loadable from TOML.

use std::{fs::read_to_string, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Geometry below this size (distance units) counts as degenerate.
pub const EPSILON: f64 = 1e-9;
/// Blend radii at or above this (distance units) count as a straight line.
pub const REALLY_BIG_NUMBER: f64 = 1e9;
/// Path following acceleration limit (distance units / s^2).
pub const DEFAULT_MAX_ACCEL: f64 = 120.0;
/// Slack allowed when checking scheduled speeds.
pub const DEFAULT_SPEED_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Lines shorter than this and blend radii smaller than this are skipped
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Blend radii larger than this are skipped, the corner is close enough to straight
    #[serde(default = "default_really_big_number")]
    pub really_big_number: f64,

    /// Acceleration bound handed to every segment's motion profile
    #[serde(default = "default_max_accel")]
    pub max_accel: f64,

    /// Slack on the end speed of each segment during validation, applied to
    /// squared speeds as `2 * max_accel * speed_tolerance`
    #[serde(default = "default_speed_tolerance")]
    pub speed_tolerance: f64,
}

fn default_epsilon() -> f64 {
    EPSILON
}

fn default_really_big_number() -> f64 {
    REALLY_BIG_NUMBER
}

fn default_max_accel() -> f64 {
    DEFAULT_MAX_ACCEL
}

fn default_speed_tolerance() -> f64 {
    DEFAULT_SPEED_TOLERANCE
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            really_big_number: REALLY_BIG_NUMBER,
            max_accel: DEFAULT_MAX_ACCEL,
            speed_tolerance: DEFAULT_SPEED_TOLERANCE,
        }
    }
}

impl PathConfig {
    /// Load and check a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_str = read_to_string(path)?;
        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_accel(mut self, max_accel: f64) -> Self {
        self.max_accel = max_accel;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.epsilon > 0.) {
            return Err(ConfigError::Invalid(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !(self.really_big_number > self.epsilon) {
            return Err(ConfigError::Invalid(format!(
                "really_big_number ({}) must exceed epsilon ({})",
                self.really_big_number, self.epsilon
            )));
        }
        if !(self.max_accel > 0. && self.max_accel.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "max_accel must be positive and finite, got {}",
                self.max_accel
            )));
        }
        if !(self.speed_tolerance >= 0.) {
            return Err(ConfigError::Invalid(format!(
                "speed_tolerance can't be negative, got {}",
                self.speed_tolerance
            )));
        }
        Ok(())
    }
}

//! Error types

use thiserror::Error;

/// Reasons a waypoint list can't be turned into a path.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("a path needs at least 2 waypoints, got {0}")]
    NotEnoughWaypoints(usize),

    #[error("every segment of the path is degenerate")]
    NoSegments,

    #[error("segment {segment} has an unusable max speed ({speed})")]
    InvalidSpeed { segment: usize, speed: f64 },

    #[error("segment {segment} can't be driven as scheduled: ends at {reached}, allowed {allowed}")]
    InfeasibleSpeed {
        segment: usize,
        reached: f64,
        allowed: f64,
    },

    #[error("segment {segment} profile stops after {reached} of {length}")]
    ProfileIncomplete {
        segment: usize,
        reached: f64,
        length: f64,
    },

    #[error("invalid path configuration: {0}")]
    Config(#[from] ConfigError),
}

/// An error that occurs while loading or checking a [`crate::PathConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot load the config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot read the config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, PathError>;

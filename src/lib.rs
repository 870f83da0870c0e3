#![deny(clippy::unwrap_used)]
//! Compiles waypoint lists into drivable paths: straight lines joined by
//! tangent arcs, each segment carrying a speed profile along the path.

pub mod config;
pub mod error;
pub mod math;
pub mod path;
pub mod trajectories;

pub use config::PathConfig;
pub use error::{ConfigError, PathError, Result};
pub use path::{
    build_path_from_waypoints, Path, PathBuilder, PathLocation, PathSegment, SegmentGeometry,
    Waypoint,
};
pub use trajectories::{
    MotionConstraints, MotionGoal, MotionProfile, MotionState, ProfileGenerator,
    TrapezoidGenerator, TrapezoidProfile,
};

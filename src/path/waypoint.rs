use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Point2;

/// An operator specified anchor along a path.
///
/// `radius` is the blend radius used to round the corner at this waypoint
/// (0 keeps it sharp, and is what path end points should use). `speed` is the
/// target speed for the stretch of path that ends here. The optional `marker`
/// is carried through to the segments built from this waypoint so external
/// code can react when the vehicle passes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    position: Point2,
    radius: f64,
    speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marker: Option<String>,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, radius: f64, speed: f64) -> Self {
        Self::from_point(Point2::new(x, y), radius, speed)
    }

    pub fn from_point(position: Point2, radius: f64, speed: f64) -> Self {
        Self {
            position,
            radius,
            speed,
            marker: None,
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn position(&self) -> Point2 {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "W: ({:.1}, {:.1}), R: {:.0}, S: {:.0}",
            self.position.x, self.position.y, self.radius, self.speed
        )?;
        if let Some(marker) = &self.marker {
            write!(f, ", M: {marker}")?;
        }
        Ok(())
    }
}

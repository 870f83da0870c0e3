use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    math::{angle_between, cross, rotate, Line, Point2},
    trajectories::{MotionProfile, MotionState, TrapezoidProfile},
};

/// Shape of a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SegmentGeometry {
    Line {
        start: Point2,
        end: Point2,
    },
    /// Circular arc from `start` to `end` around `center`, sweeping less than
    /// half a turn.
    Arc {
        start: Point2,
        end: Point2,
        center: Point2,
    },
}

impl SegmentGeometry {
    pub fn start(&self) -> Point2 {
        match *self {
            Self::Line { start, .. } | Self::Arc { start, .. } => start,
        }
    }

    pub fn end(&self) -> Point2 {
        match *self {
            Self::Line { end, .. } | Self::Arc { end, .. } => end,
        }
    }

    pub fn center(&self) -> Option<Point2> {
        match *self {
            Self::Line { .. } => None,
            Self::Arc { center, .. } => Some(center),
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Self::Line { .. })
    }

    pub fn length(&self) -> f64 {
        match *self {
            Self::Line { start, end } => (end - start).norm(),
            Self::Arc { start, end, center } => {
                let delta_start = start - center;
                let delta_end = end - center;
                delta_start.norm() * angle_between(&delta_start, &delta_end)
            }
        }
    }

    /// Signed angle swept from start to end, counter clockwise positive.
    fn sweep(start: Point2, end: Point2, center: Point2) -> f64 {
        let delta_start = start - center;
        let delta_end = end - center;
        let angle = angle_between(&delta_start, &delta_end);
        if cross(&delta_start, &delta_end) >= 0. {
            angle
        } else {
            -angle
        }
    }

    pub fn closest_point(&self, position: Point2) -> Point2 {
        match *self {
            Self::Line { start, end } => Line::new(start, end).closest_point_on_segment(position),
            Self::Arc { start, end, center } => {
                let delta_start = start - center;
                let delta_end = end - center;
                let delta_position = position - center;
                let distance = delta_position.norm();
                if distance <= f64::EPSILON {
                    return start;
                }
                let radial = delta_position * (delta_start.norm() / distance);
                let between_ends =
                    cross(&radial, &delta_start) * cross(&radial, &delta_end) < 0.;
                let on_arc_side = radial.dot(&(delta_start + delta_end)) > 0.;
                if between_ends && on_arc_side {
                    return center + radial;
                }
                if (position - end).norm() < (position - start).norm() {
                    end
                } else {
                    start
                }
            }
        }
    }

    /// Point `dist` along the segment. `dist` is clamped to `[0, length]`,
    /// the upper bound is lifted when `extrapolate` is set.
    pub fn point_by_distance(&self, dist: f64, extrapolate: bool) -> Point2 {
        let length = self.length();
        let dist = if extrapolate {
            dist.max(0.)
        } else {
            dist.max(0.).min(length)
        };
        if length <= 0. {
            return self.start();
        }
        match *self {
            Self::Line { start, end } => start + (end - start) * (dist / length),
            Self::Arc { start, end, center } => {
                let angle = Self::sweep(start, end, center) * dist / length;
                center + rotate(&(start - center), angle)
            }
        }
    }

    /// Distance left to the end from `position`, which should already lie on
    /// the segment (see [`Self::closest_point`]).
    pub fn remaining_distance(&self, position: Point2) -> f64 {
        match *self {
            Self::Line { end, .. } => (end - position).norm(),
            Self::Arc { start, end, center } => {
                let delta_start = start - center;
                let delta_end = end - center;
                let total_angle = angle_between(&delta_start, &delta_end);
                if total_angle <= 0. {
                    return 0.;
                }
                let angle = angle_between(&delta_end, &(position - center));
                angle / total_angle * self.length()
            }
        }
    }
}

impl fmt::Display for SegmentGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = (self.start(), self.end());
        write!(
            f,
            "start: ({:.2}, {:.2}), end: ({:.2}, {:.2})",
            start.x, start.y, end.x, end.y
        )?;
        if let Some(center) = self.center() {
            write!(f, ", center: ({:.2}, {:.2})", center.x, center.y)?;
        }
        Ok(())
    }
}

/// A line or arc of a [`crate::Path`] with the speed schedule for driving it.
///
/// The profile works in path-cumulative positions: distance `d` along this
/// segment is position `start_pos + d` in the profile.
#[derive(Debug, Clone)]
pub struct PathSegment<P = TrapezoidProfile> {
    geometry: SegmentGeometry,
    max_speed: f64,
    end_speed: f64,
    profile: P,
    extrapolate_lookahead: bool,
    markers: Vec<String>,
}

impl<P: MotionProfile> PathSegment<P> {
    pub(crate) fn new(
        geometry: SegmentGeometry,
        max_speed: f64,
        end_speed: f64,
        profile: P,
        markers: Vec<String>,
    ) -> Self {
        Self {
            geometry,
            max_speed,
            end_speed,
            profile,
            extrapolate_lookahead: false,
            markers,
        }
    }

    pub fn geometry(&self) -> &SegmentGeometry {
        &self.geometry
    }

    pub fn start(&self) -> Point2 {
        self.geometry.start()
    }

    pub fn end(&self) -> Point2 {
        self.geometry.end()
    }

    pub fn center(&self) -> Option<Point2> {
        self.geometry.center()
    }

    pub fn is_line(&self) -> bool {
        self.geometry.is_line()
    }

    /// Cruise limit on this segment.
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Speed commanded at the end of this segment.
    pub fn end_speed(&self) -> f64 {
        self.end_speed
    }

    /// Markers of the waypoints this segment was built from.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub(crate) fn add_markers(&mut self, markers: impl IntoIterator<Item = String>) {
        self.markers.extend(markers);
    }

    pub fn extrapolates_lookahead(&self) -> bool {
        self.extrapolate_lookahead
    }

    pub(crate) fn set_extrapolate_lookahead(&mut self, val: bool) {
        self.extrapolate_lookahead = val;
    }

    pub(crate) fn reschedule(&mut self, end_speed: f64, profile: P) {
        self.end_speed = end_speed;
        self.profile = profile;
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }

    pub fn start_state(&self) -> MotionState {
        self.profile.start_state()
    }

    pub fn end_state(&self) -> MotionState {
        self.profile.end_state()
    }

    pub fn length(&self) -> f64 {
        self.geometry.length()
    }

    pub fn closest_point(&self, position: Point2) -> Point2 {
        self.geometry.closest_point(position)
    }

    pub fn point_by_distance(&self, dist: f64) -> Point2 {
        self.geometry
            .point_by_distance(dist, self.extrapolate_lookahead)
    }

    pub fn remaining_distance(&self, position: Point2) -> f64 {
        self.geometry.remaining_distance(position)
    }

    /// How far along this segment the point closest to `position` is.
    pub fn distance_travelled(&self, position: Point2) -> f64 {
        self.length() - self.remaining_distance(self.closest_point(position))
    }

    /// Scheduled speed `dist` along the segment. Never fails: the distance is
    /// clamped into the profile's domain and a missing sample reads as 0.
    pub fn speed_by_distance(&self, dist: f64) -> f64 {
        let start_pos = self.profile.start_pos();
        let end_pos = self.profile.end_pos();
        let pos = (start_pos + dist).max(start_pos).min(end_pos);
        match self.profile.first_state_by_pos(pos) {
            Some(state) => state.vel,
            None => {
                warn!(pos, "velocity does not exist at that position");
                0.0
            }
        }
    }

    pub fn speed_by_closest_point(&self, position: Point2) -> f64 {
        self.speed_by_distance(self.distance_travelled(position))
    }
}

impl<P> fmt::Display for PathSegment<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, speed: {:.1}", self.geometry, self.max_speed)?;
        if !self.markers.is_empty() {
            write!(f, ", markers: {}", self.markers.join(", "))?;
        }
        write!(f, ")")
    }
}

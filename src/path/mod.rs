//! # Path
//!
//! A path is the ordered list of line and arc segments produced by
//! [`PathBuilder`] from a list of [`Waypoint`]s. Once built it is only read:
//! the pursuit loop asks it where the vehicle is, how fast it should go and
//! where to aim.

mod builder;
mod segment;
mod validate;
mod waypoint;

pub use builder::{build_path_from_waypoints, PathBuilder};
pub use segment::{PathSegment, SegmentGeometry};
pub use waypoint::Waypoint;

use std::fmt;

use crate::{
    math::Point2,
    trajectories::{MotionProfile, MotionState, TrapezoidProfile},
};

/// Where a position projects onto a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLocation {
    /// Index of the segment holding the closest point.
    pub segment: usize,
    /// Closest point on that segment.
    pub point: Point2,
    /// Distance from the segment start to `point`.
    pub distance_along: f64,
    /// Straight line distance between the queried position and `point`.
    pub offset: f64,
}

#[derive(Debug, Clone)]
pub struct Path<P = TrapezoidProfile> {
    segments: Vec<PathSegment<P>>,
    initial_state: MotionState,
}

impl<P: MotionProfile> Path<P> {
    pub(crate) fn new(initial_state: MotionState) -> Self {
        Self {
            segments: Vec::new(),
            initial_state,
        }
    }

    pub(crate) fn add_segment(&mut self, segment: PathSegment<P>) {
        self.segments.push(segment);
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [PathSegment<P>] {
        &mut self.segments
    }

    /// Only the last segment may extrapolate its lookahead.
    pub(crate) fn extrapolate_last(&mut self) {
        let last = self.segments.len().saturating_sub(1);
        for (i, segment) in self.segments.iter_mut().enumerate() {
            segment.set_extrapolate_lookahead(i == last);
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment<P>] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&PathSegment<P>> {
        self.segments.get(index)
    }

    /// State the first segment was seeded with.
    pub fn initial_state(&self) -> MotionState {
        self.initial_state
    }

    /// End state of the last segment, the state the next segment would start from.
    pub fn last_motion_state(&self) -> MotionState {
        self.segments
            .last()
            .map(|s| s.end_state())
            .unwrap_or(self.initial_state)
    }

    /// Sum of the segment lengths.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(|s| s.length()).sum()
    }

    /// Scheduled time to drive the whole path.
    pub fn duration(&self) -> f64 {
        self.last_motion_state().t - self.initial_state.t
    }

    pub fn end_position(&self) -> Option<Point2> {
        self.segments.last().map(|s| s.end())
    }

    /// Closest point over all segments.
    pub fn locate(&self, position: Point2) -> Option<PathLocation> {
        self.locate_from(0, position)
    }

    /// Closest point over the segments from `first_segment` on, for callers
    /// that track progress and must not snap back to an earlier part of a
    /// self crossing path.
    pub fn locate_from(&self, first_segment: usize, position: Point2) -> Option<PathLocation> {
        self.segments
            .iter()
            .enumerate()
            .skip(first_segment)
            .map(|(i, segment)| {
                let point = segment.closest_point(position);
                PathLocation {
                    segment: i,
                    point,
                    distance_along: segment.length() - segment.remaining_distance(point),
                    offset: (position - point).norm(),
                }
            })
            .fold(None, |best: Option<PathLocation>, candidate| match best {
                Some(b) if b.offset <= candidate.offset => Some(b),
                _ => Some(candidate),
            })
    }

    pub fn closest_point(&self, position: Point2) -> Point2 {
        self.locate(position).map_or(position, |l| l.point)
    }

    /// Scheduled speed at the point of the path closest to `position`.
    pub fn speed_by_closest_point(&self, position: Point2) -> f64 {
        self.locate(position)
            .and_then(|l| self.segments.get(l.segment))
            .map_or(0.0, |s| s.speed_by_closest_point(position))
    }

    pub fn point_by_distance(&self, segment: usize, distance: f64) -> Option<Point2> {
        self.segments
            .get(segment)
            .map(|s| s.point_by_distance(distance))
    }

    /// Distance left from `location` to the end of the path.
    pub fn remaining_length(&self, location: &PathLocation) -> f64 {
        let Some(current) = self.segments.get(location.segment) else {
            return 0.0;
        };
        let rest: f64 = self.segments[location.segment + 1..]
            .iter()
            .map(|s| s.length())
            .sum();
        (current.length() - location.distance_along).max(0.) + rest
    }

    /// Point `lookahead` further down the path from `location`, walking over
    /// segment boundaries. Past the end of the path the last segment is
    /// extrapolated.
    pub fn lookahead_point(&self, location: &PathLocation, lookahead: f64) -> Option<Point2> {
        let mut remaining = lookahead.max(0.);
        let mut distance = location.distance_along;
        let last = self.segments.len().checked_sub(1)?;
        for (i, segment) in self.segments.iter().enumerate().skip(location.segment) {
            let left_on_segment = segment.length() - distance;
            if remaining <= left_on_segment || i == last {
                return Some(segment.point_by_distance(distance + remaining));
            }
            remaining -= left_on_segment.max(0.);
            distance = 0.;
        }
        None
    }

    /// Markers of the segments completely behind `segment`, in path order.
    pub fn markers_passed(&self, segment: usize) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .take(segment)
            .flat_map(|s| s.markers().iter().map(String::as_str))
    }

    pub fn has_passed_marker(&self, marker: &str, segment: usize) -> bool {
        self.markers_passed(segment).any(|m| m == marker)
    }
}

impl<P> fmt::Display for Path<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            writeln!(f, "{segment}")?;
        }
        Ok(())
    }
}

//! Glues waypoints together into a multi segment [`Path`].
//!
//! Every interior waypoint is rounded off with an arc tangent to the two
//! straight legs meeting there. The legs are trimmed back by the waypoint's
//! blend radius to leave room for the arc.

use tracing::{debug, info, warn};

use super::{validate, Path, PathSegment, SegmentGeometry, Waypoint};
use crate::{
    config::PathConfig,
    error::{PathError, Result},
    math::{normal, Line, Point2, Vec2},
    trajectories::{
        MotionConstraints, MotionGoal, MotionState, ProfileGenerator, TrapezoidGenerator,
    },
};

/// Straight leg between two waypoints, trimmed at both ends by their blend radii.
#[derive(Debug, Clone, Copy)]
struct LineLeg {
    start: Point2,
    end: Point2,
    direction: Vec2,
    speed: f64,
    degenerate: bool,
}

impl LineLeg {
    fn new(a: &Waypoint, b: &Waypoint, epsilon: f64) -> Self {
        Self::with_trim(a, b, a.radius(), b.radius(), epsilon)
    }

    /// Leg from `a` right up to `b`, blend radii ignored.
    fn full(a: &Waypoint, b: &Waypoint, epsilon: f64) -> Self {
        Self::with_trim(a, b, 0., 0., epsilon)
    }

    fn with_trim(
        a: &Waypoint,
        b: &Waypoint,
        trim_start: f64,
        trim_end: f64,
        epsilon: f64,
    ) -> Self {
        let direction = b.position() - a.position();
        let norm = direction.norm();
        if !(norm > epsilon) {
            return Self {
                start: a.position(),
                end: b.position(),
                direction,
                speed: b.speed(),
                degenerate: true,
            };
        }
        Self {
            start: a.position() + direction * (trim_start / norm),
            end: b.position() - direction * (trim_end / norm),
            direction,
            speed: b.speed(),
            degenerate: false,
        }
    }

    /// Length left after trimming, negative when the two blends overlap.
    fn trimmed_length(&self) -> f64 {
        if self.degenerate {
            return 0.;
        }
        (self.end - self.start).dot(&self.direction) / self.direction.norm()
    }
}

/// Arc blending the corner at `b` between legs `a -> b` and `b -> c`.
#[derive(Debug, Clone, Copy)]
struct ArcBlend {
    leading: LineLeg,
    trailing: LineLeg,
    center: Option<Point2>,
    radius: f64,
    speed: f64,
}

impl ArcBlend {
    fn new(a: &Waypoint, b: &Waypoint, c: &Waypoint, epsilon: f64) -> Self {
        let leading = LineLeg::new(a, b, epsilon);
        let trailing = LineLeg::new(b, c, epsilon);
        let center = if leading.degenerate || trailing.degenerate {
            None
        } else {
            // the center sits on both legs' normals through the tangent points
            let to_center_a = Line::through(leading.end, normal(&leading.direction));
            let to_center_b = Line::through(trailing.start, normal(&trailing.direction));
            to_center_a.intersection_lines(&to_center_b).ok()
        };
        let radius = center.map_or(f64::INFINITY, |c| (c - leading.end).norm());
        Self {
            leading,
            trailing,
            center,
            radius,
            speed: (leading.speed + trailing.speed) / 2.,
        }
    }
}

/// Turns waypoint lists into [`Path`]s.
///
/// Holds the construction thresholds, the profile generator used for every
/// segment and the motion state the first segment starts from.
#[derive(Debug, Clone)]
pub struct PathBuilder<G = TrapezoidGenerator> {
    config: PathConfig,
    generator: G,
    initial_state: MotionState,
}

impl PathBuilder<TrapezoidGenerator> {
    pub fn new(config: PathConfig) -> Self {
        Self::with_generator(config, TrapezoidGenerator)
    }
}

impl Default for PathBuilder<TrapezoidGenerator> {
    fn default() -> Self {
        Self::new(PathConfig::default())
    }
}

impl<G: ProfileGenerator> PathBuilder<G> {
    pub fn with_generator(config: PathConfig, generator: G) -> Self {
        Self {
            config,
            generator,
            initial_state: MotionState::default(),
        }
    }

    /// Seed the first segment with `state` instead of standing still at 0.
    pub fn with_initial_state(mut self, state: MotionState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    pub fn build(&self, waypoints: &[Waypoint]) -> Result<Path<G::Profile>> {
        if waypoints.len() < 2 {
            return Err(PathError::NotEnoughWaypoints(waypoints.len()));
        }
        self.config.validate()?;

        let epsilon = self.config.epsilon;
        let mut assembly = Assembly::new(self);
        assembly.reach(&waypoints[0]);
        for window in waypoints.windows(3) {
            let arc = ArcBlend::new(&window[0], &window[1], &window[2], epsilon);
            assembly.push_line(&arc.leading, arc.speed);
            assembly.reach(&window[1]);
            assembly.push_arc(&arc);
        }

        let n = waypoints.len();
        // nothing to blend into on a single leg
        let last_leg = if n == 2 {
            LineLeg::full(&waypoints[0], &waypoints[1], epsilon)
        } else {
            LineLeg::new(&waypoints[n - 2], &waypoints[n - 1], epsilon)
        };
        assembly.push_line(&last_leg, 0.);
        assembly.reach(&waypoints[n - 1]);

        let mut path = assembly.finish()?;
        path.extrapolate_last();
        validate::verify_speeds(&mut path, &self.generator, &self.config)?;

        info!(
            waypoints = n,
            segments = path.len(),
            length = path.length(),
            duration = path.duration(),
            "built path"
        );
        Ok(path)
    }
}

/// Path under construction, never handed out before [`Assembly::finish`].
struct Assembly<'b, G: ProfileGenerator> {
    builder: &'b PathBuilder<G>,
    path: Path<G::Profile>,
    pending_markers: Vec<String>,
}

impl<'b, G: ProfileGenerator> Assembly<'b, G> {
    fn new(builder: &'b PathBuilder<G>) -> Self {
        Self {
            builder,
            path: Path::new(builder.initial_state),
            pending_markers: Vec::new(),
        }
    }

    /// The vehicle gets to `waypoint`, its marker goes on the next segment.
    fn reach(&mut self, waypoint: &Waypoint) {
        if let Some(marker) = waypoint.marker() {
            self.pending_markers.push(marker.to_owned());
        }
    }

    fn push_line(&mut self, leg: &LineLeg, end_speed: f64) {
        let length = leg.trimmed_length();
        if length <= self.builder.config.epsilon {
            if length < -self.builder.config.epsilon {
                warn!(
                    length,
                    "blend radii overlap between ({:.2}, {:.2}) and ({:.2}, {:.2}), dropping line",
                    leg.start.x,
                    leg.start.y,
                    leg.end.x,
                    leg.end.y
                );
            } else {
                debug!("skipping zero length line");
            }
            return;
        }
        self.push(
            SegmentGeometry::Line {
                start: leg.start,
                end: leg.end,
            },
            leg.speed,
            end_speed,
        );
    }

    fn push_arc(&mut self, arc: &ArcBlend) {
        let config = &self.builder.config;
        let center = match arc.center {
            Some(center) if arc.radius > config.epsilon && arc.radius < config.really_big_number => {
                center
            }
            _ => {
                debug!(radius = arc.radius, "corner is too sharp or too straight to blend");
                self.bridge(arc);
                return;
            }
        };
        self.push(
            SegmentGeometry::Arc {
                start: arc.leading.end,
                end: arc.trailing.start,
                center,
            },
            arc.speed,
            arc.trailing.speed,
        );
    }

    /// Straight line over the gap left between the trimmed legs when a near
    /// straight corner isn't blended.
    fn bridge(&mut self, arc: &ArcBlend) {
        if arc.leading.degenerate || arc.trailing.degenerate {
            return;
        }
        let gap = (arc.trailing.start - arc.leading.end).norm();
        if gap <= self.builder.config.epsilon {
            return;
        }
        self.push(
            SegmentGeometry::Line {
                start: arc.leading.end,
                end: arc.trailing.start,
            },
            arc.speed,
            arc.trailing.speed,
        );
    }

    fn push(&mut self, geometry: SegmentGeometry, max_speed: f64, end_speed: f64) {
        let start = self.path.last_motion_state();
        let constraints = MotionConstraints::new(max_speed, self.builder.config.max_accel);
        let goal = MotionGoal::new(start.pos + geometry.length(), end_speed);
        let profile = self.builder.generator.generate(constraints, goal, start);
        let segment = PathSegment::new(
            geometry,
            max_speed,
            end_speed,
            profile,
            std::mem::take(&mut self.pending_markers),
        );
        debug!(%segment, "adding segment");
        self.path.add_segment(segment);
    }

    fn finish(mut self) -> Result<Path<G::Profile>> {
        let leftover = std::mem::take(&mut self.pending_markers);
        match self.path.segments_mut().last_mut() {
            Some(last) => last.add_markers(leftover),
            None => return Err(PathError::NoSegments),
        }
        Ok(self.path)
    }
}

/// Build a path with the default configuration and trapezoidal profiles.
pub fn build_path_from_waypoints(waypoints: &[Waypoint]) -> Result<Path> {
    PathBuilder::default().build(waypoints)
}

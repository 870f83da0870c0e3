//! Speed schedule check run on every freshly built path.
//!
//! End speeds the vehicle can't brake down from within the next segment are
//! lowered, then every profile is regenerated from its predecessor's end
//! state so consecutive segments share their boundary state exactly.

use tracing::debug;

use super::Path;
use crate::{
    config::PathConfig,
    error::{PathError, Result},
    trajectories::{MotionConstraints, MotionGoal, MotionProfile, ProfileGenerator},
};

pub(crate) fn verify_speeds<G: ProfileGenerator>(
    path: &mut Path<G::Profile>,
    generator: &G,
    config: &PathConfig,
) -> Result<()> {
    for (i, segment) in path.segments().iter().enumerate() {
        let speed = segment.max_speed();
        if !(speed > 0. && speed.is_finite()) {
            return Err(PathError::InvalidSpeed { segment: i, speed });
        }
    }

    let allowed = allowed_end_speeds(path, config.max_accel);
    let mut state = path.initial_state();
    for (i, segment) in path.segments_mut().iter_mut().enumerate() {
        let allowed_end = allowed[i];
        if allowed_end < segment.end_speed() - config.speed_tolerance {
            debug!(
                segment = i,
                requested = segment.end_speed(),
                allowed = allowed_end,
                "lowering end speed"
            );
        }

        let length = segment.length();
        let goal = MotionGoal::new(state.pos + length, allowed_end);
        let constraints = MotionConstraints::new(segment.max_speed(), config.max_accel);
        let profile = generator.generate(constraints, goal, state);
        let end = profile.end_state();

        // squared speeds: a stop reached through rounding leaves a residue
        // far above `speed_tolerance` once square rooted
        let slack = 2. * config.max_accel * config.speed_tolerance;
        if end.vel > allowed_end && end.vel * end.vel > allowed_end * allowed_end + slack {
            return Err(PathError::InfeasibleSpeed {
                segment: i,
                reached: end.vel,
                allowed: allowed_end,
            });
        }
        if (end.pos - goal.pos).abs() > 1e-6 * goal.pos.abs().max(1.) {
            return Err(PathError::ProfileIncomplete {
                segment: i,
                reached: end.pos - state.pos,
                length,
            });
        }

        segment.reschedule(allowed_end, profile);
        state = end;
    }
    Ok(())
}

/// Highest speed each segment may end at so that every later segment can
/// still meet its own end speed, the last segment ending at rest.
fn allowed_end_speeds<P: MotionProfile>(path: &Path<P>, max_accel: f64) -> Vec<f64> {
    let segments = path.segments();
    let mut allowed = vec![0.; segments.len()];
    // fastest entry speed into the segment after the current one
    let mut next_entry = f64::INFINITY;
    let mut next_max = f64::INFINITY;
    for (i, segment) in segments.iter().enumerate().rev() {
        let end_speed = segment.end_speed().max(0.).min(next_entry).min(next_max);
        allowed[i] = end_speed;
        next_entry = (end_speed * end_speed + 2. * max_accel * segment.length()).sqrt();
        next_max = segment.max_speed();
    }
    allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        path::{PathBuilder, Waypoint},
        trajectories::MotionState,
    };
    use approx::assert_relative_eq;

    #[test]
    fn boundary_states_match_exactly() {
        let path = PathBuilder::default()
            .build(&[
                Waypoint::new(0., 0., 0., 60.),
                Waypoint::new(50., 0., 20., 60.),
                Waypoint::new(50., 50., 10., 30.),
                Waypoint::new(0., 80., 0., 45.),
            ])
            .expect("valid path");
        assert!(path.len() >= 4);
        for pair in path.segments().windows(2) {
            assert_eq!(pair[0].end_state(), pair[1].start_state());
        }
        assert_eq!(path.segments()[0].start_state(), MotionState::default());
        assert_relative_eq!(path.last_motion_state().pos, path.length(), epsilon = 1e-6);
        assert_relative_eq!(path.last_motion_state().vel, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn end_speed_is_lowered_before_a_short_segment() {
        // sharp corner, then a single unit to stop in
        let path = PathBuilder::default()
            .build(&[
                Waypoint::new(0., 0., 0., 100.),
                Waypoint::new(100., 0., 0., 100.),
                Waypoint::new(100., 1., 0., 100.),
            ])
            .expect("valid path");
        assert_eq!(path.len(), 2);
        let limit = (2. * 120. * 1.0_f64).sqrt();
        assert_relative_eq!(path.segments()[0].end_speed(), limit, epsilon = 1e-9);
        assert_relative_eq!(path.segments()[0].end_state().vel, limit, epsilon = 1e-6);
        assert_relative_eq!(path.segments()[1].end_state().vel, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn stopping_exactly_at_the_limit_is_not_infeasible() {
        // the last segment is entered at exactly sqrt(2 a L)
        let path = PathBuilder::default()
            .build(&[
                Waypoint::new(55., 70., 0., 75.),
                Waypoint::new(100., 185., 8., 63.),
                Waypoint::new(111., 116., 10., 11.),
                Waypoint::new(136., 72., 7., 88.),
                Waypoint::new(144., 86., 0., 91.),
            ])
            .expect("valid path");
        assert_relative_eq!(path.last_motion_state().vel, 0.0, epsilon = 1e-6);
        assert_relative_eq!(path.last_motion_state().pos, path.length(), epsilon = 1e-6);
    }

    #[test]
    fn too_fast_initial_state_is_rejected() {
        let result = PathBuilder::default()
            .with_initial_state(MotionState::new(0., 0., 200., 0.))
            .build(&[
                Waypoint::new(0., 0., 0., 60.),
                Waypoint::new(10., 0., 0., 60.),
            ]);
        assert!(matches!(
            result,
            Err(PathError::InfeasibleSpeed { segment: 0, .. })
        ));
    }

    #[test]
    fn unusable_speeds_are_rejected() {
        let result = PathBuilder::default().build(&[
            Waypoint::new(0., 0., 0., 60.),
            Waypoint::new(10., 0., 0., 0.),
        ]);
        assert!(matches!(
            result,
            Err(PathError::InvalidSpeed { segment: 0, .. })
        ));

        let result = PathBuilder::default().build(&[
            Waypoint::new(0., 0., 0., 60.),
            Waypoint::new(10., 0., 0., f64::NAN),
        ]);
        assert!(matches!(
            result,
            Err(PathError::InvalidSpeed { segment: 0, .. })
        ));
    }
}

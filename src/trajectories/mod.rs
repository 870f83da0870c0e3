//! Motion profiles: velocity schedules along a one dimensional distance axis.
//!
//! A [`ProfileGenerator`] turns a start [`MotionState`], a [`MotionGoal`] and
//! [`MotionConstraints`] into a [`MotionProfile`] that can be sampled by
//! position. Path segments only rely on this contract, the numeric synthesis
//! lives behind the generator.

mod trapezoid;

pub use trapezoid::{TrapezoidGenerator, TrapezoidProfile};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-domain view of a profile.
pub trait Trajectory<P, V> {
    fn get_position(&self, t: f64) -> P;
    fn get_velocity(&self, t: f64) -> V;
    fn get_acceleration(&self, t: f64) -> V;
    fn get_total_runtime(&self) -> f64;
    fn get_final_destination(&self) -> P;
    fn get_max_speed(&self) -> Option<V>;
    fn get_time_sections(&self) -> impl Iterator<Item = f64>;
}

/// Kinematic state of the vehicle along the distance axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// time (s)
    pub t: f64,
    /// distance travelled
    pub pos: f64,
    pub vel: f64,
    pub acc: f64,
}

impl MotionState {
    pub fn new(t: f64, pos: f64, vel: f64, acc: f64) -> Self {
        Self { t, pos, vel, acc }
    }

    /// State after holding `acc` constant for `dt` seconds.
    pub fn extrapolate(&self, dt: f64) -> Self {
        Self {
            t: self.t + dt,
            pos: self.pos + self.vel * dt + 0.5 * self.acc * dt * dt,
            vel: self.vel + self.acc * dt,
            acc: self.acc,
        }
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(t={:.3}, pos={:.3}, vel={:.3}, acc={:.3})",
            self.t, self.pos, self.vel, self.acc
        )
    }
}

/// Bounds a profile must respect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionConstraints {
    pub max_vel: f64,
    pub max_accel: f64,
}

impl MotionConstraints {
    pub fn new(max_vel: f64, max_accel: f64) -> Self {
        Self { max_vel, max_accel }
    }
}

/// Where a profile should end and how fast it should be going there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionGoal {
    pub pos: f64,
    pub vel: f64,
}

impl MotionGoal {
    pub fn new(pos: f64, vel: f64) -> Self {
        Self { pos, vel }
    }
}

/// A velocity schedule over the position domain `[start_pos, end_pos]`.
pub trait MotionProfile {
    fn start_state(&self) -> MotionState;

    fn end_state(&self) -> MotionState;

    /// First scheduled state at `pos`, `None` if `pos` is never reached.
    fn first_state_by_pos(&self, pos: f64) -> Option<MotionState>;

    fn start_pos(&self) -> f64 {
        self.start_state().pos
    }

    fn end_pos(&self) -> f64 {
        self.end_state().pos
    }
}

/// Builds profiles. Path construction takes one of these explicitly instead of
/// reaching for a global solver.
pub trait ProfileGenerator {
    type Profile: MotionProfile;

    fn generate(
        &self,
        constraints: MotionConstraints,
        goal: MotionGoal,
        start: MotionState,
    ) -> Self::Profile;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn extrapolate_constant_acceleration() {
        let s = MotionState::new(1.0, 2.0, 3.0, 4.0).extrapolate(0.5);
        assert_relative_eq!(s.t, 1.5);
        assert_relative_eq!(s.pos, 2.0 + 1.5 + 0.5);
        assert_relative_eq!(s.vel, 5.0);
        assert_relative_eq!(s.acc, 4.0);
    }

    #[test]
    fn display_is_compact() {
        let s = MotionState::new(0.0, 1.0, 2.0, 0.0);
        assert_eq!(s.to_string(), "(t=0.000, pos=1.000, vel=2.000, acc=0.000)");
    }
}

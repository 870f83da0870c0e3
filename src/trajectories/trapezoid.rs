// Trapezoidal velocity profile along a distance axis, bang-bang style:
// change speed at full acceleration, cruise, change speed again.

use std::cmp::Ordering;

use super::{
    MotionConstraints, MotionGoal, MotionProfile, MotionState, ProfileGenerator, Trajectory,
};

/// Parts shorter than this (s) are dropped.
const PART_EPSILON: f64 = 1e-9;
/// Slack when matching a queried position against a part's range.
const POS_EPSILON: f64 = 1e-6;
/// Relative slack on squared speeds when deciding whether the goal speed is reachable.
const SPEED_SQ_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct TrapezoidPart {
    end_time: f64,
    initial_pos: f64,
    initial_vel: f64,
    accel: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrapezoidProfile {
    start: MotionState,
    parts: [TrapezoidPart; 3],
    n_parts: usize,
}

/// Default [`ProfileGenerator`], produces [`TrapezoidProfile`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapezoidGenerator;

impl ProfileGenerator for TrapezoidGenerator {
    type Profile = TrapezoidProfile;

    fn generate(
        &self,
        constraints: MotionConstraints,
        goal: MotionGoal,
        start: MotionState,
    ) -> TrapezoidProfile {
        TrapezoidProfile::new(constraints, goal, start)
    }
}

/// distance needed to go from `v0` to `v1` at `a_max`
fn dist_to_change_speed(v0: f64, v1: f64, a_max: f64) -> f64 {
    (v1 * v1 - v0 * v0).abs() / (2. * a_max)
}

/// time needed to cover `dx` starting at `v0` under constant `accel`
fn time_to_cover(v0: f64, accel: f64, dx: f64) -> f64 {
    if dx <= 0. {
        return 0.;
    }
    if accel.abs() < f64::EPSILON {
        return if v0 > 0. { dx / v0 } else { 0. };
    }
    let discriminant = (v0 * v0 + 2. * accel * dx).max(0.);
    (-v0 + discriminant.sqrt()) / accel
}

impl TrapezoidProfile {
    /// Fastest forward profile from `start` to `goal` under `constraints`.
    ///
    /// When the goal speed can't be reached within the distance the profile
    /// changes speed at full acceleration over the whole distance and ends at
    /// whatever speed it reached. Non positive bounds or distances produce a
    /// profile that never leaves `start`.
    pub fn new(constraints: MotionConstraints, goal: MotionGoal, start: MotionState) -> Self {
        let mut profile = Self {
            start,
            ..Default::default()
        };

        let a = constraints.max_accel;
        let v_max = constraints.max_vel;
        let distance = goal.pos - start.pos;
        if !(a > 0. && a.is_finite()) || !(v_max > 0.) || !(distance > 0. && distance.is_finite())
        {
            return profile;
        }

        // profiles only ever move forward
        let v0 = start.vel.max(0.);
        let vf = goal.vel.max(0.).min(v_max);

        let v_full_accel = (v0 * v0 + 2. * a * distance).sqrt();
        if v_full_accel <= vf {
            profile.push_part(v0, a, (v_full_accel - v0) / a);
            return profile;
        }

        // rounding in v0 must not turn an exact stop into a flat out brake
        let v_full_brake_sq = v0 * v0 - 2. * a * distance;
        if v_full_brake_sq - vf * vf > SPEED_SQ_EPSILON * (v0 * v0).max(1.) {
            let v_end = v_full_brake_sq.max(0.).sqrt();
            profile.push_part(v0, -a, (v0 - v_end) / a);
            return profile;
        }

        // peak speed of the triangle profile, capped by the cruise limit
        let v_peak = ((2. * a * distance + v0 * v0 + vf * vf) / 2.).sqrt();
        let v_cruise = v_peak.min(v_max);

        let d_first = dist_to_change_speed(v0, v_cruise, a);
        let d_last = dist_to_change_speed(v_cruise, vf, a);
        let d_cruise = (distance - d_first - d_last).max(0.);

        let first_accel = if v_cruise >= v0 { a } else { -a };
        profile.push_part(v0, first_accel, (v_cruise - v0).abs() / a);
        if v_cruise > 0. {
            profile.push_part(v_cruise, 0., d_cruise / v_cruise);
        }
        profile.push_part(v_cruise, -a, (v_cruise - vf) / a);
        profile
    }

    fn push_part(&mut self, initial_vel: f64, accel: f64, duration: f64) {
        if !(duration > PART_EPSILON) || self.n_parts >= self.parts.len() {
            return;
        }
        let (start_time, initial_pos) = match self.n_parts {
            0 => (self.start.t, self.start.pos),
            n => {
                let previous = self.part_state(n - 1, self.parts[n - 1].end_time);
                (previous.t, previous.pos)
            }
        };
        self.parts[self.n_parts] = TrapezoidPart {
            end_time: start_time + duration,
            initial_pos,
            initial_vel,
            accel,
        };
        self.n_parts += 1;
    }

    fn part_start_time(&self, idx: usize) -> f64 {
        if idx < 1 {
            self.start.t
        } else {
            self.parts[idx - 1].end_time
        }
    }

    fn part_state(&self, idx: usize, t: f64) -> MotionState {
        let part = self.parts[idx];
        let t0 = self.part_start_time(idx);
        MotionState::new(t0, part.initial_pos, part.initial_vel, part.accel).extrapolate(t - t0)
    }

    fn find_part_idx(&self, t: f64) -> usize {
        for i in 0..self.n_parts {
            if t < self.parts[i].end_time {
                return i;
            }
        }
        self.n_parts.saturating_sub(1)
    }

    /// Number of constant acceleration parts.
    pub fn len(&self) -> usize {
        self.n_parts
    }

    pub fn is_empty(&self) -> bool {
        self.n_parts == 0
    }
}

impl MotionProfile for TrapezoidProfile {
    fn start_state(&self) -> MotionState {
        self.start
    }

    fn end_state(&self) -> MotionState {
        match self.n_parts {
            0 => self.start,
            n => self.part_state(n - 1, self.parts[n - 1].end_time),
        }
    }

    fn first_state_by_pos(&self, pos: f64) -> Option<MotionState> {
        if !pos.is_finite() {
            return None;
        }
        if self.n_parts == 0 {
            return ((pos - self.start.pos).abs() <= POS_EPSILON).then_some(self.start);
        }
        for i in 0..self.n_parts {
            let part = self.parts[i];
            if pos < part.initial_pos - POS_EPSILON {
                return None;
            }
            let part_end = self.part_state(i, part.end_time);
            if pos <= part_end.pos + POS_EPSILON {
                let t0 = self.part_start_time(i);
                let dt = time_to_cover(part.initial_vel, part.accel, pos - part.initial_pos)
                    .max(0.)
                    .min(part.end_time - t0);
                return Some(self.part_state(i, t0 + dt));
            }
        }
        None
    }
}

impl Trajectory<f64, f64> for TrapezoidProfile {
    fn get_position(&self, tt: f64) -> f64 {
        let traj_time = tt.max(self.start.t);
        if self.n_parts == 0 || traj_time >= self.end_state().t {
            return self.end_state().pos;
        }
        self.part_state(self.find_part_idx(traj_time), traj_time).pos
    }

    fn get_velocity(&self, tt: f64) -> f64 {
        let traj_time = tt.max(self.start.t);
        if self.n_parts == 0 || traj_time >= self.end_state().t {
            // requested time beyond final element, hold the final speed
            return self.end_state().vel.max(0.);
        }
        self.part_state(self.find_part_idx(traj_time), traj_time).vel
    }

    fn get_acceleration(&self, tt: f64) -> f64 {
        let traj_time = tt.max(self.start.t);
        if self.n_parts == 0 || traj_time >= self.end_state().t {
            return 0.0;
        }
        self.parts[self.find_part_idx(traj_time)].accel
    }

    fn get_total_runtime(&self) -> f64 {
        self.end_state().t - self.start.t
    }

    fn get_final_destination(&self) -> f64 {
        self.end_state().pos
    }

    fn get_max_speed(&self) -> Option<f64> {
        std::iter::once(self.start.vel)
            .chain(self.get_time_sections().map(|t| self.get_velocity(t - PART_EPSILON)))
            .chain(std::iter::once(self.end_state().vel))
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }

    fn get_time_sections(&self) -> impl Iterator<Item = f64> {
        self.parts[..self.n_parts].iter().map(|p| p.end_time)
    }
}

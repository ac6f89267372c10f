//! Time-parameterised paths and the planner port that produces them.
//!
//! The core treats path generation as an external collaborator behind
//! [`PathPlanner`].  [`PolylinePlanner`] is the built-in implementation:
//! straight segments through the waypoints with a trapezoidal speed
//! profile over the total length.  It is deliberately simple; a spline
//! planner can be dropped in behind the same trait.
//!
//! ```text
//!   speed
//!     ▲      ┌──────────────┐
//!     │     ╱                ╲
//!     │    ╱   cruise         ╲
//!     │   ╱                    ╲
//!     └──┴──────────────────────┴──▶ time
//!       accel                 decel
//! ```

use core::f64::consts::PI;

use super::geometry::{lerp_angle, wrap_angle, Pose2d, Translation2d};
use crate::error::PathError;

/// Spacing between generated trajectory samples (s).
const SAMPLE_PERIOD_SECS: f64 = 0.02;

/// Velocity and acceleration limits shared by a family of paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryConfig {
    pub max_velocity_mps: f64,
    pub max_accel_mps2: f64,
    /// Drive the path backwards: headings face away from the direction
    /// of travel and velocities are negative.
    pub reversed: bool,
}

impl TrajectoryConfig {
    pub fn new(max_velocity_mps: f64, max_accel_mps2: f64) -> Self {
        Self {
            max_velocity_mps,
            max_accel_mps2,
            reversed: false,
        }
    }

    #[must_use]
    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }
}

/// One sample along a trajectory.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrajectoryState {
    /// Time since the start of the trajectory (s).
    pub time_secs: f64,
    /// Signed speed along the path (m/s); negative when reversed.
    pub velocity_mps: f64,
    /// Desired pose; `rotation` is the robot heading at this point.
    pub pose: Pose2d,
}

/// An immutable, time-ordered list of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    states: Vec<TrajectoryState>,
}

impl Trajectory {
    /// Wrap pre-computed samples.  Samples must be sorted by time.
    pub fn new(states: Vec<TrajectoryState>) -> Result<Self, PathError> {
        if states.is_empty() {
            return Err(PathError::ZeroLength);
        }
        if states.iter().any(|s| !(s.time_secs.is_finite() && s.pose.is_finite())) {
            return Err(PathError::NonFinite);
        }
        Ok(Self { states })
    }

    pub fn states(&self) -> &[TrajectoryState] {
        &self.states
    }

    pub fn total_time(&self) -> f64 {
        self.states.last().map_or(0.0, |s| s.time_secs)
    }

    pub fn initial_pose(&self) -> Pose2d {
        self.states[0].pose
    }

    pub fn final_pose(&self) -> Pose2d {
        self.states[self.states.len() - 1].pose
    }

    /// Interpolated state at time `t`, clamped to the trajectory's span.
    pub fn sample(&self, t: f64) -> TrajectoryState {
        let idx = self.states.partition_point(|s| s.time_secs <= t);
        if idx == 0 {
            return self.states[0];
        }
        if idx >= self.states.len() {
            return self.states[self.states.len() - 1];
        }
        let prev = self.states[idx - 1];
        let next = self.states[idx];
        let span = next.time_secs - prev.time_secs;
        let frac = if span > 0.0 { (t - prev.time_secs) / span } else { 0.0 };
        TrajectoryState {
            time_secs: t,
            velocity_mps: prev.velocity_mps + (next.velocity_mps - prev.velocity_mps) * frac,
            pose: Pose2d {
                translation: prev.pose.translation.lerp(next.pose.translation, frac),
                rotation: lerp_angle(prev.pose.rotation, next.pose.rotation, frac),
            },
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Planner port
// ───────────────────────────────────────────────────────────────

/// Builds a trajectory from a start pose, interior waypoints and an end pose.
pub trait PathPlanner {
    fn generate(
        &self,
        start: Pose2d,
        interior: &[Translation2d],
        end: Pose2d,
        config: &TrajectoryConfig,
    ) -> Result<Trajectory, PathError>;
}

/// Straight-segment planner with a trapezoidal speed profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolylinePlanner;

impl PathPlanner for PolylinePlanner {
    fn generate(
        &self,
        start: Pose2d,
        interior: &[Translation2d],
        end: Pose2d,
        config: &TrajectoryConfig,
    ) -> Result<Trajectory, PathError> {
        let (v_max, a_max) = (config.max_velocity_mps, config.max_accel_mps2);
        if !(v_max.is_finite() && a_max.is_finite()) {
            return Err(PathError::NonFinite);
        }
        if v_max <= 0.0 || a_max <= 0.0 {
            return Err(PathError::InvalidConstraints);
        }

        let mut points = Vec::with_capacity(interior.len() + 2);
        points.push(start.translation);
        points.extend_from_slice(interior);
        points.push(end.translation);
        if !(start.is_finite() && end.is_finite() && points.iter().all(Translation2d::is_finite)) {
            return Err(PathError::NonFinite);
        }

        let polyline = Polyline::new(points);
        let length = polyline.length();
        if length < 1e-9 {
            return Err(PathError::ZeroLength);
        }

        let profile = Profile::new(length, v_max, a_max);
        let total = profile.total_time();
        let steps = (total / SAMPLE_PERIOD_SECS).ceil() as usize;

        let mut states = Vec::with_capacity(steps + 1);
        for k in 0..=steps {
            let t = (k as f64 * SAMPLE_PERIOD_SECS).min(total);
            let (distance, speed) = profile.at(t);
            let (position, direction) = polyline.at(distance);
            let (heading, velocity) = if config.reversed {
                (wrap_angle(direction + PI), -speed)
            } else {
                (direction, speed)
            };
            states.push(TrajectoryState {
                time_secs: t,
                velocity_mps: velocity,
                pose: Pose2d {
                    translation: position,
                    rotation: heading,
                },
            });
        }
        Trajectory::new(states)
    }
}

// ── Internal ──────────────────────────────────────────────────

struct Polyline {
    points: Vec<Translation2d>,
    /// Cumulative distance at each point.
    cumulative: Vec<f64>,
}

impl Polyline {
    fn new(points: Vec<Translation2d>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in points.windows(2) {
            total += pair[0].distance(pair[1]);
            cumulative.push(total);
        }
        Self { points, cumulative }
    }

    fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Position and travel direction at arc length `s`.
    fn at(&self, s: f64) -> (Translation2d, f64) {
        let s = s.clamp(0.0, self.length());
        let mut found = None;
        for i in 0..self.points.len() - 1 {
            let seg = self.cumulative[i + 1] - self.cumulative[i];
            if seg < 1e-12 {
                continue;
            }
            found = Some(i);
            if s <= self.cumulative[i + 1] {
                break;
            }
        }
        // length() > 0 guarantees at least one non-degenerate segment.
        let i = found.unwrap_or(0);
        let (a, b) = (self.points[i], self.points[i + 1]);
        let seg = self.cumulative[i + 1] - self.cumulative[i];
        let frac = if seg > 0.0 { ((s - self.cumulative[i]) / seg).clamp(0.0, 1.0) } else { 0.0 };
        (a.lerp(b, frac), (b.y - a.y).atan2(b.x - a.x))
    }
}

/// Trapezoidal (or triangular, for short paths) speed profile.
struct Profile {
    length: f64,
    accel: f64,
    peak: f64,
    accel_time: f64,
    cruise_time: f64,
}

impl Profile {
    fn new(length: f64, v_max: f64, a_max: f64) -> Self {
        let accel_dist = v_max * v_max / (2.0 * a_max);
        let (peak, cruise_time) = if 2.0 * accel_dist >= length {
            ((a_max * length).sqrt(), 0.0)
        } else {
            (v_max, (length - 2.0 * accel_dist) / v_max)
        };
        Self {
            length,
            accel: a_max,
            peak,
            accel_time: peak / a_max,
            cruise_time,
        }
    }

    fn total_time(&self) -> f64 {
        2.0 * self.accel_time + self.cruise_time
    }

    /// Distance travelled and speed at time `t`.
    fn at(&self, t: f64) -> (f64, f64) {
        let t = t.clamp(0.0, self.total_time());
        if t < self.accel_time {
            (0.5 * self.accel * t * t, self.accel * t)
        } else if t < self.accel_time + self.cruise_time {
            let ramp = 0.5 * self.accel * self.accel_time * self.accel_time;
            (ramp + self.peak * (t - self.accel_time), self.peak)
        } else {
            let remaining = (self.total_time() - t).max(0.0);
            (
                self.length - 0.5 * self.accel * remaining * remaining,
                self.accel * remaining,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(reversed: bool) -> Trajectory {
        let heading = if reversed { PI } else { 0.0 };
        PolylinePlanner
            .generate(
                Pose2d::new(0.0, 0.0, heading),
                &[Translation2d::new(1.0, 0.0)],
                Pose2d::new(1.5, 0.0, heading),
                &TrajectoryConfig::new(3.0, 3.0).with_reversed(reversed),
            )
            .unwrap()
    }

    #[test]
    fn short_path_uses_triangular_profile() {
        let traj = straight(false);
        // Peak = sqrt(a * L) = sqrt(4.5); total = 2 * peak / a.
        let expected = 2.0 * 4.5_f64.sqrt() / 3.0;
        assert!((traj.total_time() - expected).abs() < 1e-9);
        assert!(traj.states().iter().all(|s| s.velocity_mps <= 4.5_f64.sqrt() + 1e-9));
    }

    #[test]
    fn path_starts_and_ends_at_waypoints() {
        let traj = straight(false);
        assert!(traj.initial_pose().translation.distance(Translation2d::new(0.0, 0.0)) < 1e-9);
        assert!(traj.final_pose().translation.distance(Translation2d::new(1.5, 0.0)) < 1e-9);
        assert!(traj.sample(traj.total_time()).velocity_mps.abs() < 1e-9);
    }

    #[test]
    fn reversed_path_faces_backwards_with_negative_speed() {
        let traj = straight(true);
        assert!((traj.initial_pose().rotation.abs() - PI).abs() < 1e-9);
        let mid = traj.sample(traj.total_time() / 2.0);
        assert!(mid.velocity_mps < 0.0);
        assert!(mid.pose.x() > 0.0 && mid.pose.x() < 1.5);
    }

    #[test]
    fn long_path_reaches_cruise_speed() {
        let traj = PolylinePlanner
            .generate(
                Pose2d::new(0.0, 0.0, 0.0),
                &[],
                Pose2d::new(10.0, 0.0, 0.0),
                &TrajectoryConfig::new(2.0, 4.0),
            )
            .unwrap();
        // accel 0.5 s each end covering 0.5 m each, 9 m cruise at 2 m/s.
        assert!((traj.total_time() - 5.5).abs() < 1e-9);
        assert!((traj.sample(2.0).velocity_mps - 2.0).abs() < 1e-9);
    }

    #[test]
    fn sample_clamps_outside_span() {
        let traj = straight(false);
        assert_eq!(traj.sample(-1.0), traj.states()[0]);
        assert_eq!(traj.sample(100.0), *traj.states().last().unwrap());
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let cfg = TrajectoryConfig::new(3.0, 3.0);
        let origin = Pose2d::new(0.0, 0.0, 0.0);
        assert_eq!(
            PolylinePlanner.generate(origin, &[], origin, &cfg),
            Err(PathError::ZeroLength)
        );
        assert_eq!(
            PolylinePlanner.generate(origin, &[], Pose2d::new(f64::NAN, 0.0, 0.0), &cfg),
            Err(PathError::NonFinite)
        );
        assert_eq!(
            PolylinePlanner.generate(origin, &[], Pose2d::new(1.0, 0.0, 0.0), &TrajectoryConfig::new(0.0, 3.0)),
            Err(PathError::InvalidConstraints)
        );
    }

    #[test]
    fn corner_changes_direction() {
        let traj = PolylinePlanner
            .generate(
                Pose2d::new(0.0, 0.0, 0.0),
                &[Translation2d::new(1.0, 0.0)],
                Pose2d::new(1.0, 1.0, 0.0),
                &TrajectoryConfig::new(1.0, 1.0),
            )
            .unwrap();
        let late = traj.sample(traj.total_time() * 0.9);
        assert!((late.pose.rotation - PI / 2.0).abs() < 1e-9);
    }
}

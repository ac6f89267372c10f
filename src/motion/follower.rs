//! Holonomic trajectory follower.
//!
//! Each step samples the trajectory at the elapsed time, adds P
//! corrections on x, y and heading to the feed-forward velocity, and
//! converts the result into swerve module targets.  Heading is held at
//! the trajectory's final rotation for the whole run.

use std::sync::Arc;

use super::geometry::Pose2d;
use super::kinematics::{desaturate, ChassisSpeeds, SwerveKinematics, SwerveModuleState, MODULE_COUNT};
use super::pid::PidController;
use super::trajectory::Trajectory;
use crate::config::RobotConfig;

#[derive(Debug, Clone)]
pub struct PathFollower {
    trajectory: Arc<Trajectory>,
    kinematics: SwerveKinematics,
    x: PidController,
    y: PidController,
    theta: PidController,
    max_module_speed: f64,
    period_secs: f64,
    elapsed_ticks: u32,
}

impl PathFollower {
    pub fn new(trajectory: Arc<Trajectory>, config: &RobotConfig) -> Self {
        let mut theta = PidController::proportional(config.auto.kp_theta);
        theta.enable_continuous_input();
        let w = config.auto.max_angular_speed_rps;
        theta.set_limits(-w, w);

        Self {
            trajectory,
            kinematics: SwerveKinematics::rectangular(
                config.drive.wheel_base_m,
                config.drive.track_width_m,
            ),
            x: PidController::proportional(config.auto.kp_x),
            y: PidController::proportional(config.auto.kp_y),
            theta,
            max_module_speed: config.drive.max_speed_mps,
            period_secs: config.period_secs(),
            elapsed_ticks: 0,
        }
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Restart from the beginning of the trajectory.
    pub fn reset(&mut self) {
        self.elapsed_ticks = 0;
        self.x.reset();
        self.y.reset();
        self.theta.reset();
    }

    pub fn elapsed_secs(&self) -> f64 {
        f64::from(self.elapsed_ticks) * self.period_secs
    }

    /// True once the elapsed time covers the whole trajectory.
    pub fn is_finished(&self) -> bool {
        self.elapsed_secs() >= self.trajectory.total_time()
    }

    /// Advance one period from the measured pose.
    pub fn step(&mut self, pose: Pose2d) -> [SwerveModuleState; MODULE_COUNT] {
        let dt = self.period_secs;
        let desired = self.trajectory.sample(self.elapsed_secs());
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);

        let (sin, cos) = desired.pose.rotation.sin_cos();
        let vx = desired.velocity_mps * cos + self.x.calculate(pose.x(), desired.pose.x(), dt);
        let vy = desired.velocity_mps * sin + self.y.calculate(pose.y(), desired.pose.y(), dt);
        let omega = self.theta.calculate(
            pose.rotation,
            self.trajectory.final_pose().rotation,
            dt,
        );

        let speeds = ChassisSpeeds::from_field_relative(vx, vy, omega, pose.rotation);
        let mut states = self.kinematics.to_module_states(speeds);
        desaturate(&mut states, self.max_module_speed);
        states
    }
}

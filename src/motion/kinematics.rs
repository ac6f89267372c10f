//! Swerve drive kinematics.
//!
//! Converts a desired chassis velocity into one speed/angle pair per
//! module.  Module order is front-left, front-right, rear-left, rear-right,
//! matching [`DrivePort::set_module_states`](crate::app::ports::DrivePort::set_module_states).

use super::geometry::Translation2d;

/// Number of swerve modules on the drivetrain.
pub const MODULE_COUNT: usize = 4;

/// Robot-relative chassis velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChassisSpeeds {
    /// Forward velocity (m/s).
    pub vx: f64,
    /// Leftward velocity (m/s).
    pub vy: f64,
    /// Counter-clockwise rate (rad/s).
    pub omega: f64,
}

impl ChassisSpeeds {
    /// Convert a field-relative velocity into the robot frame given the
    /// robot's current heading.
    pub fn from_field_relative(vx: f64, vy: f64, omega: f64, heading: f64) -> Self {
        let (sin, cos) = heading.sin_cos();
        Self {
            vx: vx * cos + vy * sin,
            vy: -vx * sin + vy * cos,
            omega,
        }
    }
}

/// Target for a single module.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SwerveModuleState {
    /// Wheel speed (m/s).
    pub speed_mps: f64,
    /// Steering angle (rad), robot frame.
    pub angle: f64,
}

#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    modules: [Translation2d; MODULE_COUNT],
}

impl SwerveKinematics {
    pub fn new(modules: [Translation2d; MODULE_COUNT]) -> Self {
        Self { modules }
    }

    /// Rectangular chassis with modules at the corners.
    pub fn rectangular(wheel_base_m: f64, track_width_m: f64) -> Self {
        let (hx, hy) = (wheel_base_m / 2.0, track_width_m / 2.0);
        Self::new([
            Translation2d::new(hx, hy),
            Translation2d::new(hx, -hy),
            Translation2d::new(-hx, hy),
            Translation2d::new(-hx, -hy),
        ])
    }

    pub fn to_module_states(&self, speeds: ChassisSpeeds) -> [SwerveModuleState; MODULE_COUNT] {
        let mut states = [SwerveModuleState::default(); MODULE_COUNT];
        for (state, pos) in states.iter_mut().zip(&self.modules) {
            let vx = speeds.vx - speeds.omega * pos.y;
            let vy = speeds.vy + speeds.omega * pos.x;
            state.speed_mps = vx.hypot(vy);
            state.angle = if state.speed_mps > 1e-9 { vy.atan2(vx) } else { 0.0 };
        }
        states
    }
}

/// Scale every module down proportionally so none exceeds `max_speed`.
pub fn desaturate(states: &mut [SwerveModuleState; MODULE_COUNT], max_speed: f64) {
    let fastest = states.iter().map(|s| s.speed_mps.abs()).fold(0.0, f64::max);
    if fastest > max_speed && fastest > 0.0 {
        let scale = max_speed / fastest;
        for s in states.iter_mut() {
            s.speed_mps *= scale;
        }
    }
}

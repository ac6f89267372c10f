//! Robot configuration parameters
//!
//! All tunable constants for the controller: loop period, drive scaling,
//! autonomous path limits and gains, shooter and intake timings.
//! Values can be overridden from a JSON file at startup.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core robot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Scheduler period (milliseconds)
    pub period_ms: u32,
    pub drive: DriveConfig,
    pub auto: AutoConfig,
    pub shooter: ShooterConfig,
    pub intake: IntakeConfig,
    /// Left trigger axis value above which the shoot binding fires
    pub shoot_trigger_threshold: f64,
}

/// Drivetrain geometry and operator scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Stick deadband applied before scaling
    pub deadband: f64,
    /// Multiplier on every stick input in teleop (0-1)
    pub input_scale: f64,
    /// Maximum module wheel speed (m/s)
    pub max_speed_mps: f64,
    /// Distance between left and right wheels (m)
    pub track_width_m: f64,
    /// Distance between front and back wheels (m)
    pub wheel_base_m: f64,
}

/// Autonomous path-following limits and gains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoConfig {
    pub max_speed_mps: f64,
    pub max_accel_mps2: f64,
    pub max_angular_speed_rps: f64,
    pub kp_x: f64,
    pub kp_y: f64,
    pub kp_theta: f64,
}

/// Shooter timings for the shoot-note routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShooterConfig {
    /// Shooter wheel command while shooting (-1..1)
    pub shot_speed: f64,
    /// Spin-up time before the note is fed (s)
    pub spin_up_secs: f64,
    /// Time the intake feeds the note into the shooter (s)
    pub feed_secs: f64,
    /// Shooter command while hand-feeding (Y button)
    pub hand_feed_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Roller command while collecting a note (-1..1)
    pub intake_speed: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            period_ms: 20, // 50 Hz
            drive: DriveConfig {
                deadband: 0.08,
                input_scale: 0.5,
                max_speed_mps: 4.8,
                track_width_m: 0.6731, // 26.5 in
                wheel_base_m: 0.6731,
            },
            auto: AutoConfig {
                max_speed_mps: 3.0,
                max_accel_mps2: 3.0,
                max_angular_speed_rps: core::f64::consts::PI,
                kp_x: 1.0,
                kp_y: 1.0,
                kp_theta: 1.0,
            },
            shooter: ShooterConfig {
                shot_speed: 1.0,
                spin_up_secs: 1.0,
                feed_secs: 0.25,
                hand_feed_speed: -0.2,
            },
            intake: IntakeConfig { intake_speed: 0.5 },
            shoot_trigger_threshold: 0.75,
        }
    }
}

impl RobotConfig {
    /// Seconds per scheduler tick.
    pub fn period_secs(&self) -> f64 {
        f64::from(self.period_ms) / 1000.0
    }

    /// Number of whole ticks covering `secs`, rounded up.
    /// Negative or NaN durations count as zero.
    pub fn ticks_for(&self, secs: f64) -> u32 {
        if secs.is_nan() || secs <= 0.0 {
            return 0;
        }
        let ticks = (secs / self.period_secs() - 1e-9).ceil();
        if ticks >= f64::from(u32::MAX) { u32::MAX } else { ticks as u32 }
    }

    /// Parse a JSON document and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the controller misbehave.
    /// Invalid ranges are rejected, never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.period_ms == 0 {
            return Err(Error::Config("period_ms must be positive"));
        }
        let d = &self.drive;
        if !(0.0..1.0).contains(&d.deadband) {
            return Err(Error::Config("deadband must be in [0, 1)"));
        }
        if !(d.input_scale > 0.0 && d.input_scale <= 1.0) {
            return Err(Error::Config("input_scale must be in (0, 1]"));
        }
        for (value, what) in [
            (d.max_speed_mps, "drive.max_speed_mps must be positive"),
            (d.track_width_m, "track_width_m must be positive"),
            (d.wheel_base_m, "wheel_base_m must be positive"),
            (self.auto.max_speed_mps, "auto.max_speed_mps must be positive"),
            (self.auto.max_accel_mps2, "auto.max_accel_mps2 must be positive"),
            (self.auto.max_angular_speed_rps, "max_angular_speed_rps must be positive"),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(what));
            }
        }
        let a = &self.auto;
        if ![a.kp_x, a.kp_y, a.kp_theta].iter().all(|k| k.is_finite() && *k >= 0.0) {
            return Err(Error::Config("path gains must be finite and non-negative"));
        }
        let s = &self.shooter;
        if !(s.spin_up_secs >= 0.0 && s.feed_secs >= 0.0) {
            return Err(Error::Config("shooter timings must be non-negative"));
        }
        for speed in [s.shot_speed, s.hand_feed_speed, self.intake.intake_speed] {
            if !(-1.0..=1.0).contains(&speed) {
                return Err(Error::Config("motor commands must be in [-1, 1]"));
            }
        }
        if !(0.0..=1.0).contains(&self.shoot_trigger_threshold) {
            return Err(Error::Config("shoot_trigger_threshold must be in [0, 1]"));
        }
        Ok(())
    }
}

//! PID controller for path-following corrections
//!
//! Simple proportional-integral-derivative controller.  One instance per
//! degree of freedom (x, y, heading); the heading instance runs with
//! continuous input so that errors wrap across ±π.

use super::geometry::wrap_angle;

/// PID controller
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    integral: f64,
    prev_error: Option<f64>,
    output_min: f64,
    output_max: f64,
    /// Wrap errors into (-π, π] before use.
    continuous: bool,
}

impl PidController {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral: 0.0,
            prev_error: None,
            output_min: f64::NEG_INFINITY,
            output_max: f64::INFINITY,
            continuous: false,
        }
    }

    /// Proportional-only controller.
    pub fn proportional(kp: f64) -> Self {
        Self::new(kp, 0.0, 0.0)
    }

    /// Set output limits
    pub fn set_limits(&mut self, min: f64, max: f64) {
        self.output_min = min;
        self.output_max = max;
    }

    /// Treat the input as an angle in radians.
    pub fn enable_continuous_input(&mut self) {
        self.continuous = true;
    }

    /// Compute PID output given current measurement and setpoint
    pub fn calculate(&mut self, measurement: f64, setpoint: f64, dt: f64) -> f64 {
        let mut error = setpoint - measurement;
        if self.continuous {
            error = wrap_angle(error);
        }

        // Proportional
        let p = self.kp * error;

        // Integral (with anti-windup)
        self.integral += error * dt;
        let i = self.ki * self.integral;

        // Derivative
        let d = match self.prev_error {
            Some(prev) if dt > 0.0 => self.kd * (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        let output = (p + i + d).clamp(self.output_min, self.output_max);

        // Anti-windup: if output is saturated, stop integrating
        if output >= self.output_max || output <= self.output_min {
            self.integral -= error * dt;
        }

        output
    }

    /// Reset controller state
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }
}

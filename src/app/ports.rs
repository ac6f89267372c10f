//! Port traits — the hexagonal boundary between the decision core and the robot.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Scheduler / RobotService (domain)
//! ```
//!
//! Subsystem drivers (drivetrain, shooter, intake, climber), the
//! autonomous console, and event sinks implement these traits.  The core
//! consumes them via generics, so nothing in the command engine touches
//! motor controllers or sensors directly.
//!
//! Every method is called from the single tick context and must return
//! promptly; none may block.

use crate::motion::geometry::Pose2d;
use crate::motion::kinematics::{SwerveModuleState, MODULE_COUNT};

// ───────────────────────────────────────────────────────────────
// Drivetrain port
// ───────────────────────────────────────────────────────────────

/// Swerve drivetrain capability.
pub trait DrivePort {
    /// Drive with normalised inputs in [-1, 1].
    ///
    /// * `field_relative`: interpret forward/strafe in the field frame.
    /// * `rate_limited`: apply the driver's slew-rate limiting.
    /// * `brake_on_zero`: hold position (brake mode) when all inputs are zero.
    fn drive(
        &mut self,
        forward: f64,
        strafe: f64,
        rotation: f64,
        field_relative: bool,
        rate_limited: bool,
        brake_on_zero: bool,
    );

    /// Current pose estimate.
    fn pose(&self) -> Pose2d;

    /// Overwrite the pose estimate.
    fn reset_odometry(&mut self, pose: Pose2d);

    /// Command every module directly (front-left, front-right, rear-left, rear-right).
    fn set_module_states(&mut self, states: [SwerveModuleState; MODULE_COUNT]);

    /// Turn the wheels into an X to resist being pushed.
    fn set_x(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Shooter port
// ───────────────────────────────────────────────────────────────

pub trait ShooterPort {
    /// Run the shooter wheels at a signed speed in [-1, 1].
    fn shoot(&mut self, speed: f64);

    fn stop_shooter(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Intake port
// ───────────────────────────────────────────────────────────────

/// Deployable ground intake with a note sensor.
pub trait IntakePort {
    /// Drive the intake arm toward the deployed position.
    fn deploy(&mut self);

    /// Drive the intake arm toward the stowed position.
    fn retract(&mut self);

    /// Run the rollers inward at a signed speed.
    fn intake_note(&mut self, speed: f64);

    /// Stop the rollers with the note held.
    fn hold_note(&mut self);

    /// Release the note onto the floor.
    fn drop_note(&mut self);

    /// Push the note out toward the shooter.
    fn spit_note(&mut self);

    /// A note is seated in the intake.
    fn is_note_in(&self) -> bool;

    /// The intake arm is deployed.
    fn is_out(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Climber port
// ───────────────────────────────────────────────────────────────

pub trait ClimberPort {
    /// Run both climber arms together at a signed speed.
    fn climb(&mut self, speed: f64);

    /// Run the independent arm at a signed speed.
    fn arm_independent(&mut self, speed: f64);

    fn stop_climber(&mut self);
}

/// Every subsystem the command engine can drive.
///
/// Blanket-implemented for any adapter that provides all four ports, so
/// a single hardware adapter satisfies it without extra boilerplate.
pub trait RobotPort: DrivePort + ShooterPort + IntakePort + ClimberPort {}

impl<T: DrivePort + ShooterPort + IntakePort + ClimberPort + ?Sized> RobotPort for T {}

// ───────────────────────────────────────────────────────────────
// Autonomous console port
// ───────────────────────────────────────────────────────────────

/// Rotary switch + potentiometer console used to pick the autonomous
/// routine.  Sampled once when autonomous starts, never during the run.
pub trait ConsolePort {
    /// Routine selector switch position (0-5 on the real console).
    fn rot_sw_0(&self) -> i32;

    /// Start delay in seconds.
    fn rot_sw_1(&self) -> f64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`RobotEvent`](super::events::RobotEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RobotEvent);
}

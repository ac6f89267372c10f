//! Simulated robot — host-side stand-in for the subsystem drivers.
//!
//! Implements every port in [`RobotPort`](crate::app::ports::RobotPort) with a coarse kinematic model:
//! each drive call integrates the pose over one period, the intake arm
//! travels a fixed fraction per deploy/retract call, and running the
//! rollers while deployed picks up a floor note after a few calls.
//! Good enough to watch routines play out; not a physics model.

use log::debug;

use crate::app::ports::{ClimberPort, ConsolePort, DrivePort, IntakePort, ShooterPort};
use crate::config::RobotConfig;
use crate::motion::geometry::{wrap_angle, Pose2d, Translation2d};
use crate::motion::kinematics::{SwerveModuleState, MODULE_COUNT};

/// Deploy/retract calls for a full arm stroke.
const ARM_STROKE_CALLS: u32 = 25;

/// Roller calls with the arm out before a floor note is seated.
const PICKUP_CALLS: u32 = 10;

/// Last `drive` call, as received.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    pub forward: f64,
    pub strafe: f64,
    pub rotation: f64,
    pub field_relative: bool,
    pub rate_limited: bool,
    pub brake_on_zero: bool,
}

pub struct SimRobot {
    period_secs: f64,
    max_speed_mps: f64,
    max_angular_speed_rps: f64,

    pose: Pose2d,
    last_drive: Option<DriveCommand>,
    module_states: [SwerveModuleState; MODULE_COUNT],
    x_locked: bool,

    shooter_speed: f64,
    stop_shooter_calls: u32,

    /// Arm travel in calls: 0 = stowed, `ARM_STROKE_CALLS` = out.
    arm: u32,
    roller_speed: f64,
    pickup_progress: u32,
    note_in: bool,
    floor_notes: u32,
    notes_shot: u32,

    climber_speed: f64,
    arm_speed: f64,
    stop_climber_calls: u32,
}

impl Default for SimRobot {
    fn default() -> Self {
        Self::new(&RobotConfig::default())
    }
}

impl SimRobot {
    /// Empty intake, one note on the floor, at the origin.
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            period_secs: config.period_secs(),
            max_speed_mps: config.drive.max_speed_mps,
            max_angular_speed_rps: config.auto.max_angular_speed_rps,
            pose: Pose2d::default(),
            last_drive: None,
            module_states: [SwerveModuleState::default(); MODULE_COUNT],
            x_locked: false,
            shooter_speed: 0.0,
            stop_shooter_calls: 0,
            arm: 0,
            roller_speed: 0.0,
            pickup_progress: 0,
            note_in: false,
            floor_notes: 1,
            notes_shot: 0,
            climber_speed: 0.0,
            arm_speed: 0.0,
            stop_climber_calls: 0,
        }
    }

    /// Seat a note in the intake (match preload).
    pub fn load_note(&mut self) {
        self.note_in = true;
    }

    pub fn set_floor_notes(&mut self, count: u32) {
        self.floor_notes = count;
    }

    pub fn last_drive(&self) -> Option<DriveCommand> {
        self.last_drive
    }

    pub fn module_states(&self) -> [SwerveModuleState; MODULE_COUNT] {
        self.module_states
    }

    pub fn x_locked(&self) -> bool {
        self.x_locked
    }

    pub fn shooter_speed(&self) -> f64 {
        self.shooter_speed
    }

    pub fn stop_shooter_calls(&self) -> u32 {
        self.stop_shooter_calls
    }

    pub fn roller_speed(&self) -> f64 {
        self.roller_speed
    }

    pub fn notes_shot(&self) -> u32 {
        self.notes_shot
    }

    pub fn climber_speed(&self) -> f64 {
        self.climber_speed
    }

    pub fn arm_speed(&self) -> f64 {
        self.arm_speed
    }

    pub fn stop_climber_calls(&self) -> u32 {
        self.stop_climber_calls
    }

    /// Move by a robot-relative velocity for one period.
    fn integrate(&mut self, vx: f64, vy: f64, omega: f64) {
        let (sin, cos) = self.pose.rotation.sin_cos();
        let dt = self.period_secs;
        let t = self.pose.translation;
        self.pose = Pose2d {
            translation: Translation2d::new(
                t.x + (vx * cos - vy * sin) * dt,
                t.y + (vx * sin + vy * cos) * dt,
            ),
            rotation: wrap_angle(self.pose.rotation + omega * dt),
        };
    }
}

// ── DrivePort ─────────────────────────────────────────────────

impl DrivePort for SimRobot {
    fn drive(
        &mut self,
        forward: f64,
        strafe: f64,
        rotation: f64,
        field_relative: bool,
        rate_limited: bool,
        brake_on_zero: bool,
    ) {
        self.last_drive = Some(DriveCommand {
            forward,
            strafe,
            rotation,
            field_relative,
            rate_limited,
            brake_on_zero,
        });
        self.x_locked = false;
        let (mut vx, mut vy) = (forward * self.max_speed_mps, strafe * self.max_speed_mps);
        if field_relative {
            let (sin, cos) = self.pose.rotation.sin_cos();
            (vx, vy) = (vx * cos + vy * sin, -vx * sin + vy * cos);
        }
        self.integrate(vx, vy, rotation * self.max_angular_speed_rps);
    }

    fn pose(&self) -> Pose2d {
        self.pose
    }

    fn reset_odometry(&mut self, pose: Pose2d) {
        debug!("Sim: odometry reset to ({:.2}, {:.2}, {:.2})", pose.x(), pose.y(), pose.rotation);
        self.pose = pose;
    }

    fn set_module_states(&mut self, states: [SwerveModuleState; MODULE_COUNT]) {
        self.module_states = states;
        self.x_locked = false;
        // Mean module velocity; rotation is not modelled here.
        let n = MODULE_COUNT as f64;
        let vx = states.iter().map(|s| s.speed_mps * s.angle.cos()).sum::<f64>() / n;
        let vy = states.iter().map(|s| s.speed_mps * s.angle.sin()).sum::<f64>() / n;
        self.integrate(vx, vy, 0.0);
    }

    fn set_x(&mut self) {
        self.x_locked = true;
    }
}

// ── ShooterPort ───────────────────────────────────────────────

impl ShooterPort for SimRobot {
    fn shoot(&mut self, speed: f64) {
        self.shooter_speed = speed;
    }

    fn stop_shooter(&mut self) {
        self.shooter_speed = 0.0;
        self.stop_shooter_calls += 1;
    }
}

// ── IntakePort ────────────────────────────────────────────────

impl IntakePort for SimRobot {
    fn deploy(&mut self) {
        if self.arm < ARM_STROKE_CALLS {
            self.arm += 1;
            if self.arm == ARM_STROKE_CALLS {
                debug!("Sim: intake out");
            }
        }
    }

    fn retract(&mut self) {
        if self.arm > 0 {
            self.arm -= 1;
            if self.arm == 0 {
                debug!("Sim: intake stowed");
            }
        }
    }

    fn intake_note(&mut self, speed: f64) {
        self.roller_speed = speed;
        if speed <= 0.0 || self.note_in || !self.is_out() || self.floor_notes == 0 {
            return;
        }
        self.pickup_progress += 1;
        if self.pickup_progress >= PICKUP_CALLS {
            self.pickup_progress = 0;
            self.floor_notes -= 1;
            self.note_in = true;
            debug!("Sim: note picked up");
        }
    }

    fn hold_note(&mut self) {
        self.roller_speed = 0.0;
    }

    fn drop_note(&mut self) {
        self.roller_speed = -1.0;
        if self.note_in {
            self.note_in = false;
            self.floor_notes += 1;
            debug!("Sim: note dropped");
        }
    }

    fn spit_note(&mut self) {
        self.roller_speed = -1.0;
        if self.note_in {
            self.note_in = false;
            if self.shooter_speed > 0.0 {
                self.notes_shot += 1;
                debug!("Sim: note shot");
            } else {
                self.floor_notes += 1;
            }
        }
    }

    fn is_note_in(&self) -> bool {
        self.note_in
    }

    fn is_out(&self) -> bool {
        self.arm >= ARM_STROKE_CALLS
    }
}

// ── ClimberPort ───────────────────────────────────────────────

impl ClimberPort for SimRobot {
    fn climb(&mut self, speed: f64) {
        self.climber_speed = speed;
    }

    fn arm_independent(&mut self, speed: f64) {
        self.arm_speed = speed;
    }

    fn stop_climber(&mut self) {
        self.climber_speed = 0.0;
        self.arm_speed = 0.0;
        self.stop_climber_calls += 1;
    }
}

// ── ConsolePort ───────────────────────────────────────────────

/// Fixed console reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConsole {
    pub switch: i32,
    pub delay_secs: f64,
}

impl SimConsole {
    pub fn new(switch: i32, delay_secs: f64) -> Self {
        Self { switch, delay_secs }
    }
}

impl ConsolePort for SimConsole {
    fn rot_sw_0(&self) -> i32 {
        self.switch
    }

    fn rot_sw_1(&self) -> f64 {
        self.delay_secs
    }
}

//! Leaf actions.
//!
//! Every primitive is plain data: the subsystem it drives is reached
//! through the [`Ctx`] handed in on each lifecycle call, never captured.
//! Completion flags are computed during `execute`, so `is_finished` is a
//! pure read.

use super::resource::{ResourceId, ResourceSet};
use super::Ctx;
use crate::app::ports::RobotPort;
use crate::config::RobotConfig;
use crate::controls::{apply_deadband, Axis};
use crate::motion::follower::PathFollower;
use crate::motion::geometry::Pose2d;
use crate::motion::kinematics::{SwerveModuleState, MODULE_COUNT};

const DRIVE: ResourceSet = ResourceSet::of(ResourceId::Drivetrain);
const INTAKE: ResourceSet = ResourceSet::of(ResourceId::Intake);
const SHOOTER: ResourceSet = ResourceSet::of(ResourceId::Shooter);
const CLIMBER: ResourceSet = ResourceSet::of(ResourceId::Climber);

// ───────────────────────────────────────────────────────────────
// One-shot actions
// ───────────────────────────────────────────────────────────────

/// Performed once in `initialize`; the command then finishes on its
/// first tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstantAction {
    ResetOdometry(Pose2d),
    HoldNote,
    StopShooter,
    Nothing,
}

impl InstantAction {
    pub fn requirements(&self) -> ResourceSet {
        match self {
            Self::ResetOdometry(_) => DRIVE,
            Self::HoldNote => INTAKE,
            Self::StopShooter => SHOOTER,
            Self::Nothing => ResourceSet::EMPTY,
        }
    }

    fn apply<R: RobotPort + ?Sized>(&self, robot: &mut R) {
        match *self {
            Self::ResetOdometry(pose) => robot.reset_odometry(pose),
            Self::HoldNote => robot.hold_note(),
            Self::StopShooter => robot.stop_shooter(),
            Self::Nothing => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Run-forever actions
// ───────────────────────────────────────────────────────────────

/// Applied every tick until the command is interrupted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunAction {
    /// Robot-relative stick driving.  Brakes on zero input only while
    /// the intake is stowed.
    TeleopDrive { deadband: f64, scale: f64 },
    SetX,
    Climb(f64),
    ArmIndependent(f64),
    ClimberStop,
    IntakeRoller(f64),
    Shoot(f64),
    DropNote,
    HoldNote,
}

impl RunAction {
    pub fn requirements(&self) -> ResourceSet {
        match self {
            Self::TeleopDrive { .. } | Self::SetX => DRIVE,
            Self::Climb(_) | Self::ArmIndependent(_) | Self::ClimberStop => CLIMBER,
            Self::IntakeRoller(_) | Self::DropNote | Self::HoldNote => INTAKE,
            Self::Shoot(_) => SHOOTER,
        }
    }

    fn apply<R: RobotPort + ?Sized>(&self, ctx: &mut Ctx<'_, R>) {
        match *self {
            Self::TeleopDrive { deadband, scale } => {
                let c = ctx.controls;
                let forward = scale * apply_deadband(c.axis(Axis::LeftY), deadband);
                let strafe = scale * apply_deadband(c.axis(Axis::LeftX), deadband);
                let rotation = -scale * apply_deadband(c.axis(Axis::RightX), deadband);
                let brake = !ctx.robot.is_out();
                ctx.robot.drive(forward, strafe, rotation, false, false, brake);
            }
            Self::SetX => ctx.robot.set_x(),
            Self::Climb(speed) => ctx.robot.climb(speed),
            Self::ArmIndependent(speed) => ctx.robot.arm_independent(speed),
            Self::ClimberStop => ctx.robot.stop_climber(),
            Self::IntakeRoller(speed) => ctx.robot.intake_note(speed),
            Self::Shoot(speed) => ctx.robot.shoot(speed),
            Self::DropNote => ctx.robot.drop_note(),
            Self::HoldNote => ctx.robot.hold_note(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Primitive
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Primitive {
    /// Finishes after `ticks` executions.  Zero ticks finishes on the
    /// first tick.
    Wait { ticks: u32, elapsed: u32 },
    Instant(InstantAction),
    Run(RunAction),
    DeployIntake { done: bool },
    RetractIntake { done: bool },
    /// Runs the rollers until the note sensor trips, then holds.
    NoteIntake { speed: f64, done: bool },
    /// Spin the shooter up, feed the note into it, let it clear.
    ShootNote {
        speed: f64,
        spin_up_ticks: u32,
        feed_ticks: u32,
        elapsed: u32,
    },
    FollowPath(Box<PathFollower>),
}

impl Primitive {
    pub fn wait(config: &RobotConfig, secs: f64) -> Self {
        Self::wait_ticks(config.ticks_for(secs))
    }

    pub const fn wait_ticks(ticks: u32) -> Self {
        Self::Wait { ticks, elapsed: 0 }
    }

    pub const fn deploy_intake() -> Self {
        Self::DeployIntake { done: false }
    }

    pub const fn retract_intake() -> Self {
        Self::RetractIntake { done: false }
    }

    pub fn note_intake(config: &RobotConfig) -> Self {
        Self::NoteIntake { speed: config.intake.intake_speed, done: false }
    }

    pub fn shoot_note(config: &RobotConfig) -> Self {
        Self::ShootNote {
            speed: config.shooter.shot_speed,
            spin_up_ticks: config.ticks_for(config.shooter.spin_up_secs),
            feed_ticks: config.ticks_for(config.shooter.feed_secs),
            elapsed: 0,
        }
    }

    pub fn requirements(&self) -> ResourceSet {
        match self {
            Self::Wait { .. } => ResourceSet::EMPTY,
            Self::Instant(action) => action.requirements(),
            Self::Run(action) => action.requirements(),
            Self::DeployIntake { .. } | Self::RetractIntake { .. } | Self::NoteIntake { .. } => {
                INTAKE
            }
            Self::ShootNote { .. } => SHOOTER.union(INTAKE),
            Self::FollowPath(_) => DRIVE,
        }
    }

    pub(super) fn initialize<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>) {
        match self {
            Self::Wait { elapsed, .. } | Self::ShootNote { elapsed, .. } => *elapsed = 0,
            Self::Instant(action) => action.apply(&mut *ctx.robot),
            Self::Run(_) => {}
            Self::DeployIntake { done }
            | Self::RetractIntake { done }
            | Self::NoteIntake { done, .. } => *done = false,
            Self::FollowPath(follower) => follower.reset(),
        }
    }

    pub(super) fn execute<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>) {
        match self {
            Self::Wait { elapsed, .. } => *elapsed = elapsed.saturating_add(1),
            Self::Instant(_) => {}
            Self::Run(action) => action.apply(ctx),
            Self::DeployIntake { done } => {
                ctx.robot.deploy();
                *done = ctx.robot.is_out();
            }
            Self::RetractIntake { done } => {
                ctx.robot.retract();
                *done = !ctx.robot.is_out();
            }
            Self::NoteIntake { speed, done } => {
                ctx.robot.intake_note(*speed);
                *done = ctx.robot.is_note_in();
            }
            Self::ShootNote { speed, spin_up_ticks, elapsed, .. } => {
                ctx.robot.shoot(*speed);
                if *elapsed >= *spin_up_ticks {
                    ctx.robot.spit_note();
                }
                *elapsed = elapsed.saturating_add(1);
            }
            Self::FollowPath(follower) => {
                let states = follower.step(ctx.robot.pose());
                ctx.robot.set_module_states(states);
            }
        }
    }

    pub(super) fn is_finished(&self) -> bool {
        match self {
            Self::Wait { ticks, elapsed } => elapsed >= ticks,
            Self::Instant(_) => true,
            Self::Run(_) => false,
            Self::DeployIntake { done }
            | Self::RetractIntake { done }
            | Self::NoteIntake { done, .. } => *done,
            Self::ShootNote { spin_up_ticks, feed_ticks, elapsed, .. } => {
                *elapsed >= spin_up_ticks.saturating_add(*feed_ticks)
            }
            Self::FollowPath(follower) => follower.is_finished(),
        }
    }

    pub(super) fn end<R: RobotPort + ?Sized>(&mut self, ctx: &mut Ctx<'_, R>, _interrupted: bool) {
        match self {
            Self::NoteIntake { .. } => ctx.robot.hold_note(),
            Self::ShootNote { .. } => {
                ctx.robot.stop_shooter();
                ctx.robot.hold_note();
            }
            Self::FollowPath(_) => {
                ctx.robot.set_module_states([SwerveModuleState::default(); MODULE_COUNT]);
            }
            _ => {}
        }
    }
}

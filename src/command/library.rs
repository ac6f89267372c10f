//! Named commands.
//!
//! Every command the robot binds or sequences is built here, so the
//! trigger map and the autonomous routines read as a list of names.

use std::sync::Arc;

use super::{Command, Condition, InstantAction, Primitive, RunAction};
use crate::config::RobotConfig;
use crate::motion::follower::PathFollower;
use crate::motion::geometry::Pose2d;
use crate::motion::trajectory::Trajectory;

// ───────────────────────────────────────────────────────────────
// Defaults
// ───────────────────────────────────────────────────────────────

/// Drivetrain default: robot-relative stick driving.
pub fn teleop_drive(config: &RobotConfig) -> Command {
    Command::primitive(
        "teleop_drive",
        Primitive::Run(RunAction::TeleopDrive {
            deadband: config.drive.deadband,
            scale: config.drive.input_scale,
        }),
    )
}

/// Climber default.
pub fn climber_stop() -> Command {
    Command::primitive("climber_stop", Primitive::Run(RunAction::ClimberStop))
}

// ───────────────────────────────────────────────────────────────
// Drivetrain
// ───────────────────────────────────────────────────────────────

pub fn set_x() -> Command {
    Command::primitive("set_x", Primitive::Run(RunAction::SetX))
}

pub fn reset_odometry(pose: Pose2d) -> Command {
    Command::primitive("reset_odometry", Primitive::Instant(InstantAction::ResetOdometry(pose)))
}

pub fn follow_path(trajectory: Arc<Trajectory>, config: &RobotConfig) -> Command {
    Command::primitive(
        "follow_path",
        Primitive::FollowPath(Box::new(PathFollower::new(trajectory, config))),
    )
}

/// Reset the pose estimate to the path's start, then follow it.
pub fn drive_path(trajectory: Arc<Trajectory>, config: &RobotConfig) -> Command {
    let start = trajectory.initial_pose();
    Command::sequence(vec![reset_odometry(start), follow_path(trajectory, config)]).named("drive_path")
}

// ───────────────────────────────────────────────────────────────
// Climber
// ───────────────────────────────────────────────────────────────

pub fn climb(speed: f64) -> Command {
    Command::primitive("climb", Primitive::Run(RunAction::Climb(speed)))
}

pub fn arm_independent(speed: f64) -> Command {
    Command::primitive("arm_independent", Primitive::Run(RunAction::ArmIndependent(speed)))
}

// ───────────────────────────────────────────────────────────────
// Intake and shooter
// ───────────────────────────────────────────────────────────────

pub fn wait(config: &RobotConfig, secs: f64) -> Command {
    Command::primitive("wait", Primitive::wait(config, secs))
}

pub fn deploy_intake() -> Command {
    Command::primitive("deploy_intake", Primitive::deploy_intake())
}

pub fn retract_intake() -> Command {
    Command::primitive("retract_intake", Primitive::retract_intake())
}

pub fn note_intake(config: &RobotConfig) -> Command {
    Command::primitive("note_intake", Primitive::note_intake(config))
}

pub fn shoot_note(config: &RobotConfig) -> Command {
    Command::primitive("shoot_note", Primitive::shoot_note(config))
}

/// Deploy and run the rollers unless a note is already seated, then stow.
pub fn collect_note(config: &RobotConfig) -> Command {
    Command::sequence(vec![
        deploy_intake().unless(Condition::NoteLoaded),
        note_intake(config).unless(Condition::NoteLoaded),
        retract_intake(),
    ])
    .named("collect_note")
}

pub fn retract_and_shoot(config: &RobotConfig) -> Command {
    retract_intake().and_then(shoot_note(config)).named("retract_and_shoot")
}

/// Feed a note by hand: rollers in, shooter slowly backwards.
pub fn hand_feed(config: &RobotConfig) -> Command {
    Command::parallel(vec![
        Command::primitive(
            "intake_roller",
            Primitive::Run(RunAction::IntakeRoller(config.intake.intake_speed)),
        ),
        Command::primitive(
            "shoot",
            Primitive::Run(RunAction::Shoot(config.shooter.hand_feed_speed)),
        ),
    ])
    .named("hand_feed")
}

/// Hold the note and stop the shooter, once each.
pub fn stow_note() -> Command {
    Command::sequence(vec![
        Command::primitive("hold_note", Primitive::Instant(InstantAction::HoldNote)),
        Command::primitive("stop_shooter", Primitive::Instant(InstantAction::StopShooter)),
    ])
    .named("stow_note")
}

pub fn drop_note() -> Command {
    deploy_intake()
        .and_then(Command::primitive("drop", Primitive::Run(RunAction::DropNote)))
        .named("drop_note")
}

pub fn hold_note() -> Command {
    Command::primitive("hold_note", Primitive::Run(RunAction::HoldNote))
}

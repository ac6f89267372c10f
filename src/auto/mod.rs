//! Autonomous routine selector.
//!
//! Maps the console's routine switch and start delay to one command
//! tree.  Every tree is built fresh from plain data, so selecting twice
//! yields two independent trees.  Anything that goes wrong (unknown
//! switch position, planner failure) degrades to [`Command::none`].
//!
//! | Switch | Routine                                                        |
//! |--------|----------------------------------------------------------------|
//! | 0      | nothing                                                        |
//! | 1      | wait, shoot                                                    |
//! | 2      | wait, reset pose, follow forward path                          |
//! | 3      | wait, shoot, reset pose, follow forward path                   |
//! | 4      | wait, shoot, { collect note ‖ reset pose, follow forward path } |
//! | 5      | routine 4, reset pose, follow back path, shoot                 |

use core::f64::consts::PI;
use core::fmt;
use std::sync::Arc;

use log::{info, warn};

use crate::command::{library, Command};
use crate::config::RobotConfig;
use crate::error::{Error, Result};
use crate::motion::geometry::{Pose2d, Translation2d};
use crate::motion::trajectory::{PathPlanner, PolylinePlanner, Trajectory, TrajectoryConfig};

// ───────────────────────────────────────────────────────────────
// Paths
// ───────────────────────────────────────────────────────────────

/// Waypoints for one autonomous path.
#[derive(Debug, Clone, Copy)]
pub struct PathSpec {
    pub start: Pose2d,
    pub interior: &'static [Translation2d],
    pub end: Pose2d,
    pub reversed: bool,
}

/// Out from the start line, driven backwards.
pub const FORWARD_PATH: PathSpec = PathSpec {
    start: Pose2d::new(0.0, 0.0, PI),
    interior: &[Translation2d::new(1.0, 0.0)],
    end: Pose2d::new(1.5, 0.0, PI),
    reversed: true,
};

/// Same waypoints, facing the direction of travel.
pub const BACK_PATH: PathSpec = PathSpec {
    start: Pose2d::new(0.0, 0.0, 0.0),
    interior: &[Translation2d::new(1.0, 0.0)],
    end: Pose2d::new(1.5, 0.0, 0.0),
    reversed: false,
};

// ───────────────────────────────────────────────────────────────
// Routines
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Routine {
    DoNothing = 0,
    Shoot = 1,
    Drive = 2,
    ShootDrive = 3,
    ShootDriveIntake = 4,
    TwoNote = 5,
}

impl Routine {
    pub const ALL: [Routine; 6] = [
        Self::DoNothing,
        Self::Shoot,
        Self::Drive,
        Self::ShootDrive,
        Self::ShootDriveIntake,
        Self::TwoNote,
    ];

    pub fn from_switch(position: i32) -> Option<Self> {
        usize::try_from(position).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::DoNothing => "auto_do_nothing",
            Self::Shoot => "auto_shoot",
            Self::Drive => "auto_drive",
            Self::ShootDrive => "auto_shoot_drive",
            Self::ShootDriveIntake => "auto_shoot_drive_intake",
            Self::TwoNote => "auto_two_note",
        }
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), *self as u8)
    }
}

// ───────────────────────────────────────────────────────────────
// Selector
// ───────────────────────────────────────────────────────────────

/// Start delay actually used for a console reading: negative, NaN and
/// infinite readings mean no delay.
pub fn sanitize_delay(delay_secs: f64) -> f64 {
    if delay_secs.is_finite() && delay_secs > 0.0 {
        delay_secs
    } else {
        0.0
    }
}

pub struct AutoSelector<P: PathPlanner = PolylinePlanner> {
    planner: P,
    config: RobotConfig,
}

impl AutoSelector<PolylinePlanner> {
    pub fn with_default_planner(config: RobotConfig) -> Self {
        Self::new(PolylinePlanner, config)
    }
}

impl<P: PathPlanner> AutoSelector<P> {
    pub fn new(planner: P, config: RobotConfig) -> Self {
        Self { planner, config }
    }

    /// Build the routine for `switch`, or [`Command::none`] on any failure.
    pub fn select(&self, switch: i32, delay_secs: f64) -> Command {
        match self.try_select(switch, delay_secs) {
            Ok((_, command)) => command,
            Err(e) => {
                warn!("Auto: switch {} unusable ({}), doing nothing", switch, e);
                Command::none()
            }
        }
    }

    /// Build the routine for `switch`, reporting why it could not be built.
    ///
    /// Both paths are generated before the switch is looked at, so a
    /// planner failure disables every routine.  A negative or non-finite
    /// delay counts as no delay.
    pub fn try_select(&self, switch: i32, delay_secs: f64) -> Result<(Routine, Command)> {
        let forward = Arc::new(self.generate(&FORWARD_PATH)?);
        let back = Arc::new(self.generate(&BACK_PATH)?);
        let routine = Routine::from_switch(switch).ok_or(Error::UnknownRoutine(switch))?;

        let delay = sanitize_delay(delay_secs);
        info!("Auto: {} after {:.2}s", routine, delay);
        Ok((routine, self.build(routine, delay, &forward, &back)))
    }

    fn generate(&self, path: &PathSpec) -> Result<Trajectory> {
        let limits = TrajectoryConfig::new(self.config.auto.max_speed_mps, self.config.auto.max_accel_mps2)
            .with_reversed(path.reversed);
        Ok(self.planner.generate(path.start, path.interior, path.end, &limits)?)
    }

    fn build(
        &self,
        routine: Routine,
        delay: f64,
        forward: &Arc<Trajectory>,
        back: &Arc<Trajectory>,
    ) -> Command {
        let cfg = &self.config;
        let wait = || library::wait(cfg, delay);
        let shoot = || library::shoot_note(cfg);
        let drive = |path: &Arc<Trajectory>| library::drive_path(Arc::clone(path), cfg);
        let drive_and_collect =
            || Command::parallel(vec![library::collect_note(cfg), drive(forward)]);

        let steps: Vec<Command> = match routine {
            Routine::DoNothing => return Command::none().named(routine.name()),
            Routine::Shoot => vec![wait(), shoot()],
            Routine::Drive => vec![wait(), drive(forward)],
            Routine::ShootDrive => vec![wait(), shoot(), drive(forward)],
            Routine::ShootDriveIntake => vec![wait(), shoot(), drive_and_collect()],
            Routine::TwoNote => vec![wait(), shoot(), drive_and_collect(), drive(back), shoot()],
        };
        Command::sequence(steps).named(routine.name())
    }
}

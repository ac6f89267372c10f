//! Outbound robot events.
//!
//! The [`RobotService`](super::service::RobotService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log lines, dashboard updates, match
//! recordings.

use crate::auto::Routine;
use crate::error::Error;
use crate::scheduler::Notice;

/// Operating mode, as set by the field or driver station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Disabled,
    Teleop,
    Autonomous,
}

/// Structured events emitted by the decision core.
#[derive(Debug, Clone, PartialEq)]
pub enum RobotEvent {
    /// The service has started (carries the initial mode).
    Started(Mode),

    /// The operating mode changed; every command was cancelled.
    ModeChanged { from: Mode, to: Mode },

    /// An autonomous routine was built and scheduled.
    AutoSelected { routine: Routine, delay_secs: f64 },

    /// The console reading could not be turned into a routine; the robot
    /// sits still for the autonomous period.
    AutoFallback { switch: i32, reason: Error },

    /// A command was scheduled, finished, or interrupted.
    Command(Notice),
}

//! Unified error types for the robot decision core.
//!
//! A single `Error` enum that every fallible operation converts into.
//! All variants are `Copy` so they can be carried inside outbound events
//! and log lines without allocation.
//!
//! Scheduling itself never fails: resource conflicts are silent drops.
//! Errors only come from configuration and from path generation, and the
//! autonomous selector absorbs the latter into a do-nothing routine.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The trajectory planner could not build a path.
    Path(PathError),
    /// The console switch named a routine that does not exist.
    UnknownRoutine(i32),
    /// A default command was registered for a resource it does not require.
    DefaultWithoutResource(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(e) => write!(f, "path: {e}"),
            Self::UnknownRoutine(n) => write!(f, "unknown autonomous routine {n}"),
            Self::DefaultWithoutResource(name) => {
                write!(f, "default command '{name}' does not require its resource")
            }
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Path generation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathError {
    /// A waypoint or constraint was NaN or infinite.
    NonFinite,
    /// Max velocity or acceleration was zero or negative.
    InvalidConstraints,
    /// All waypoints coincide; there is nothing to drive.
    ZeroLength,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite => write!(f, "non-finite waypoint or constraint"),
            Self::InvalidConstraints => write!(f, "velocity and acceleration limits must be positive"),
            Self::ZeroLength => write!(f, "path has zero length"),
        }
    }
}

impl From<PathError> for Error {
    fn from(e: PathError) -> Self {
        Self::Path(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

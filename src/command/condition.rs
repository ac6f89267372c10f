//! Sampled boolean conditions.
//!
//! Conditions are plain data, resolved once at configuration time and
//! sampled by the engine: triggers sample them every tick, the
//! conditional-skip combinator once at schedule time, and the
//! run-until-false decorator every tick while its child runs.

use crate::app::ports::IntakePort;
use crate::controls::{Axis, Button, ControllerState, Pov};

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Operator button held.
    Button(Button),
    /// D-pad held in a direction.
    Pov(Pov),
    /// Axis strictly above a threshold (e.g. trigger pulled past 0.75).
    AxisAbove(Axis, f64),
    /// The intake note sensor reports a note.
    NoteLoaded,
    Always,
}

impl Condition {
    pub fn sample<R: IntakePort + ?Sized>(&self, controls: &ControllerState, robot: &R) -> bool {
        match self {
            Self::Button(b) => controls.is_pressed(*b),
            Self::Pov(p) => controls.pov_is(*p),
            Self::AxisAbove(axis, threshold) => controls.axis(*axis) > *threshold,
            Self::NoteLoaded => robot.is_note_in(),
            Self::Always => true,
        }
    }
}

//! Operator controller snapshot.
//!
//! The host samples the gamepad once per tick and hands the scheduler a
//! [`ControllerState`].  Nothing in the core reads the device directly;
//! triggers and the teleop drive command only ever see this snapshot.

/// Face buttons and bumpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    LeftBumper = 4,
    RightBumper = 5,
    Back = 6,
    Start = 7,
}

impl Button {
    const fn mask(self) -> u16 {
        1 << self as u8
    }
}

/// D-pad directions.  The device reports an angle in degrees clockwise
/// from up; only the four cardinal angles map to a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pov {
    Up,
    Right,
    Down,
    Left,
}

impl Pov {
    pub const fn angle(self) -> u16 {
        match self {
            Self::Up => 0,
            Self::Right => 90,
            Self::Down => 180,
            Self::Left => 270,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

/// One tick's worth of operator input.
///
/// Stick axes are in [-1, 1]; trigger axes in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerState {
    buttons: u16,
    /// D-pad angle in degrees, `None` when released.
    pub pov: Option<u16>,
    pub left_x: f64,
    pub left_y: f64,
    pub right_x: f64,
    pub right_y: f64,
    pub left_trigger: f64,
    pub right_trigger: f64,
}

impl ControllerState {
    /// Neutral input: no buttons, sticks centred.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons & button.mask() != 0
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons |= button.mask();
        } else {
            self.buttons &= !button.mask();
        }
    }

    /// Builder-style variant of [`set_button`](Self::set_button).
    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.set_button(button, true);
        self
    }

    pub fn pov_is(&self, direction: Pov) -> bool {
        self.pov == Some(direction.angle())
    }

    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::LeftX => self.left_x,
            Axis::LeftY => self.left_y,
            Axis::RightX => self.right_x,
            Axis::RightY => self.right_y,
            Axis::LeftTrigger => self.left_trigger,
            Axis::RightTrigger => self.right_trigger,
        }
    }
}

/// Zero small inputs and rescale the rest so the output still spans
/// [-1, 1] continuously from the deadband edge.
pub fn apply_deadband(value: f64, deadband: f64) -> f64 {
    if !value.is_finite() || value.abs() <= deadband {
        return 0.0;
    }
    let magnitude = (value.abs() - deadband) / (1.0 - deadband);
    magnitude.copysign(value).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_are_independent() {
        let mut s = ControllerState::neutral().with_button(Button::A);
        s.set_button(Button::Y, true);
        assert!(s.is_pressed(Button::A));
        assert!(s.is_pressed(Button::Y));
        assert!(!s.is_pressed(Button::B));
        s.set_button(Button::A, false);
        assert!(!s.is_pressed(Button::A));
        assert!(s.is_pressed(Button::Y));
    }

    #[test]
    fn pov_matches_only_its_angle() {
        let s = ControllerState {
            pov: Some(90),
            ..ControllerState::default()
        };
        assert!(s.pov_is(Pov::Right));
        assert!(!s.pov_is(Pov::Up));
        assert!(!ControllerState::neutral().pov_is(Pov::Up));
    }

    #[test]
    fn deadband_zeroes_small_inputs() {
        assert_eq!(apply_deadband(0.05, 0.08), 0.0);
        assert_eq!(apply_deadband(-0.08, 0.08), 0.0);
        assert_eq!(apply_deadband(f64::NAN, 0.08), 0.0);
    }

    #[test]
    fn deadband_rescales_to_full_range() {
        assert!((apply_deadband(1.0, 0.08) - 1.0).abs() < 1e-12);
        assert!((apply_deadband(-1.0, 0.08) + 1.0).abs() < 1e-12);
        let mid = apply_deadband(0.54, 0.08);
        assert!((mid - 0.5).abs() < 1e-12);
    }
}

//! Edge-triggered command bindings.
//!
//! A [`Binding`] is a `(condition, edge, builder)` record resolved once
//! when the board is built.  [`TriggerBoard::poll`] samples every
//! condition once per tick, compares it with the previous sample, and
//! schedules or cancels through the [`Scheduler`].
//!
//! | Edge        | Rising edge          | Falling edge         |
//! |-------------|----------------------|----------------------|
//! | `WhileTrue` | schedule             | cancel that instance |
//! | `OnTrue`    | schedule             | -                    |
//! | `OnFalse`   | -                    | schedule             |
//!
//! Bindings are polled in declaration order, so when two fire in the same
//! tick on a shared resource the later one wins.  Every condition starts
//! out sampled false: a button already held when polling begins produces
//! a rising edge on the first poll.

use log::debug;

use crate::app::ports::RobotPort;
use crate::command::{library, Command, Condition, Ctx};
use crate::config::RobotConfig;
use crate::controls::{Axis, Button, Pov};
use crate::scheduler::{CommandHandle, Scheduler};

/// Builds a fresh command instance each time a binding fires.
pub type CommandBuilder = fn(&RobotConfig) -> Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    WhileTrue,
    OnTrue,
    OnFalse,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub label: &'static str,
    pub condition: Condition,
    pub edge: Edge,
    pub build: CommandBuilder,
}

impl Binding {
    pub fn while_true(label: &'static str, condition: Condition, build: CommandBuilder) -> Self {
        Self { label, condition, edge: Edge::WhileTrue, build }
    }

    pub fn on_true(label: &'static str, condition: Condition, build: CommandBuilder) -> Self {
        Self { label, condition, edge: Edge::OnTrue, build }
    }

    pub fn on_false(label: &'static str, condition: Condition, build: CommandBuilder) -> Self {
        Self { label, condition, edge: Edge::OnFalse, build }
    }
}

struct Armed {
    binding: Binding,
    last: bool,
    /// Instance started by a `WhileTrue` rising edge.
    handle: Option<CommandHandle>,
}

pub struct TriggerBoard {
    bindings: Vec<Armed>,
}

impl TriggerBoard {
    pub fn new(bindings: impl IntoIterator<Item = Binding>) -> Self {
        Self {
            bindings: bindings
                .into_iter()
                .map(|binding| Armed { binding, last: false, handle: None })
                .collect(),
        }
    }

    /// The full operator controller map.
    pub fn operator(config: &RobotConfig) -> Self {
        Self::new(operator_bindings(config))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Forget previous samples.  The next poll treats every true condition
    /// as a fresh rising edge.
    pub fn reset(&mut self) {
        for armed in &mut self.bindings {
            armed.last = false;
            armed.handle = None;
        }
    }

    /// Sample every binding and act on edges.
    pub fn poll<R: RobotPort + ?Sized>(
        &mut self,
        scheduler: &mut Scheduler,
        config: &RobotConfig,
        ctx: &mut Ctx<'_, R>,
    ) {
        for armed in &mut self.bindings {
            let now = armed.binding.condition.sample(ctx.controls, &*ctx.robot);
            let was = core::mem::replace(&mut armed.last, now);
            let label = armed.binding.label;

            match (armed.binding.edge, was, now) {
                (Edge::WhileTrue, false, true) => {
                    debug!("Trigger: '{}' pressed", label);
                    armed.handle = scheduler.schedule((armed.binding.build)(config), ctx);
                }
                (Edge::WhileTrue, true, false) => {
                    debug!("Trigger: '{}' released", label);
                    if let Some(handle) = armed.handle.take() {
                        scheduler.cancel(handle, ctx);
                    }
                }
                (Edge::OnTrue, false, true) | (Edge::OnFalse, true, false) => {
                    debug!("Trigger: '{}' fired", label);
                    // Runs to completion on its own; nothing to track.
                    let _ = scheduler.schedule((armed.binding.build)(config), ctx);
                }
                _ => {}
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Operator controller map
// ═══════════════════════════════════════════════════════════════

/// Button map for the driver's controller.
///
/// ```text
///   POV up / down      climb +1 / -1              (while held)
///   POV left / right   independent arm -1 / +1    (while held)
///   left bumper        collect note               (while held)
///   A                  retract intake             (while held)
///   left trigger       retract, then shoot        (while past threshold)
///   Y                  hand feed                  (while held)
///                      hold note + stop shooter   (on release)
///   B                  deploy, then drop note     (while held)
///                      hold note                  (on release)
///   X                  lock wheels in an X        (while held)
/// ```
pub fn operator_bindings(config: &RobotConfig) -> Vec<Binding> {
    vec![
        Binding::while_true("climb_up", Condition::Pov(Pov::Up), |_| library::climb(1.0)),
        Binding::while_true("climb_down", Condition::Pov(Pov::Down), |_| library::climb(-1.0)),
        Binding::while_true("arm_left", Condition::Pov(Pov::Left), |_| {
            library::arm_independent(-1.0)
        }),
        Binding::while_true("arm_right", Condition::Pov(Pov::Right), |_| {
            library::arm_independent(1.0)
        }),
        Binding::while_true(
            "collect_note",
            Condition::Button(Button::LeftBumper),
            library::collect_note,
        ),
        Binding::while_true("retract_intake", Condition::Button(Button::A), |_| {
            library::retract_intake()
        }),
        Binding::while_true(
            "retract_and_shoot",
            Condition::AxisAbove(Axis::LeftTrigger, config.shoot_trigger_threshold),
            library::retract_and_shoot,
        ),
        Binding::on_false("stow_note", Condition::Button(Button::Y), |_| library::stow_note()),
        Binding::while_true("hand_feed", Condition::Button(Button::Y), library::hand_feed),
        Binding::while_true("drop_note", Condition::Button(Button::B), |_| library::drop_note()),
        Binding::on_false("hold_note", Condition::Button(Button::B), |_| library::hold_note()),
        Binding::while_true("set_x", Condition::Button(Button::X), |_| library::set_x()),
    ]
}

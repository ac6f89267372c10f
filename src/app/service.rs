//! Robot service — the hexagonal core.
//!
//! [`RobotService`] owns the command scheduler, the operator trigger
//! board, and the autonomous selector, and gates them by operating mode.
//! All I/O flows through port traits handed in at call sites, so the
//! whole service runs against simulated or mock robots.
//!
//! ```text
//!  ControllerState ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  ConsolePort ──────▶ │         RobotService         │
//!                      │ Triggers · Scheduler · Auto  │
//!  RobotPort ◀──────── └──────────────────────────────┘
//! ```
//!
//! | Mode       | Triggers polled | Scheduler ticks | Controls seen by commands |
//! |------------|-----------------|-----------------|---------------------------|
//! | Disabled   | no              | no              | -                         |
//! | Teleop     | yes             | yes             | operator snapshot         |
//! | Autonomous | no              | yes             | neutral                   |

use log::{info, warn};

use crate::auto::{sanitize_delay, AutoSelector};
use crate::command::{library, Command, Ctx, ResourceId};
use crate::config::RobotConfig;
use crate::controls::ControllerState;
use crate::error::Result;
use crate::motion::trajectory::{PathPlanner, PolylinePlanner};
use crate::scheduler::Scheduler;
use crate::trigger::TriggerBoard;

use super::events::{Mode, RobotEvent};
use super::ports::{ConsolePort, EventSink, RobotPort};

// ───────────────────────────────────────────────────────────────
// RobotService
// ───────────────────────────────────────────────────────────────

pub struct RobotService<P: PathPlanner = PolylinePlanner> {
    config: RobotConfig,
    scheduler: Scheduler,
    triggers: TriggerBoard,
    selector: AutoSelector<P>,
    mode: Mode,
    tick_count: u64,
}

impl RobotService<PolylinePlanner> {
    /// Construct the service with the built-in path planner.
    ///
    /// Starts Disabled; call [`start`](Self::start) and then
    /// [`set_mode`](Self::set_mode).
    pub fn new(config: RobotConfig) -> Result<Self> {
        Self::with_planner(config, PolylinePlanner)
    }
}

impl<P: PathPlanner> RobotService<P> {
    /// Validate `config`, bind the default commands, and build the
    /// operator trigger map.
    pub fn with_planner(config: RobotConfig, planner: P) -> Result<Self> {
        config.validate()?;

        let mut scheduler = Scheduler::new();
        scheduler.register(ResourceId::Drivetrain, library::teleop_drive(&config))?;
        scheduler.register(ResourceId::Climber, library::climber_stop())?;

        Ok(Self {
            triggers: TriggerBoard::operator(&config),
            selector: AutoSelector::new(planner, config.clone()),
            config,
            scheduler,
            mode: Mode::Disabled,
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&RobotEvent::Started(self.mode));
        info!(
            "RobotService started in {:?} ({} operator bindings)",
            self.mode,
            self.triggers.len()
        );
    }

    /// Switch operating mode.
    ///
    /// Every active command is cancelled.  Entering Autonomous reads the
    /// console once and schedules the selected routine; a console reading
    /// that cannot be turned into a routine schedules nothing and is
    /// reported as [`RobotEvent::AutoFallback`].  Setting the current mode
    /// again does nothing.
    pub fn set_mode<R: RobotPort + ?Sized>(
        &mut self,
        mode: Mode,
        robot: &mut R,
        console: &impl ConsolePort,
        sink: &mut impl EventSink,
    ) {
        if mode == self.mode {
            return;
        }
        let neutral = ControllerState::neutral();
        let mut ctx = Ctx::new(robot, &neutral);
        self.scheduler.cancel_all(&mut ctx);
        self.triggers.reset();

        let from = core::mem::replace(&mut self.mode, mode);
        info!("Mode {:?} -> {:?}", from, mode);
        sink.emit(&RobotEvent::ModeChanged { from, to: mode });

        if mode == Mode::Autonomous {
            let (switch, delay) = (console.rot_sw_0(), console.rot_sw_1());
            match self.selector.try_select(switch, delay) {
                Ok((routine, command)) => {
                    if self.scheduler.schedule(command, &mut ctx).is_none() {
                        warn!("Autonomous routine {} could not be scheduled", routine);
                    }
                    sink.emit(&RobotEvent::AutoSelected {
                        routine,
                        delay_secs: sanitize_delay(delay),
                    });
                }
                Err(reason) => {
                    warn!("Autonomous fallback for switch {}: {}", switch, reason);
                    let _ = self.scheduler.schedule(Command::none(), &mut ctx);
                    sink.emit(&RobotEvent::AutoFallback { switch, reason });
                }
            }
        }
        self.flush(sink);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one period: poll triggers (teleop only), then advance the
    /// scheduler.  Does nothing while Disabled.
    pub fn tick<R: RobotPort + ?Sized>(
        &mut self,
        robot: &mut R,
        controls: &ControllerState,
        sink: &mut impl EventSink,
    ) {
        let neutral = ControllerState::neutral();
        match self.mode {
            Mode::Disabled => return,
            Mode::Teleop => {
                let mut ctx = Ctx::new(robot, controls);
                self.triggers.poll(&mut self.scheduler, &self.config, &mut ctx);
                self.scheduler.tick(&mut ctx);
            }
            Mode::Autonomous => {
                let mut ctx = Ctx::new(robot, &neutral);
                self.scheduler.tick(&mut ctx);
            }
        }
        self.tick_count += 1;
        self.flush(sink);
    }

    fn flush(&mut self, sink: &mut impl EventSink) {
        self.scheduler
            .drain_notices(|notice| sink.emit(&RobotEvent::Command(notice)));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Ticks run outside Disabled.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }
}

//! Notebot — host simulation entry point.
//!
//! Plays one match against the simulated robot: a 15 s autonomous period
//! using the routine and delay given on the command line, then a short
//! scripted teleop period, then disabled.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimRobot            SimConsole       LogEventSink             │
//! │  (Drive+Shooter+     (ConsolePort)    (EventSink)              │
//! │   Intake+Climber)                                              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             RobotService (pure logic)                  │    │
//! │  │  Triggers · Scheduler · AutoSelector                   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `notebot-sim [SWITCH] [DELAY_SECS]`
//!
//! `NOTEBOT_CONFIG` names an optional JSON config file; `NOTEBOT_LOG`
//! takes `tracing` filter directives (default `info`).

#![deny(unused_must_use)]

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use notebot::adapters::log_sink::LogEventSink;
use notebot::adapters::sim::{SimConsole, SimRobot};
use notebot::app::events::Mode;
use notebot::app::ports::DrivePort;
use notebot::app::service::RobotService;
use notebot::config::RobotConfig;
use notebot::controls::{Button, ControllerState};

/// Environment variable naming a JSON config file.
const CONFIG_ENV: &str = "NOTEBOT_CONFIG";

/// Environment variable holding log filter directives.
const LOG_ENV: &str = "NOTEBOT_LOG";

const AUTO_PERIOD_SECS: f64 = 15.0;

#[derive(Parser, Debug)]
#[command(name = "notebot-sim", version)]
#[command(about = "Play one simulated match: autonomous, scripted teleop, disabled")]
struct Args {
    /// Autonomous routine switch position (0-5; anything else does nothing)
    #[arg(default_value_t = 0, allow_negative_numbers = true)]
    switch: i32,

    /// Seconds to wait before the routine starts
    #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
    delay: f64,
}

/// Filter from `NOTEBOT_LOG` directives, `info` when unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// One step of the scripted teleop period.
struct Phase {
    label: &'static str,
    secs: f64,
    controls: ControllerState,
}

fn teleop_script() -> Vec<Phase> {
    let idle = ControllerState::neutral();
    let mut drive = ControllerState::neutral();
    drive.left_y = 0.6;
    drive.right_x = -0.3;
    let mut shoot = ControllerState::neutral();
    shoot.left_trigger = 1.0;

    vec![
        Phase { label: "drive", secs: 1.0, controls: drive },
        Phase { label: "collect", secs: 1.5, controls: idle.with_button(Button::LeftBumper) },
        Phase { label: "idle", secs: 0.5, controls: idle },
        Phase { label: "shoot", secs: 2.0, controls: shoot },
        Phase { label: "hand feed", secs: 1.0, controls: idle.with_button(Button::Y) },
        Phase { label: "lock wheels", secs: 0.5, controls: idle.with_button(Button::X) },
        Phase { label: "idle", secs: 0.5, controls: idle },
    ]
}

fn load_config() -> Result<RobotConfig> {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return Ok(RobotConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = RobotConfig::from_json(&text).with_context(|| format!("parsing {path}"))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // ── 1. Logging ────────────────────────────────────────────
    // The subscriber also captures the library's `log` records.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(LOG_ENV).ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();
    info!("Notebot sim v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Config + console ───────────────────────────────────
    let config = load_config()?;
    let console = SimConsole::new(args.switch, args.delay);

    // ── 3. Adapters + service ─────────────────────────────────
    let mut robot = SimRobot::new(&config);
    robot.load_note();
    let mut sink = LogEventSink::new();
    let mut service = RobotService::new(config.clone())?;
    service.start(&mut sink);

    // ── 4. Autonomous ─────────────────────────────────────────
    service.set_mode(Mode::Autonomous, &mut robot, &console, &mut sink);
    let neutral = ControllerState::neutral();
    for _ in 0..config.ticks_for(AUTO_PERIOD_SECS) {
        service.tick(&mut robot, &neutral, &mut sink);
    }
    let pose = robot.pose();
    info!(
        "Autonomous done: pose=({:.2}, {:.2}, {:.2}) shot={}",
        pose.x(),
        pose.y(),
        pose.rotation,
        robot.notes_shot()
    );

    // ── 5. Scripted teleop ────────────────────────────────────
    robot.set_floor_notes(1);
    service.set_mode(Mode::Teleop, &mut robot, &console, &mut sink);
    for phase in teleop_script() {
        info!("Teleop: {} for {:.1}s", phase.label, phase.secs);
        for _ in 0..config.ticks_for(phase.secs) {
            service.tick(&mut robot, &phase.controls, &mut sink);
        }
    }

    // ── 6. Disabled ───────────────────────────────────────────
    service.set_mode(Mode::Disabled, &mut robot, &console, &mut sink);
    if service.scheduler().active_count() != 0 {
        warn!("{} commands still active after disable", service.scheduler().active_count());
    }

    let pose = robot.pose();
    info!(
        "Match over after {} ticks: pose=({:.2}, {:.2}, {:.2}) notes shot={}",
        service.tick_count(),
        pose.x(),
        pose.y(),
        pose.rotation,
        robot.notes_shot()
    );
    Ok(())
}

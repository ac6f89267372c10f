//! Fuzz target: `AutoSelector::select` plus a short autonomous run
//!
//! Derives a console switch and delay from the input, builds the routine,
//! and runs it for a few hundred ticks against the simulated robot.
//!
//! Invariants checked:
//! - No panics for any switch value or delay bit pattern
//! - Switches outside 0..=5 always produce the do-nothing command
//! - No resource ever has more than one claimant
//!
//! cargo fuzz run fuzz_auto_select

#![no_main]

use libfuzzer_sys::fuzz_target;
use notebot::adapters::sim::SimRobot;
use notebot::auto::{AutoSelector, Routine};
use notebot::command::{library, Ctx, ResourceId, ResourceSet};
use notebot::config::RobotConfig;
use notebot::controls::ControllerState;
use notebot::scheduler::Scheduler;

fuzz_target!(|data: &[u8]| {
    if data.len() < 12 {
        return;
    }
    let switch = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let mut delay_bytes = [0u8; 8];
    delay_bytes.copy_from_slice(&data[4..12]);
    let delay = f64::from_le_bytes(delay_bytes);

    let cfg = RobotConfig::default();
    let selector = AutoSelector::with_default_planner(cfg.clone());
    let command = selector.select(switch, delay);
    if Routine::from_switch(switch).is_none() {
        assert_eq!(command.name(), "none");
    }

    let mut sched = Scheduler::new();
    let _ = sched.register(ResourceId::Drivetrain, library::teleop_drive(&cfg));
    let _ = sched.register(ResourceId::Climber, library::climber_stop());
    let mut robot = SimRobot::new(&cfg);
    robot.load_note();
    let controls = ControllerState::neutral();
    let mut ctx = Ctx::new(&mut robot, &controls);
    let _ = sched.schedule(command, &mut ctx);

    // Remaining bytes pick how long to run (up to ~5 s of ticks).
    let ticks = data[12..].iter().map(|&b| u32::from(b)).sum::<u32>().min(250);
    for _ in 0..ticks {
        sched.tick(&mut ctx);
        let mut seen = ResourceSet::EMPTY;
        for (_, claims) in sched.claims() {
            assert!(seen.intersection(claims).is_empty(), "double claim");
            seen = seen.union(claims);
        }
    }
    sched.drain_notices(|_| {});
});

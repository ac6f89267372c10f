//! Notebot decision core.
//!
//! A cooperative, fixed-period command scheduler that arbitrates the
//! robot's exclusive subsystems (drivetrain, shooter, intake, climber),
//! composite command trees, edge-triggered operator bindings, and the
//! autonomous routine selector.  Everything here is pure logic; the
//! subsystem drivers sit behind the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod auto;
pub mod command;
pub mod config;
pub mod controls;
pub mod error;
pub mod motion;
pub mod scheduler;
pub mod trigger;

pub use error::{Error, Result};

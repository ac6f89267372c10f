//! Application core: pure decision logic, zero I/O.
//!
//! [`service::RobotService`] ties the scheduler, operator bindings, and
//! autonomous selector to the operating mode.  All interaction with
//! hardware happens through the port traits in [`ports`], so the whole
//! layer runs against simulated or mock robots.

pub mod events;
pub mod ports;
pub mod service;

//! Autonomous motion support.
//!
//! - [`geometry`]: poses and translations in the field frame.
//! - [`trajectory`]: time-parameterised paths and the [`PathPlanner`](trajectory::PathPlanner) port.
//! - [`follower`]: holonomic trajectory tracking for the drivetrain.
//! - [`kinematics`]: chassis velocity to swerve module targets.
//! - [`pid`]: the feedback controller used by the follower.

pub mod follower;
pub mod geometry;
pub mod kinematics;
pub mod pid;
pub mod trajectory;

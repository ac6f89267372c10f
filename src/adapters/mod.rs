//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                  |
//! |------------|---------------------|------------------------------|
//! | `sim`      | RobotPort           | Kinematic robot simulation   |
//! |            | ConsolePort         | Fixed console reading        |
//! | `log_sink` | EventSink           | `log` facade                 |

pub mod log_sink;
pub mod sim;

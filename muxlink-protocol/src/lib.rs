//! muxlink-protocol: tmux control-mode wire definitions
//!
//! This crate holds the pure, side-effect-free half of the bridge: the
//! octal-escape codec used by `%output` notifications, classification of
//! inbound control-mode lines, encoding of outbound commands, and the small
//! identifier types shared between the two.
//!
//! Everything here is a total function over its input. Malformed escapes are
//! passed through literally, unknown notification lines are classified as
//! such, and neither path can fail or panic.

pub mod command;
pub mod escape;
pub mod notification;
pub mod types;

// Re-export main types at crate root
pub use command::Command;
pub use escape::{decode, encode};
pub use notification::Notification;
pub use types::{OutputEvent, PaneId, SessionTarget};

//! Shared identifier and event types

use std::fmt;

/// Pane identifier as it appears on the wire (`%output %<id> ...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(pub u32);

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl From<u32> for PaneId {
    fn from(id: u32) -> Self {
        PaneId(id)
    }
}

/// Immutable name of the tmux session or pane the link controls.
///
/// Passed verbatim as the `-t` argument of outbound commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionTarget(String);

impl SessionTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionTarget {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One decoded `%output` payload, tagged with its source pane.
///
/// Produced once by the Control Link's read path and consumed once, in
/// arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub pane: PaneId,
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pane_id_display_uses_wire_form() {
        assert_eq!(PaneId(3).to_string(), "%3");
    }

    #[test]
    fn session_target_roundtrip() {
        let target = SessionTarget::new("main:1.0");
        assert_eq!(target.as_str(), "main:1.0");
        assert_eq!(target.to_string(), "main:1.0");
    }

    #[test]
    fn output_event_equality() {
        let a = OutputEvent {
            pane: PaneId(1),
            data: b"hi".to_vec(),
        };
        assert_eq!(a, a.clone());
    }
}

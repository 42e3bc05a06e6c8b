//! Outbound command encoding
//!
//! Every command the bridge sends is one ASCII line terminated by a single
//! newline. Commands that address a pane carry the immutable session target
//! as their `-t` argument.

use crate::types::SessionTarget;

/// One outbound control-mode command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `refresh-client -C <cols>,<rows>`: resize the control client's
    /// notional terminal and request a refresh
    RefreshClient { cols: u16, rows: u16 },
    /// `send-keys -t <target> <key>` for a named key or `C-x` combination
    SendKey {
        target: SessionTarget,
        key: String,
    },
    /// `send-keys -t <target> -l <quoted>` for literal text, quoted so the
    /// receiving parser reconstructs the exact rune sequence
    SendLiteral {
        target: SessionTarget,
        text: String,
    },
    /// `send-keys -t <target> C-l`, the conventional repaint nudge used right
    /// after attaching, since control mode emits no initial snapshot
    RedrawNudge { target: SessionTarget },
}

impl Command {
    /// Encode into the full wire line, including the trailing newline.
    pub fn encode(&self) -> String {
        match self {
            Command::RefreshClient { cols, rows } => {
                format!("refresh-client -C {},{}\n", cols, rows)
            }
            Command::SendKey { target, key } => {
                format!("send-keys -t {} {}\n", target, key)
            }
            Command::SendLiteral { target, text } => {
                format!("send-keys -t {} -l {}\n", target, quote_literal(text))
            }
            Command::RedrawNudge { target } => {
                format!("send-keys -t {} C-l\n", target)
            }
        }
    }
}

/// Quote literal text for the command parser.
///
/// Single quotes pass every byte through verbatim (including non-ASCII); an
/// embedded single quote is spliced in via the usual `'\''` dance.
fn quote_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> SessionTarget {
        SessionTarget::new("main")
    }

    #[test]
    fn encode_refresh_client() {
        let cmd = Command::RefreshClient {
            cols: 120,
            rows: 40,
        };
        assert_eq!(cmd.encode(), "refresh-client -C 120,40\n");
    }

    #[test]
    fn encode_named_key() {
        let cmd = Command::SendKey {
            target: target(),
            key: "Enter".into(),
        };
        assert_eq!(cmd.encode(), "send-keys -t main Enter\n");
    }

    #[test]
    fn encode_control_combo() {
        let cmd = Command::SendKey {
            target: target(),
            key: "C-a".into(),
        };
        assert_eq!(cmd.encode(), "send-keys -t main C-a\n");
    }

    #[test]
    fn encode_literal_plain() {
        let cmd = Command::SendLiteral {
            target: target(),
            text: "hello".into(),
        };
        assert_eq!(cmd.encode(), "send-keys -t main -l 'hello'\n");
    }

    #[test]
    fn encode_literal_with_quote() {
        let cmd = Command::SendLiteral {
            target: target(),
            text: "it's".into(),
        };
        assert_eq!(cmd.encode(), "send-keys -t main -l 'it'\\''s'\n");
    }

    #[test]
    fn encode_literal_non_ascii() {
        let cmd = Command::SendLiteral {
            target: target(),
            text: "héllo✓".into(),
        };
        assert_eq!(cmd.encode(), "send-keys -t main -l 'héllo✓'\n");
    }

    #[test]
    fn encode_redraw_nudge() {
        let cmd = Command::RedrawNudge { target: target() };
        assert_eq!(cmd.encode(), "send-keys -t main C-l\n");
    }

    #[test]
    fn encode_ends_with_single_newline() {
        let cmds = [
            Command::RefreshClient { cols: 80, rows: 24 },
            Command::SendKey {
                target: target(),
                key: "Up".into(),
            },
            Command::SendLiteral {
                target: target(),
                text: "x".into(),
            },
            Command::RedrawNudge { target: target() },
        ];
        for cmd in cmds {
            let line = cmd.encode();
            assert!(line.ends_with('\n'));
            assert_eq!(line.matches('\n').count(), 1);
        }
    }
}

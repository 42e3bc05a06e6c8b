//! Inbound control-mode line classification
//!
//! tmux control mode is line oriented: asynchronous notifications are single
//! `%`-prefixed lines, command replies are bracketed by `%begin`/`%end`
//! guards. The bridge only acts on `%output`; everything else is recognized
//! so callers can log it and move on.

use crate::escape;
use crate::types::PaneId;

/// One classified inbound line.
///
/// Classification is total: any line, including invalid UTF-8 or garbage,
/// maps to a variant. Only [`Notification::Output`] carries data the bridge
/// acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// `%output %<pane> <octal-escaped payload>`, with the payload decoded
    Output { pane: PaneId, data: Vec<u8> },
    /// A `%begin`, `%end`, or `%error` command reply guard
    ReplyGuard,
    /// `%exit [reason]`: the control session is ending
    Exit,
    /// Any other `%`-prefixed notification (`%layout-change`,
    /// `%session-changed`, `%window-add`, ...)
    OtherControl,
    /// A line inside a reply block or otherwise unrecognized
    Unrecognized,
}

impl Notification {
    /// Classify one inbound line (without its trailing newline).
    pub fn parse(line: &[u8]) -> Notification {
        if let Some(rest) = line.strip_prefix(b"%output %".as_slice()) {
            if let Some((pane, payload)) = split_pane_id(rest) {
                return Notification::Output {
                    pane,
                    data: escape::decode(payload),
                };
            }
            return Notification::Unrecognized;
        }

        let word = first_word(line);
        match word {
            b"%begin" | b"%end" | b"%error" => Notification::ReplyGuard,
            b"%exit" => Notification::Exit,
            _ if word.starts_with(b"%") => Notification::OtherControl,
            _ => Notification::Unrecognized,
        }
    }
}

/// Split `<digits> <payload>` into a pane id and the raw payload.
fn split_pane_id(rest: &[u8]) -> Option<(PaneId, &[u8])> {
    let space = rest.iter().position(|&b| b == b' ')?;
    let (digits, payload) = rest.split_at(space);
    if digits.is_empty() || !digits.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id: u32 = std::str::from_utf8(digits).ok()?.parse().ok()?;
    Some((PaneId(id), &payload[1..]))
}

fn first_word(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .position(|&b| b == b' ')
        .unwrap_or(line.len());
    &line[..end]
}

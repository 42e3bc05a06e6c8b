//! Key event dispatch
//!
//! Maps abstract key events onto control-mode sends. [`map_key`] is a total
//! function producing a tagged outcome, so adding a key means adding a match
//! arm rather than touching control flow; [`dispatch`] turns the outcome into
//! at most one Control Link send.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::link::ControlLink;
use muxlink_utils::Result;

/// Control combinations the surrounding UI reserves for quitting; they are
/// intercepted before dispatch and never reach the remote session.
const RESERVED_QUIT_COMBOS: [char; 2] = ['q', 'w'];

/// The single outcome of mapping one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// A key tmux knows by name (`Enter`, `PPage`, ...)
    NamedKey(&'static str),
    /// Ctrl plus a letter, sent as `C-<letter>`
    ControlCombo(char),
    /// A printable rune sent as literal text
    Literal(char),
    /// Nothing to send
    NoOp,
}

/// Map a key event to its dispatch outcome. Total: every event maps to
/// exactly one action.
pub fn map_key(key: &KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter => KeyAction::NamedKey("Enter"),
        KeyCode::Esc => KeyAction::NamedKey("Escape"),
        KeyCode::Backspace => KeyAction::NamedKey("BSpace"),
        KeyCode::Delete => KeyAction::NamedKey("DC"),
        KeyCode::Tab => KeyAction::NamedKey("Tab"),
        KeyCode::Up => KeyAction::NamedKey("Up"),
        KeyCode::Down => KeyAction::NamedKey("Down"),
        KeyCode::Left => KeyAction::NamedKey("Left"),
        KeyCode::Right => KeyAction::NamedKey("Right"),
        KeyCode::Home => KeyAction::NamedKey("Home"),
        KeyCode::End => KeyAction::NamedKey("End"),
        KeyCode::PageUp => KeyAction::NamedKey("PPage"),
        KeyCode::PageDown => KeyAction::NamedKey("NPage"),
        KeyCode::Char(c) => map_char(c, key.modifiers),
        _ => KeyAction::NoOp,
    }
}

fn map_char(c: char, modifiers: KeyModifiers) -> KeyAction {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if c.is_ascii_alphabetic() {
            let letter = c.to_ascii_lowercase();
            if RESERVED_QUIT_COMBOS.contains(&letter) {
                return KeyAction::NoOp;
            }
            return KeyAction::ControlCombo(letter);
        }
        return KeyAction::NoOp;
    }

    if modifiers.contains(KeyModifiers::ALT) {
        return KeyAction::NoOp;
    }

    // Shift is already folded into the rune for printable input
    if c == ' ' {
        KeyAction::NamedKey("Space")
    } else if c.is_control() {
        KeyAction::NoOp
    } else {
        KeyAction::Literal(c)
    }
}

/// Apply an action to the link: exactly one send, or none for a no-op.
pub fn dispatch(link: &ControlLink, action: KeyAction) -> Result<()> {
    match action {
        KeyAction::NamedKey(name) => link.send_named_key(name),
        KeyAction::ControlCombo(letter) => link.send_named_key(&format!("C-{}", letter)),
        KeyAction::Literal(c) => link.send_literal_text(&c.to_string()),
        KeyAction::NoOp => Ok(()),
    }
}

//! Cell grid to escape-coded text
//!
//! Serializes a snapshot into the minimal SGR-coded blob that reproduces the
//! same appearance on any escape-aware surface. Styling is tracked as maximal
//! runs: a code is only emitted when the (fg, bg, attrs) triple changes, and
//! the tracked state resets to default at every row boundary so each row is
//! self-contained.

use std::fmt::Write as _;

use crate::grid::{Cell, CellAttrs, Color, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Style {
    fg: Color,
    bg: Color,
    attrs: CellAttrs,
}

impl Style {
    fn of(cell: &Cell) -> Style {
        Style {
            fg: cell.fg,
            bg: cell.bg,
            attrs: cell.attrs,
        }
    }

    fn is_default(&self) -> bool {
        *self == Style::default()
    }
}

/// Serialize a snapshot into SGR-coded text.
///
/// Rows are newline-joined with no trailing newline. A row that emitted any
/// styling is closed with a reset; a row that stayed default emits nothing,
/// so the closing reset is conditional rather than unconditional. That keeps
/// the transform deterministic and idempotent, and a uniformly
/// default-styled snapshot comes out as bare text with no SGR codes at all.
pub fn serialize(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    for y in 0..snapshot.rows() {
        if y > 0 {
            out.push('\n');
        }

        // Style redetection restarts on the first cell of each row
        let mut current = Style::default();
        for x in 0..snapshot.cols() {
            let cell = snapshot.cell(x, y);
            let style = Style::of(&cell);
            if style != current {
                emit_style(&mut out, &style);
                current = style;
            }
            out.push(cell.ch);
        }

        // Close any styled row; an all-default row emitted nothing to close
        if !current.is_default() {
            out.push_str("\x1b[0m");
        }
    }

    out
}

/// Emit the full code sequence for a style change: reset, one code per
/// active attribute flag, then foreground, then background.
fn emit_style(out: &mut String, style: &Style) {
    out.push_str("\x1b[0m");

    let attrs = &style.attrs;
    if attrs.bold {
        out.push_str("\x1b[1m");
    }
    if attrs.italic {
        out.push_str("\x1b[3m");
    }
    if attrs.underline {
        out.push_str("\x1b[4m");
    }
    if attrs.blink {
        out.push_str("\x1b[5m");
    }
    if attrs.reverse {
        out.push_str("\x1b[7m");
    }

    if let Some(code) = color_code(style.fg, ColorPlane::Foreground) {
        out.push_str(&code);
    }
    if let Some(code) = color_code(style.bg, ColorPlane::Background) {
        out.push_str(&code);
    }
}

#[derive(Clone, Copy)]
enum ColorPlane {
    Foreground,
    Background,
}

/// SGR code for one color component; default colors emit nothing.
fn color_code(color: Color, plane: ColorPlane) -> Option<String> {
    let mut code = String::new();
    match color {
        Color::Default => return None,
        Color::Indexed(i @ 0..=7) => {
            let base = match plane {
                ColorPlane::Foreground => 30,
                ColorPlane::Background => 40,
            };
            let _ = write!(code, "\x1b[{}m", base + u16::from(i));
        }
        Color::Indexed(i @ 8..=15) => {
            let base = match plane {
                ColorPlane::Foreground => 90,
                ColorPlane::Background => 100,
            };
            let _ = write!(code, "\x1b[{}m", base + u16::from(i - 8));
        }
        Color::Indexed(i) => {
            let selector = match plane {
                ColorPlane::Foreground => 38,
                ColorPlane::Background => 48,
            };
            let _ = write!(code, "\x1b[{};5;{}m", selector, i);
        }
        Color::Rgb(r, g, b) => {
            let selector = match plane {
                ColorPlane::Foreground => 38,
                ColorPlane::Background => 48,
            };
            let _ = write!(code, "\x1b[{};2;{};{};{}m", selector, r, g, b);
        }
    }
    Some(code)
}

//! Terminal-state adapter over vt100
//!
//! The bridge never interprets escape sequences itself; vt100 owns the
//! authoritative cell and cursor grid. This adapter owns the lock guarding
//! that state. It is a separate lock domain from the control link's send
//! lock, so a render can never be queued behind a send or vice versa.

// Cursor accessors are part of the adapter API even where the binary reads
// the snapshot instead
#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use crate::grid::{Cell, CellAttrs, Color, Snapshot};

/// Shared handle to one pane's terminal state.
#[derive(Clone)]
pub struct TerminalState {
    parser: Arc<Mutex<vt100::Parser>>,
}

impl TerminalState {
    pub fn new(cols: u16, rows: u16) -> TerminalState {
        TerminalState {
            parser: Arc::new(Mutex::new(vt100::Parser::new(rows, cols, 0))),
        }
    }

    /// Feed decoded pane output into the state machine.
    pub fn write(&self, data: &[u8]) {
        self.parser.lock().process(data);
    }

    pub fn resize(&self, cols: u16, rows: u16) {
        self.parser.lock().set_size(rows, cols);
    }

    /// Current cursor position as (x, y)
    pub fn cursor(&self) -> (u16, u16) {
        let parser = self.parser.lock();
        let (row, col) = parser.screen().cursor_position();
        (col, row)
    }

    pub fn cursor_visible(&self) -> bool {
        !self.parser.lock().screen().hide_cursor()
    }

    /// Take an immutable grid snapshot under the state lock.
    pub fn snapshot(&self) -> Snapshot {
        let parser = self.parser.lock();
        let screen = parser.screen();
        let (rows, cols) = screen.size();

        let mut cells = Vec::with_capacity(usize::from(cols) * usize::from(rows));
        for row in 0..rows {
            for col in 0..cols {
                cells.push(match screen.cell(row, col) {
                    Some(cell) => convert_cell(cell),
                    None => Cell::default(),
                });
            }
        }

        let (cursor_row, cursor_col) = screen.cursor_position();
        Snapshot::new(
            cols,
            rows,
            cells,
            (cursor_col, cursor_row),
            !screen.hide_cursor(),
        )
    }
}

fn convert_cell(cell: &vt100::Cell) -> Cell {
    let contents = cell.contents();
    Cell {
        ch: contents.chars().next().unwrap_or(' '),
        fg: convert_color(cell.fgcolor()),
        bg: convert_color(cell.bgcolor()),
        attrs: CellAttrs {
            bold: cell.bold(),
            italic: cell.italic(),
            underline: cell.underline(),
            // vt100 does not track blink; the flag stays in the model for
            // sources that do
            blink: false,
            reverse: cell.inverse(),
        },
    }
}

fn convert_color(color: vt100::Color) -> Color {
    match color {
        vt100::Color::Default => Color::Default,
        vt100::Color::Idx(i) => Color::Indexed(i),
        vt100::Color::Rgb(r, g, b) => Color::Rgb(r, g, b),
    }
}

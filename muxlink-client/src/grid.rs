//! Cell-grid snapshot types
//!
//! The render serializer works from an immutable snapshot of the terminal
//! state, taken under the terminal adapter's lock. Colors are an explicit
//! tagged variant; the legacy packed 24-bit form is only accepted at this
//! boundary via [`Color::from_packed`].

// Conversion helpers here are part of the snapshot API even where the binary
// doesn't reach them yet
#![allow(dead_code)]

/// A cell color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Terminal default foreground/background
    #[default]
    Default,
    /// Palette index: 0-7 standard, 8-15 bright, 16-255 extended
    Indexed(u8),
    /// Direct 24-bit color
    Rgb(u8, u8, u8),
}

impl Color {
    /// Translate the legacy packed encoding: values below 256 are palette
    /// indices, anything else is 24-bit RGB with red in bits 16-23, green in
    /// bits 8-15, blue in bits 0-7.
    pub fn from_packed(value: u32) -> Color {
        if value < 256 {
            Color::Indexed(value as u8)
        } else {
            Color::Rgb(
                ((value >> 16) & 0xff) as u8,
                ((value >> 8) & 0xff) as u8,
                (value & 0xff) as u8,
            )
        }
    }
}

/// Cell attribute flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellAttrs {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub reverse: bool,
}

impl CellAttrs {
    pub fn is_plain(&self) -> bool {
        *self == CellAttrs::default()
    }
}

/// One cell of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::Default,
            bg: Color::Default,
            attrs: CellAttrs::default(),
        }
    }
}

/// An immutable W x H grid snapshot plus cursor state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
    pub cursor: (u16, u16),
    pub cursor_visible: bool,
}

impl Snapshot {
    /// Build a snapshot from row-major cells. The vector length must be
    /// `cols * rows`.
    pub fn new(cols: u16, rows: u16, cells: Vec<Cell>, cursor: (u16, u16), cursor_visible: bool) -> Snapshot {
        debug_assert_eq!(cells.len(), usize::from(cols) * usize::from(rows));
        Snapshot {
            cols,
            rows,
            cells,
            cursor,
            cursor_visible,
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Cell at (x, y); out-of-range coordinates read as the default cell.
    pub fn cell(&self, x: u16, y: u16) -> Cell {
        if x >= self.cols || y >= self.rows {
            return Cell::default();
        }
        self.cells[usize::from(y) * usize::from(self.cols) + usize::from(x)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_packed_low_values_are_indices() {
        assert_eq!(Color::from_packed(0), Color::Indexed(0));
        assert_eq!(Color::from_packed(7), Color::Indexed(7));
        assert_eq!(Color::from_packed(15), Color::Indexed(15));
        assert_eq!(Color::from_packed(255), Color::Indexed(255));
    }

    #[test]
    fn from_packed_high_values_are_rgb() {
        assert_eq!(Color::from_packed(0x00ff8040), Color::Rgb(0xff, 0x80, 0x40));
        assert_eq!(Color::from_packed(0x00000100), Color::Rgb(0, 1, 0));
    }

    #[test]
    fn default_cell_is_blank() {
        let cell = Cell::default();
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.fg, Color::Default);
        assert_eq!(cell.bg, Color::Default);
        assert!(cell.attrs.is_plain());
    }

    #[test]
    fn snapshot_indexing_row_major() {
        let mut cells = vec![Cell::default(); 6];
        cells[4].ch = 'x'; // (1, 1) on a 3-wide grid
        let snap = Snapshot::new(3, 2, cells, (0, 0), true);
        assert_eq!(snap.cell(1, 1).ch, 'x');
        assert_eq!(snap.cell(0, 0).ch, ' ');
    }

    #[test]
    fn snapshot_out_of_range_reads_default() {
        let snap = Snapshot::new(2, 2, vec![Cell::default(); 4], (0, 0), true);
        assert_eq!(snap.cell(5, 5), Cell::default());
    }
}

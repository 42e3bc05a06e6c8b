//! Pane layout engine
//!
//! Pure partitioning of a W x H surface into non-overlapping, exactly-tiling
//! pane rectangles. The partition rule is a swappable [`LayoutStrategy`];
//! [`HalvedGrid`] is the baseline, a fixed-case grid defined for 0, 1, 2, or
//! 4 panes.

// Geometry helpers here are part of the pane API even where the binary
// doesn't reach them yet
#![allow(dead_code)]

/// An inclusive pane rectangle: (x0, y0) through (x1, y1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneRect {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl PaneRect {
    pub fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> PaneRect {
        PaneRect { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> u16 {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> u16 {
        self.y1 - self.y0 + 1
    }

    pub fn overlaps(&self, other: &PaneRect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }
}

/// A rule for partitioning a surface among a number of panes.
pub trait LayoutStrategy {
    /// Produce rectangles for `panes` panes on a `width` x `height` surface.
    ///
    /// Never fails: degenerate dimensions degrade to a best-effort, possibly
    /// smaller, set of well-formed rectangles.
    fn arrange(&self, panes: usize, width: u16, height: u16) -> Vec<PaneRect>;
}

/// The baseline strategy: full surface for one pane, vertical halving for
/// two, halving on both axes for four. The right/bottom side absorbs any odd
/// remainder. Pane counts outside {0, 1, 2, 4} are not defined and yield no
/// rectangles.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalvedGrid;

impl LayoutStrategy for HalvedGrid {
    fn arrange(&self, panes: usize, width: u16, height: u16) -> Vec<PaneRect> {
        if width == 0 || height == 0 {
            return Vec::new();
        }

        // Inclusive column/row spans for each half; a half that rounds down
        // to zero cells is simply absent.
        let left = (width >= 2).then(|| (0, width / 2 - 1));
        let right = (width / 2, width - 1);
        let top = (height >= 2).then(|| (0, height / 2 - 1));
        let bottom = (height / 2, height - 1);
        let full_x = (0, width - 1);
        let full_y = (0, height - 1);

        let spans: Vec<((u16, u16), (u16, u16))> = match panes {
            0 => Vec::new(),
            1 => vec![(full_x, full_y)],
            2 => [left, Some(right)]
                .into_iter()
                .flatten()
                .map(|x| (x, full_y))
                .collect(),
            4 => [top, Some(bottom)]
                .into_iter()
                .flatten()
                .flat_map(|y| {
                    [left, Some(right)]
                        .into_iter()
                        .flatten()
                        .map(move |x| (x, y))
                })
                .collect(),
            _ => Vec::new(),
        };

        spans
            .into_iter()
            .map(|((x0, x1), (y0, y1))| PaneRect::new(x0, y0, x1, y1))
            .collect()
    }
}

/// Arrange `panes` panes with the baseline strategy.
pub fn layout(panes: usize, width: u16, height: u16) -> Vec<PaneRect> {
    HalvedGrid.arrange(panes, width, height)
}

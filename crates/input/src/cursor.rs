//! Board cursor driven by [`UiAction::MoveCursor`].

use crate::map::UiAction;
use crate::types::Coord;

/// Cursor position clamped to a `rows x cols` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    at: Coord,
    rows: i16,
    cols: i16,
}

impl Cursor {
    /// Cursor at the centre of the grid.
    pub fn new(rows: i16, cols: i16) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            at: Coord::new(rows / 2, cols / 2),
            rows,
            cols,
        }
    }

    pub fn position(&self) -> Coord {
        self.at
    }

    /// Apply a cursor move; other actions are ignored. Returns true if the cursor moved.
    pub fn apply(&mut self, action: UiAction) -> bool {
        let UiAction::MoveCursor { d_row, d_col } = action else {
            return false;
        };
        let next = Coord::new(
            (self.at.row + d_row).clamp(0, self.rows - 1),
            (self.at.col + d_col).clamp(0, self.cols - 1),
        );
        let moved = next != self.at;
        self.at = next;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_centered() {
        assert_eq!(Cursor::new(8, 7).position(), Coord::new(4, 3));
    }

    #[test]
    fn clamps_at_edges() {
        let mut cursor = Cursor::new(2, 2);
        assert!(!cursor.apply(UiAction::MoveCursor { d_row: 1, d_col: 0 }));
        assert!(cursor.apply(UiAction::MoveCursor { d_row: -1, d_col: 0 }));
        assert!(!cursor.apply(UiAction::MoveCursor { d_row: -1, d_col: 0 }));
        assert_eq!(cursor.position(), Coord::new(0, 1));
        assert!(!cursor.apply(UiAction::Select));
    }
}

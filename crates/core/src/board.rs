//! Board module - the token grid and its shape mask
//!
//! The board is a `rows x cols` grid stored as a flat, row-major `Vec<Cell>`.
//! A [`ShapeMask`] marks which coordinates are playable; inactive cells are never
//! written, never matched and never crossed by gravity bookkeeping.
//! Coordinates: `(row, col)` where row 0 is the top and gravity pulls towards the last row.

use crate::error::ConfigError;
use crate::rng::RandomSource;
use crate::types::{Cell, ColorId, Coord, Token, MAX_BOARD_DIM};

/// Immutable playable-cell mask for a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMask {
    rows: i16,
    cols: i16,
    active: Vec<bool>,
}

impl ShapeMask {
    /// A rectangular mask with every cell active.
    pub fn full(rows: i16, cols: i16) -> Self {
        let len = rows.max(0) as usize * cols.max(0) as usize;
        Self {
            rows: rows.max(0),
            cols: cols.max(0),
            active: vec![true; len],
        }
    }

    /// Build from explicit rows; every row must have the same length.
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self, ConfigError> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.len() > MAX_BOARD_DIM as usize || width > MAX_BOARD_DIM as usize {
            return Err(ConfigError::Dimensions {
                rows: rows.len().min(i16::MAX as usize) as i16,
                cols: width.min(i16::MAX as usize) as i16,
                max: MAX_BOARD_DIM,
            });
        }
        let mut active = Vec::with_capacity(rows.len() * width);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(ConfigError::RaggedLayout {
                    row: i,
                    len: row.len(),
                    expected: width,
                });
            }
            active.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len() as i16,
            cols: width as i16,
            active,
        })
    }

    pub fn rows(&self) -> i16 {
        self.rows
    }

    pub fn cols(&self) -> i16 {
        self.cols
    }

    #[inline(always)]
    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.row < 0 || coord.row >= self.rows || coord.col < 0 || coord.col >= self.cols {
            return None;
        }
        Some(coord.row as usize * self.cols as usize + coord.col as usize)
    }

    /// True if `coord` is inside the grid and playable.
    pub fn is_active(&self, coord: Coord) -> bool {
        self.index(coord).map(|i| self.active[i]).unwrap_or(false)
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }
}

/// A token moving down its column during gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub from: Coord,
    pub to: Coord,
}

/// A fresh token dropped into an emptied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub at: Coord,
    pub token: Token,
}

/// Result of compacting every column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collapse {
    pub falls: Vec<Fall>,
    /// Emptied slots left at the top of each column, column by column, top first.
    pub holes: Vec<Coord>,
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    mask: ShapeMask,
    /// Flat cells, row-major (row * cols + col)
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board over `mask`.
    pub fn new(mask: ShapeMask) -> Self {
        let len = mask.active.len();
        Self {
            mask,
            cells: vec![None; len],
        }
    }

    /// Build a board from text rows, mainly for tests and benches.
    ///
    /// `0`-`9` place a plain token of that color, `.` leaves an empty active
    /// cell and `#` marks an inactive cell. Spaces are ignored.
    ///
    /// ```
    /// use cascade_crush_core::Board;
    /// use cascade_crush_types::Coord;
    ///
    /// let board = Board::from_layout(&["01#", "2.3"]).unwrap();
    /// assert_eq!(board.token(Coord::new(0, 1)).map(|t| t.color), Some(1));
    /// assert!(!board.is_active(Coord::new(0, 2)));
    /// assert_eq!(board.get(Coord::new(1, 1)), Some(None));
    /// ```
    pub fn from_layout(lines: &[&str]) -> Result<Self, ConfigError> {
        let mut mask_rows = Vec::with_capacity(lines.len());
        let mut tokens = Vec::with_capacity(lines.len());
        for line in lines {
            let mut mask_row = Vec::new();
            let mut token_row = Vec::new();
            for ch in line.chars().filter(|c| !c.is_whitespace()) {
                match ch {
                    '#' => {
                        mask_row.push(false);
                        token_row.push(None);
                    }
                    '.' => {
                        mask_row.push(true);
                        token_row.push(None);
                    }
                    d if d.is_ascii_digit() => {
                        mask_row.push(true);
                        token_row.push(Some(Token::plain(d as u8 - b'0')));
                    }
                    other => return Err(ConfigError::LayoutChar(other)),
                }
            }
            mask_rows.push(mask_row);
            tokens.push(token_row);
        }

        let mut board = Board::new(ShapeMask::from_rows(&mask_rows)?);
        for (row, token_row) in tokens.iter().enumerate() {
            for (col, cell) in token_row.iter().enumerate() {
                board.set(Coord::new(row as i16, col as i16), *cell);
            }
        }
        Ok(board)
    }

    /// Render back to the [`Board::from_layout`] text form (specials print as their color).
    pub fn to_layout(&self) -> Vec<String> {
        (0..self.rows())
            .map(|row| {
                (0..self.cols())
                    .map(|col| {
                        let c = Coord::new(row, col);
                        if !self.is_active(c) {
                            return '#';
                        }
                        match self.token(c) {
                            Some(t) => char::from(b'0' + t.color.min(9)),
                            None => '.',
                        }
                    })
                    .collect()
            })
            .collect()
    }

    pub fn rows(&self) -> i16 {
        self.mask.rows
    }

    pub fn cols(&self) -> i16 {
        self.mask.cols
    }

    pub fn mask(&self) -> &ShapeMask {
        &self.mask
    }

    /// True if `coord` lies inside the rectangular grid.
    pub fn contains(&self, coord: Coord) -> bool {
        self.mask.index(coord).is_some()
    }

    pub fn is_active(&self, coord: Coord) -> bool {
        self.mask.is_active(coord)
    }

    /// Get cell at `coord`
    /// Returns None if out of bounds
    pub fn get(&self, coord: Coord) -> Option<Cell> {
        self.mask.index(coord).map(|idx| self.cells[idx])
    }

    /// Token at `coord`, if the cell is in bounds and occupied.
    pub fn token(&self, coord: Coord) -> Option<Token> {
        self.get(coord).flatten()
    }

    /// Set cell at `coord`
    /// Returns false if out of bounds or inactive
    pub fn set(&mut self, coord: Coord, cell: Cell) -> bool {
        match self.mask.index(coord) {
            Some(idx) if self.mask.active[idx] => {
                self.cells[idx] = cell;
                true
            }
            _ => false,
        }
    }

    /// Exchange the contents of two active cells.
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        if !self.is_active(a) || !self.is_active(b) {
            return false;
        }
        match (self.mask.index(a), self.mask.index(b)) {
            (Some(ia), Some(ib)) => {
                self.cells.swap(ia, ib);
                true
            }
            _ => false,
        }
    }

    /// Every active coordinate in row-major order.
    pub fn active_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let cols = self.cols();
        (0..self.rows())
            .flat_map(move |row| (0..cols).map(move |col| Coord::new(row, col)))
            .filter(|c| self.is_active(*c))
    }

    /// Every occupied cell in row-major order.
    pub fn tokens(&self) -> impl Iterator<Item = (Coord, Token)> + '_ {
        self.active_coords()
            .filter_map(|c| self.token(c).map(|t| (c, t)))
    }

    /// Coordinates holding a token of `color`.
    pub fn coords_of_color(&self, color: ColorId) -> impl Iterator<Item = Coord> + '_ {
        self.tokens()
            .filter(move |(_, t)| t.color == color)
            .map(|(c, _)| c)
    }

    /// True when every active cell holds a token.
    pub fn is_full(&self) -> bool {
        self.active_coords().all(|c| self.token(c).is_some())
    }

    /// Empty the given cells.
    pub fn clear_cells(&mut self, cells: &[Coord]) {
        for &c in cells {
            self.set(c, None);
        }
    }

    /// Compact every column towards the bottom.
    ///
    /// Each column is treated as the ordered list of its active cells, so tokens
    /// pass over inactive gaps. Emptied slots end up at the top of that list.
    pub fn collapse(&mut self) -> Collapse {
        let mut out = Collapse::default();
        let rows = self.rows();

        for col in 0..self.cols() {
            let slots: Vec<i16> = (0..rows)
                .filter(|&row| self.is_active(Coord::new(row, col)))
                .collect();

            // Two pointers from the bottom of the slot list.
            let mut write = slots.len();
            for read in (0..slots.len()).rev() {
                let from = Coord::new(slots[read], col);
                if let Some(token) = self.token(from) {
                    write -= 1;
                    if write != read {
                        let to = Coord::new(slots[write], col);
                        self.set(to, Some(token));
                        self.set(from, None);
                        out.falls.push(Fall { from, to });
                    }
                }
            }

            out.holes
                .extend(slots[..write].iter().map(|&row| Coord::new(row, col)));
        }

        out
    }

    /// Fill `holes` with fresh plain tokens drawn from `rng`.
    pub fn refill<R: RandomSource + ?Sized>(
        &mut self,
        holes: &[Coord],
        color_pool: u8,
        rng: &mut R,
    ) -> Vec<Spawn> {
        let mut spawns = Vec::with_capacity(holes.len());
        for &at in holes {
            let token = Token::plain(rng.next_color(color_pool));
            if self.set(at, Some(token)) {
                spawns.push(Spawn { at, token });
            }
        }
        spawns
    }
}

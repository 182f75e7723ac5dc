//! Core types module - shared data structures and rule constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, making them usable
//! from the engine, the terminal front-end and the remote-control protocol alike.
//!
//! # Coordinates
//!
//! Boards are addressed as `(row, col)` with `row` growing downwards:
//!
//! - **Row 0** is the top of the board; gravity pulls tokens towards the last row
//! - Coordinates are signed so that neighbour arithmetic never underflows; any
//!   coordinate outside the grid is simply rejected by the board
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_CLEAR_POINTS` | 60 | Points per cleared token at cascade depth 0 |
//! | `CASCADE_BONUS_NUMERATOR` / `CASCADE_BONUS_DENOMINATOR` | 1/2 | Extra multiplier per cascade level |
//! | `STRIPED_CREATION_BONUS` | 120 | Bonus for creating a striped token |
//! | `WRAPPED_CREATION_BONUS` | 200 | Bonus for creating a wrapped token |
//! | `COLOR_BOMB_CREATION_BONUS` | 200 | Bonus for creating a color bomb |
//!
//! # Examples
//!
//! ```
//! use cascade_crush_types::{Coord, Direction, SpecialKind, Token};
//!
//! let a = Coord::new(2, 3);
//! assert!(a.is_adjacent(Coord::new(2, 4)));
//! assert!(!a.is_adjacent(Coord::new(3, 4)));
//!
//! // A horizontal run of four rewards a column-clearing stripe.
//! assert_eq!(Direction::Horizontal.perpendicular_stripe(), SpecialKind::StripedCol);
//!
//! let token = Token::plain(4);
//! assert!(!token.is_special());
//! assert_eq!(SpecialKind::from_str("color_bomb"), Some(SpecialKind::ColorBomb));
//! ```

/// Index into the level's color pool, always in `[0, color_pool_size)`.
pub type ColorId = u8;

/// Shortest run that counts as a match.
pub const MIN_MATCH_LEN: usize = 3;

/// A run of this many tokens creates a striped token.
pub const STRIPED_RUN_LEN: usize = 4;

/// A straight run of at least this many tokens creates a color bomb.
pub const COLOR_BOMB_RUN_LEN: usize = 5;

/// Largest supported color pool (one entry per palette name).
pub const MAX_COLOR_POOL: u8 = 6;

/// Largest supported board edge, in cells.
pub const MAX_BOARD_DIM: i16 = 32;

/// Number of star thresholds per level.
pub const STAR_COUNT: usize = 3;

/// Palette names, indexed by `ColorId`.
///
/// Level catalogs refer to colors by these names in collect objectives.
pub const COLOR_NAMES: [&str; MAX_COLOR_POOL as usize] =
    ["red", "orange", "yellow", "green", "blue", "purple"];

/// Points per cleared token before the cascade multiplier.
pub const BASE_CLEAR_POINTS: u32 = 60;

/// Cascade multiplier numerator: each cascade level adds 1/2 of the base.
pub const CASCADE_BONUS_NUMERATOR: u32 = 1;

/// Cascade multiplier denominator.
pub const CASCADE_BONUS_DENOMINATOR: u32 = 2;

/// Flat bonus for creating a striped token.
pub const STRIPED_CREATION_BONUS: u32 = 120;

/// Flat bonus for creating a wrapped token.
pub const WRAPPED_CREATION_BONUS: u32 = 200;

/// Flat bonus for creating a color bomb.
pub const COLOR_BOMB_CREATION_BONUS: u32 = 200;

/// Redraws per cell the generator tries before it accepts a draw that completes a run.
pub const GENERATION_RETRY_LIMIT: u32 = 64;

/// Cascade passes after which a resolution is force-settled (only reachable with tiny color pools).
pub const MAX_CASCADE_DEPTH: u32 = 256;

/// Look up the palette name of a color.
///
/// ```
/// use cascade_crush_types::color_name;
///
/// assert_eq!(color_name(0), Some("red"));
/// assert_eq!(color_name(5), Some("purple"));
/// assert_eq!(color_name(6), None);
/// ```
pub fn color_name(color: ColorId) -> Option<&'static str> {
    COLOR_NAMES.get(color as usize).copied()
}

/// Resolve a palette name (case-insensitive) to its color id.
///
/// ```
/// use cascade_crush_types::color_from_name;
///
/// assert_eq!(color_from_name("Blue"), Some(4));
/// assert_eq!(color_from_name("teal"), None);
/// ```
pub fn color_from_name(name: &str) -> Option<ColorId> {
    COLOR_NAMES
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name))
        .map(|i| i as ColorId)
}

/// A board position, `row` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coord {
    pub row: i16,
    pub col: i16,
}

impl Coord {
    pub const fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }

    /// True when `other` shares an edge with `self`.
    pub fn is_adjacent(&self, other: Coord) -> bool {
        let dr = (self.row - other.row).abs();
        let dc = (self.col - other.col).abs();
        dr + dc == 1
    }

    /// Integer average of two positions (floor division, rows and columns separately).
    pub fn midpoint(&self, other: Coord) -> Coord {
        Coord {
            row: (self.row + other.row).div_euclid(2),
            col: (self.col + other.col).div_euclid(2),
        }
    }

    /// Offset this coordinate; the result may lie outside any board.
    pub fn offset(&self, d_row: i16, d_col: i16) -> Coord {
        Coord {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Special token kinds
///
/// - **None**: plain token
/// - **StripedRow**: clears its whole row when detonated
/// - **StripedCol**: clears its whole column when detonated
/// - **Wrapped**: clears the 3x3 block around it
/// - **ColorBomb**: clears every token of one color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpecialKind {
    #[default]
    None,
    StripedRow,
    StripedCol,
    Wrapped,
    ColorBomb,
}

impl SpecialKind {
    /// Parse from the snake_case wire name (case-insensitive)
    ///
    /// ```
    /// use cascade_crush_types::SpecialKind;
    ///
    /// assert_eq!(SpecialKind::from_str("striped_row"), Some(SpecialKind::StripedRow));
    /// assert_eq!(SpecialKind::from_str("WRAPPED"), Some(SpecialKind::Wrapped));
    /// assert_eq!(SpecialKind::from_str("rainbow"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(SpecialKind::None),
            "striped_row" => Some(SpecialKind::StripedRow),
            "striped_col" => Some(SpecialKind::StripedCol),
            "wrapped" => Some(SpecialKind::Wrapped),
            "color_bomb" => Some(SpecialKind::ColorBomb),
            _ => None,
        }
    }

    /// snake_case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialKind::None => "none",
            SpecialKind::StripedRow => "striped_row",
            SpecialKind::StripedCol => "striped_col",
            SpecialKind::Wrapped => "wrapped",
            SpecialKind::ColorBomb => "color_bomb",
        }
    }

    pub fn is_striped(&self) -> bool {
        matches!(self, SpecialKind::StripedRow | SpecialKind::StripedCol)
    }
}

/// Orientation of a straight run of matching tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
        }
    }

    /// Striped kind awarded for a run of four in this direction.
    ///
    /// The stripe clears the opposite axis: a horizontal run yields a
    /// column-clearing token and a vertical run a row-clearing one.
    pub fn perpendicular_stripe(&self) -> SpecialKind {
        match self {
            Direction::Horizontal => SpecialKind::StripedCol,
            Direction::Vertical => SpecialKind::StripedRow,
        }
    }
}

/// A colored token occupying an active cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub color: ColorId,
    pub special: SpecialKind,
}

impl Token {
    pub const fn new(color: ColorId, special: SpecialKind) -> Self {
        Self { color, special }
    }

    /// A token with no special kind.
    pub const fn plain(color: ColorId) -> Self {
        Self {
            color,
            special: SpecialKind::None,
        }
    }

    pub fn is_special(&self) -> bool {
        self.special != SpecialKind::None
    }
}

/// A cell on the game board
///
/// - `None`: empty (awaiting refill, or inactive in the shape mask)
/// - `Some(Token)`: occupied by a token
pub type Cell = Option<Token>;

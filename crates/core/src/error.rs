//! Configuration errors
//!
//! Everything that can make a level attempt impossible to start. Problems with a
//! single move are never errors; see [`crate::run_state::Rejection`].

use thiserror::Error;

use crate::types::ColorId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board dimensions {rows}x{cols} are outside 1..={max}")]
    Dimensions { rows: i16, cols: i16, max: i16 },

    #[error("color pool size {size} is outside 1..={max}")]
    ColorPool { size: u8, max: u8 },

    #[error("shape mask is {rows}x{cols} but the board is {expected_rows}x{expected_cols}")]
    MaskShape {
        rows: usize,
        cols: usize,
        expected_rows: i16,
        expected_cols: i16,
    },

    #[error("shape mask has no active cell")]
    EmptyMask,

    #[error("move limit must be at least 1")]
    ZeroMoveLimit,

    #[error("objective target must be at least 1")]
    ZeroTarget,

    #[error("collect objective has no colors")]
    EmptyCollect,

    #[error("collect objective names color {color} but the pool has {pool} colors")]
    CollectColor { color: ColorId, pool: u8 },

    #[error("jelly objective wants {target} but only {available} jelly tiles exist")]
    JellyTarget { target: u32, available: usize },

    #[error("jelly tile at ({row}, {col}) is outside the playable board")]
    JellyOutsideBoard { row: i16, col: i16 },

    #[error("star thresholds {0:?} must be strictly ascending")]
    StarThresholds([u32; 3]),

    #[error("layout row {row} has {len} cells, expected {expected}")]
    RaggedLayout { row: usize, len: usize, expected: usize },

    #[error("unexpected layout character {0:?}")]
    LayoutChar(char),
}

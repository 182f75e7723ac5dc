//! Board deltas emitted by the cascade engine, in the order they happen.

use crate::board::{Fall, Spawn};
use crate::types::{ColorId, Coord, SpecialKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Two tokens exchanged places.
    Swap { a: Coord, b: Coord },
    /// The swap had no effect and was undone.
    SwapReverted { a: Coord, b: Coord },
    /// A new cascade pass started (depth 1 is the first refill-driven pass).
    CascadeStep { depth: u32 },
    /// A special token went off and marked `cells` for clearing.
    SpecialActivated {
        at: Coord,
        kind: SpecialKind,
        cells: usize,
    },
    /// Tokens removed in one pass and the points they earned.
    Clear { cells: Vec<Coord>, points: u32 },
    /// A special token was placed by a match.
    SpecialCreated {
        at: Coord,
        kind: SpecialKind,
        color: ColorId,
        bonus: u32,
    },
    /// Gravity moved tokens down and fresh tokens filled the top.
    Refill { falls: Vec<Fall>, spawns: Vec<Spawn> },
    LevelComplete { score: u32, stars: u8 },
    LevelFailed { score: u32 },
}

impl Event {
    /// snake_case tag used by observers and the wire protocol.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Event::Swap { .. } => "swap",
            Event::SwapReverted { .. } => "swap_reverted",
            Event::CascadeStep { .. } => "cascade_step",
            Event::SpecialActivated { .. } => "special_activated",
            Event::Clear { .. } => "clear",
            Event::SpecialCreated { .. } => "special_created",
            Event::Refill { .. } => "refill",
            Event::LevelComplete { .. } => "level_complete",
            Event::LevelFailed { .. } => "level_failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::LevelComplete { .. } | Event::LevelFailed { .. })
    }
}

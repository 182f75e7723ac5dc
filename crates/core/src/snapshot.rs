use crate::tracker::{ObjectiveProgress, Outcome};
use crate::types::{Coord, Token};

/// What a presenter sees in one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellView {
    /// Outside the level's shape.
    Inactive,
    #[default]
    Empty,
    Token(Token),
}

/// Engine phase as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PhaseView {
    #[default]
    AwaitingFirstSelection,
    AwaitingSecondSelection,
    Resolving,
    Complete,
    Failed,
}

impl PhaseView {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseView::AwaitingFirstSelection => "awaiting_first_selection",
            PhaseView::AwaitingSecondSelection => "awaiting_second_selection",
            PhaseView::Resolving => "resolving",
            PhaseView::Complete => "complete",
            PhaseView::Failed => "failed",
        }
    }

    pub fn accepts_input(&self) -> bool {
        matches!(
            self,
            PhaseView::AwaitingFirstSelection | PhaseView::AwaitingSecondSelection
        )
    }
}

/// Read-only copy of a run, safe to hand to renderers and observers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardView {
    pub level_id: u32,
    pub rows: i16,
    pub cols: i16,
    /// Row-major cells.
    pub cells: Vec<CellView>,
    /// Jelly tiles not yet cleared.
    pub jelly: Vec<Coord>,
    pub selected: Option<Coord>,
    pub phase: PhaseView,
    pub score: u32,
    pub moves_remaining: u32,
    pub move_limit: u32,
    pub cascade_depth: u32,
    pub stars: u8,
    pub objective_text: String,
    pub objective: Vec<ObjectiveProgress>,
    pub outcome: Option<Outcome>,
}

impl BoardView {
    pub fn cell(&self, at: Coord) -> CellView {
        if at.row < 0 || at.col < 0 || at.row >= self.rows || at.col >= self.cols {
            return CellView::Inactive;
        }
        self.cells
            .get(at.row as usize * self.cols as usize + at.col as usize)
            .copied()
            .unwrap_or(CellView::Inactive)
    }

    pub fn has_jelly(&self, at: Coord) -> bool {
        self.jelly.contains(&at)
    }

    pub fn objective_met(&self) -> bool {
        self.objective.iter().all(|p| p.is_met())
    }

    pub fn playable(&self) -> bool {
        self.phase.accepts_input()
    }

    /// Reset to an empty view while keeping allocations.
    pub fn clear(&mut self) {
        self.level_id = 0;
        self.rows = 0;
        self.cols = 0;
        self.cells.clear();
        self.jelly.clear();
        self.selected = None;
        self.phase = PhaseView::default();
        self.score = 0;
        self.moves_remaining = 0;
        self.move_limit = 0;
        self.cascade_depth = 0;
        self.stars = 0;
        self.objective_text.clear();
        self.objective.clear();
        self.outcome = None;
    }
}

//! Run state module - one level attempt and its cascade engine
//!
//! `RunState` owns the board, the injected RNG and the objective tracker for a
//! single attempt. Input arrives either as two coordinates ([`RunState::attempt_swap`])
//! or as clicks ([`RunState::select`]). An accepted swap enters the resolving
//! phase; every [`RunState::step`] then performs exactly one
//! detect/clear/refill pass so a presenter can pause between cascades.
//! While resolving, further input is ignored.
//!
//! # Phases
//!
//! ```text
//! Idle --select--> Selected --adjacent select--> Resolving --settle--> Idle
//!   ^                 |                              |
//!   +----deselect-----+                              +--> Terminal(Success | Failure)
//! ```

use std::collections::{BTreeSet, VecDeque};

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::error::ConfigError;
use crate::events::Event;
use crate::generator::generate;
use crate::level::LevelConfig;
use crate::matcher::find_matches;
use crate::rng::{RandomSource, SimpleRng};
use crate::scoring::{creation_bonus, score_step, star_rating};
use crate::snapshot::{BoardView, CellView, PhaseView};
use crate::special::{classify, effect_area, group_regions, swap_trigger};
use crate::tracker::{ObjectiveTracker, Outcome};
use crate::types::{ColorId, Coord, SpecialKind, Token, MAX_CASCADE_DEPTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the first selection.
    Idle,
    /// One cell selected, waiting for the second.
    Selected(Coord),
    Resolving,
    Terminal(Outcome),
}

/// Why a swap request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// A coordinate is outside the grid, inactive or empty.
    OutOfBounds,
    NotAdjacent,
    /// The swap formed no match and moved no special token; it was reverted.
    NoEffect,
    /// A resolution is still in progress.
    Resolving,
    /// The attempt already ended.
    AttemptOver,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::OutOfBounds => "out_of_bounds",
            Rejection::NotAdjacent => "not_adjacent",
            Rejection::NoEffect => "no_effect",
            Rejection::Resolving => "resolving",
            Rejection::AttemptOver => "attempt_over",
        }
    }
}

/// Result of a swap request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SwapOutcome {
    pub accepted: bool,
    pub rejection: Option<Rejection>,
    pub events: Vec<Event>,
}

impl SwapOutcome {
    fn rejected(rejection: Rejection, events: Vec<Event>) -> Self {
        Self {
            accepted: false,
            rejection: Some(rejection),
            events,
        }
    }
}

/// Result of a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Selected(Coord),
    Deselected,
    /// The click completed a pair; resolution has begun if the swap was accepted.
    Swapped(SwapOutcome),
    Ignored,
}

/// Swap waiting for its first resolution pass.
#[derive(Debug, Clone)]
struct PendingSwap {
    cells: ArrayVec<Coord, 2>,
    /// Area set off by special tokens in the swap, if any.
    trigger: Option<Vec<Coord>>,
}

/// Complete state of one level attempt
#[derive(Debug, Clone)]
pub struct RunState<R: RandomSource = SimpleRng> {
    config: LevelConfig,
    board: Board,
    rng: R,
    tracker: ObjectiveTracker,
    moves_remaining: u32,
    cascade_depth: u32,
    phase: Phase,
    pending: Option<PendingSwap>,
}

impl<R: RandomSource> RunState<R> {
    /// Validate `config` and start an attempt on a freshly generated board.
    pub fn start_attempt(config: LevelConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = generate(&config.mask()?, config.color_pool, &mut rng)?;
        log::debug!(
            "level {} started: {}x{}, {} moves, {} colors",
            config.id,
            config.rows,
            config.cols,
            config.move_limit,
            config.color_pool
        );
        Ok(Self::assemble(config, board, rng))
    }

    /// Start an attempt on a prepared board; its mask must match the level's.
    pub fn with_board(config: LevelConfig, board: Board, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        if board.mask() != &config.mask()? {
            return Err(ConfigError::MaskShape {
                rows: board.rows().max(0) as usize,
                cols: board.cols().max(0) as usize,
                expected_rows: config.rows,
                expected_cols: config.cols,
            });
        }
        Ok(Self::assemble(config, board, rng))
    }

    fn assemble(config: LevelConfig, board: Board, rng: R) -> Self {
        let tracker = ObjectiveTracker::new(config.objective.clone(), config.jelly_set());
        Self {
            moves_remaining: config.move_limit,
            config,
            board,
            rng,
            tracker,
            cascade_depth: 0,
            phase: Phase::Idle,
            pending: None,
        }
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tracker(&self) -> &ObjectiveTracker {
        &self.tracker
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.tracker.score()
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    pub fn cascade_depth(&self) -> u32 {
        self.cascade_depth
    }

    pub fn selected(&self) -> Option<Coord> {
        match self.phase {
            Phase::Selected(at) => Some(at),
            _ => None,
        }
    }

    pub fn is_resolving(&self) -> bool {
        self.phase == Phase::Resolving
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn stars(&self) -> u8 {
        star_rating(self.score(), &self.config.stars)
    }

    /// Click a cell: select, deselect, reselect or complete a swap.
    pub fn select(&mut self, at: Coord) -> Selection {
        let selectable = self.board.token(at).is_some();
        match self.phase {
            Phase::Resolving | Phase::Terminal(_) => Selection::Ignored,
            Phase::Idle => {
                if !selectable {
                    return Selection::Ignored;
                }
                self.phase = Phase::Selected(at);
                Selection::Selected(at)
            }
            Phase::Selected(first) if first == at => {
                self.phase = Phase::Idle;
                Selection::Deselected
            }
            Phase::Selected(_) if !selectable => Selection::Ignored,
            Phase::Selected(first) if first.is_adjacent(at) => {
                self.phase = Phase::Idle;
                Selection::Swapped(self.begin_swap(first, at))
            }
            Phase::Selected(_) => {
                self.phase = Phase::Selected(at);
                Selection::Selected(at)
            }
        }
    }

    /// Try a swap and, if accepted, enter the resolving phase without running any pass.
    pub fn begin_swap(&mut self, a: Coord, b: Coord) -> SwapOutcome {
        match self.phase {
            Phase::Resolving => return SwapOutcome::rejected(Rejection::Resolving, Vec::new()),
            Phase::Terminal(_) => {
                return SwapOutcome::rejected(Rejection::AttemptOver, Vec::new())
            }
            Phase::Idle | Phase::Selected(_) => {}
        }
        if self.board.token(a).is_none() || self.board.token(b).is_none() {
            return SwapOutcome::rejected(Rejection::OutOfBounds, Vec::new());
        }
        if !a.is_adjacent(b) {
            return SwapOutcome::rejected(Rejection::NotAdjacent, Vec::new());
        }

        self.phase = Phase::Idle;
        self.board.swap(a, b);
        let mut events = vec![Event::Swap { a, b }];

        let trigger = swap_trigger(&self.board, a, b);
        let matched = find_matches(&self.board)
            .iter()
            .any(|r| r.contains(a) || r.contains(b));

        if trigger.is_none() && !matched {
            self.board.swap(a, b);
            events.push(Event::SwapReverted { a, b });
            return SwapOutcome::rejected(Rejection::NoEffect, events);
        }

        self.moves_remaining = self.moves_remaining.saturating_sub(1);
        self.cascade_depth = 0;
        self.phase = Phase::Resolving;
        self.pending = Some(PendingSwap {
            cells: [a, b].into_iter().collect(),
            trigger,
        });

        SwapOutcome {
            accepted: true,
            rejection: None,
            events,
        }
    }

    /// Swap and resolve to completion.
    pub fn attempt_swap(&mut self, a: Coord, b: Coord) -> SwapOutcome {
        let mut outcome = self.begin_swap(a, b);
        if outcome.accepted {
            outcome.events.extend(self.resolve());
        }
        outcome
    }

    /// Run passes until the board settles.
    pub fn resolve(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while self.is_resolving() {
            events.extend(self.step());
        }
        events
    }

    /// Perform one detect/clear/refill pass. Does nothing unless resolving.
    pub fn step(&mut self) -> Vec<Event> {
        if !self.is_resolving() {
            return Vec::new();
        }

        let mut events = Vec::new();
        if self.cascade_depth > 0 {
            events.push(Event::CascadeStep {
                depth: self.cascade_depth,
            });
        }

        let pending = self.pending.take();
        let regions = find_matches(&self.board);
        let groups = group_regions(&regions);

        let spawns: Vec<(Coord, SpecialKind, ColorId)> = groups
            .iter()
            .filter_map(|g| classify(&g.positions, g.direction).map(|s| (s.at, s.kind, g.color)))
            .collect();
        let protected: BTreeSet<Coord> = spawns.iter().map(|s| s.0).collect();

        let mut marked: BTreeSet<Coord> = regions
            .iter()
            .flat_map(|r| r.positions.iter().copied())
            .collect();
        let mut detonated: BTreeSet<Coord> = BTreeSet::new();
        if let Some(PendingSwap {
            cells,
            trigger: Some(area),
        }) = pending
        {
            marked.extend(area);
            detonated.extend(cells);
        }
        marked.retain(|c| !protected.contains(c));

        self.chain_detonations(&mut marked, &mut detonated, &protected, &mut events);

        let cleared: Vec<Coord> = marked.into_iter().collect();
        for &at in &cleared {
            if let Some(token) = self.board.token(at) {
                self.tracker.record_clear(at, token);
            }
        }
        self.board.clear_cells(&cleared);

        for &(at, kind, color) in &spawns {
            self.board.set(at, Some(Token::new(color, kind)));
        }

        let kinds: Vec<SpecialKind> = spawns.iter().map(|s| s.1).collect();
        let score = score_step(cleared.len(), self.cascade_depth, &kinds);
        self.tracker.add_score(score.total);

        log::debug!(
            "pass depth={} cleared={} created={} points={}",
            self.cascade_depth,
            cleared.len(),
            kinds.len(),
            score.total
        );

        events.push(Event::Clear {
            cells: cleared,
            points: score.clear_points,
        });
        for (at, kind, color) in spawns {
            events.push(Event::SpecialCreated {
                at,
                kind,
                color,
                bonus: creation_bonus(kind),
            });
        }

        let collapse = self.board.collapse();
        let spawned = self
            .board
            .refill(&collapse.holes, self.config.color_pool, &mut self.rng);
        events.push(Event::Refill {
            falls: collapse.falls,
            spawns: spawned,
        });

        if find_matches(&self.board).is_empty() {
            self.settle(&mut events);
        } else if self.cascade_depth + 1 >= MAX_CASCADE_DEPTH {
            log::warn!(
                "cascade reached depth {}; settling with matches on the board",
                MAX_CASCADE_DEPTH
            );
            self.settle(&mut events);
        } else {
            self.cascade_depth += 1;
        }

        events
    }

    /// Detonate every special token inside `marked`, following chains.
    ///
    /// A special sitting on a spawn cell still fires; only its cell is kept
    /// out of `marked` so the new token can take it.
    fn chain_detonations(
        &self,
        marked: &mut BTreeSet<Coord>,
        detonated: &mut BTreeSet<Coord>,
        protected: &BTreeSet<Coord>,
        events: &mut Vec<Event>,
    ) {
        let mut queue: VecDeque<Coord> = marked
            .iter()
            .chain(protected)
            .copied()
            .filter(|c| self.is_live_special(*c, detonated))
            .collect();

        while let Some(at) = queue.pop_front() {
            let Some(token) = self.board.token(at) else {
                continue;
            };
            if !detonated.insert(at) {
                continue;
            }

            let target = (token.special == SpecialKind::ColorBomb).then_some(token.color);
            let area = effect_area(token.special, at, &self.board, target);
            log::debug!("{} detonated at {} ({} cells)", token.special.as_str(), at, area.len());
            events.push(Event::SpecialActivated {
                at,
                kind: token.special,
                cells: area.len(),
            });

            for c in area {
                let reached = protected.contains(&c) || marked.insert(c);
                if reached && self.is_live_special(c, detonated) {
                    queue.push_back(c);
                }
            }
        }
    }

    fn is_live_special(&self, at: Coord, detonated: &BTreeSet<Coord>) -> bool {
        !detonated.contains(&at) && self.board.token(at).map_or(false, |t| t.is_special())
    }

    fn settle(&mut self, events: &mut Vec<Event>) {
        self.cascade_depth = 0;
        self.phase = Phase::Idle;
        self.check_outcome(events);
    }

    fn check_outcome(&mut self, events: &mut Vec<Event>) {
        match self.tracker.evaluate(self.moves_remaining) {
            Some(Outcome::Success) => {
                self.phase = Phase::Terminal(Outcome::Success);
                events.push(Event::LevelComplete {
                    score: self.score(),
                    stars: self.stars(),
                });
            }
            Some(Outcome::Failure) => {
                self.phase = Phase::Terminal(Outcome::Failure);
                events.push(Event::LevelFailed {
                    score: self.score(),
                });
            }
            None => {}
        }
    }

    /// Credit ingredients delivered by the caller.
    ///
    /// Between moves this may finish the level at once; during a resolution the
    /// next settle picks it up.
    pub fn record_ingredients(&mut self, count: u32) -> Vec<Event> {
        self.tracker.record_ingredients(count);
        let mut events = Vec::new();
        if matches!(self.phase, Phase::Idle | Phase::Selected(_))
            && self.tracker.is_objective_complete()
        {
            self.check_outcome(&mut events);
        }
        events
    }

    pub fn snapshot_into(&self, out: &mut BoardView) {
        out.clear();
        out.level_id = self.config.id;
        out.rows = self.board.rows();
        out.cols = self.board.cols();
        for row in 0..self.board.rows() {
            for col in 0..self.board.cols() {
                let at = Coord::new(row, col);
                out.cells.push(if !self.board.is_active(at) {
                    CellView::Inactive
                } else {
                    match self.board.token(at) {
                        Some(token) => CellView::Token(token),
                        None => CellView::Empty,
                    }
                });
            }
        }
        out.jelly.extend(self.tracker.jelly_remaining().iter().copied());
        out.selected = self.selected();
        out.phase = match self.phase {
            Phase::Idle => PhaseView::AwaitingFirstSelection,
            Phase::Selected(_) => PhaseView::AwaitingSecondSelection,
            Phase::Resolving => PhaseView::Resolving,
            Phase::Terminal(Outcome::Success) => PhaseView::Complete,
            Phase::Terminal(Outcome::Failure) => PhaseView::Failed,
        };
        out.score = self.score();
        out.moves_remaining = self.moves_remaining;
        out.move_limit = self.config.move_limit;
        out.cascade_depth = self.cascade_depth;
        out.stars = self.stars();
        out.objective_text
            .push_str(&self.config.objective.describe());
        out.objective = self.tracker.progress();
        out.outcome = self.outcome();
    }

    pub fn snapshot(&self) -> BoardView {
        let mut view = BoardView::default();
        self.snapshot_into(&mut view);
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Objective;
    use crate::rng::ScriptedRng;

    fn level(rows: i16, cols: i16, moves: u32, objective: Objective) -> LevelConfig {
        LevelConfig::new(rows, cols, moves, 6, objective, [100, 200, 300])
    }

    /// Refill colors that never line up on their own: 0,1,2,3,4,5 repeating.
    fn quiet_rng() -> ScriptedRng {
        ScriptedRng::new(vec![4, 5, 3, 1, 0, 2])
    }

    // Row 0 becomes 1 1 1 once (1,2) swaps up into (0,2).
    const SIMPLE: [&str; 4] = [
        "1120", //
        "3412", //
        "4534", //
        "0253", //
    ];

    fn simple_state(moves: u32, objective: Objective) -> RunState<ScriptedRng> {
        let board = Board::from_layout(&SIMPLE).unwrap();
        RunState::with_board(level(4, 4, moves, objective), board, quiet_rng()).unwrap()
    }

    #[test]
    fn test_start_attempt_generates_matchless_board() {
        let state = RunState::start_attempt(
            level(8, 8, 20, Objective::Score { target: 5000 }),
            SimpleRng::new(7),
        )
        .unwrap();
        assert!(find_matches(state.board()).is_empty());
        assert!(state.board().is_full());
        assert_eq!(state.moves_remaining(), 20);
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_start_attempt_rejects_invalid_config() {
        let err = RunState::start_attempt(
            level(8, 8, 0, Objective::Score { target: 5000 }),
            SimpleRng::new(7),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroMoveLimit);
    }

    #[test]
    fn test_matching_swap_clears_and_scores() {
        let mut state = simple_state(5, Objective::Score { target: 10_000 });
        let out = state.attempt_swap(Coord::new(1, 2), Coord::new(0, 2));

        assert!(out.accepted);
        assert_eq!(out.events[0].kind_str(), "swap");
        assert!(matches!(
            &out.events[1],
            Event::Clear { cells, points: 180 } if cells.len() == 3
        ));
        assert_eq!(state.moves_remaining(), 4);
        assert!(state.score() >= 180);
        assert!(find_matches(state.board()).is_empty());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_non_matching_swap_reverts() {
        let mut state = simple_state(5, Objective::Score { target: 10_000 });
        let before = state.board().clone();
        let out = state.attempt_swap(Coord::new(3, 0), Coord::new(3, 1));

        assert!(!out.accepted);
        assert_eq!(out.rejection, Some(Rejection::NoEffect));
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.events[1].kind_str(), "swap_reverted");
        assert_eq!(state.board(), &before);
        assert_eq!(state.moves_remaining(), 5);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_rejections_without_events() {
        let mut state = simple_state(5, Objective::Score { target: 10_000 });
        let out = state.attempt_swap(Coord::new(0, 0), Coord::new(2, 2));
        assert_eq!(out.rejection, Some(Rejection::NotAdjacent));
        assert!(out.events.is_empty());

        let out = state.attempt_swap(Coord::new(0, 3), Coord::new(0, 4));
        assert_eq!(out.rejection, Some(Rejection::OutOfBounds));
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_input_ignored_while_resolving() {
        let mut state = simple_state(5, Objective::Score { target: 10_000 });
        assert!(state.begin_swap(Coord::new(1, 2), Coord::new(0, 2)).accepted);
        assert!(state.is_resolving());

        let again = state.begin_swap(Coord::new(3, 0), Coord::new(3, 1));
        assert_eq!(again.rejection, Some(Rejection::Resolving));
        assert!(again.events.is_empty());
        assert_eq!(state.select(Coord::new(0, 0)), Selection::Ignored);

        let events = state.resolve();
        assert!(!events.is_empty());
        assert!(!state.is_resolving());
        assert!(state.step().is_empty());
    }

    #[test]
    fn test_select_flow() {
        let mut state = simple_state(5, Objective::Score { target: 10_000 });

        assert_eq!(state.select(Coord::new(0, 0)), Selection::Selected(Coord::new(0, 0)));
        assert_eq!(state.select(Coord::new(0, 0)), Selection::Deselected);
        assert_eq!(state.select(Coord::new(0, 0)), Selection::Selected(Coord::new(0, 0)));
        // Far cell reassigns the selection without spending a move.
        assert_eq!(state.select(Coord::new(2, 2)), Selection::Selected(Coord::new(2, 2)));
        assert_eq!(state.moves_remaining(), 5);
        assert_eq!(state.select(Coord::new(2, 2)), Selection::Deselected);

        assert_eq!(state.select(Coord::new(1, 2)), Selection::Selected(Coord::new(1, 2)));
        match state.select(Coord::new(0, 2)) {
            Selection::Swapped(out) => assert!(out.accepted),
            other => panic!("expected swap, got {other:?}"),
        }
        assert!(state.is_resolving());
        state.resolve();
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_score_goal_reached_on_last_move_wins() {
        let mut state = simple_state(1, Objective::Score { target: 180 });
        let out = state.attempt_swap(Coord::new(1, 2), Coord::new(0, 2));

        assert!(out.events.iter().any(|e| matches!(e, Event::LevelComplete { .. })));
        assert!(!out.events.iter().any(|e| matches!(e, Event::LevelFailed { .. })));
        assert_eq!(state.outcome(), Some(Outcome::Success));

        let after = state.attempt_swap(Coord::new(3, 0), Coord::new(3, 1));
        assert_eq!(after.rejection, Some(Rejection::AttemptOver));
    }

    #[test]
    fn test_out_of_moves_fails() {
        let mut state = simple_state(1, Objective::Score { target: 100_000 });
        let out = state.attempt_swap(Coord::new(1, 2), Coord::new(0, 2));

        assert!(matches!(out.events.last(), Some(Event::LevelFailed { .. })));
        assert_eq!(state.outcome(), Some(Outcome::Failure));
    }

    #[test]
    fn test_lone_striped_swap_detonates() {
        let mut board = Board::from_layout(&SIMPLE).unwrap();
        board.set(Coord::new(3, 0), Some(Token::new(0, SpecialKind::StripedRow)));
        let mut state =
            RunState::with_board(level(4, 4, 5, Objective::Score { target: 10_000 }), board, quiet_rng())
                .unwrap();

        let out = state.begin_swap(Coord::new(3, 0), Coord::new(2, 0));
        assert!(out.accepted);
        let events = state.step();
        // The stripe landed on row 2 and wipes it.
        match events.iter().find(|e| matches!(e, Event::Clear { .. })) {
            Some(Event::Clear { cells, .. }) => {
                for col in 0..4 {
                    assert!(cells.contains(&Coord::new(2, col)));
                }
                assert!(cells.contains(&Coord::new(3, 0)));
            }
            _ => panic!("no clear event"),
        }
    }

    #[test]
    fn test_ingredients_complete_between_moves() {
        let mut state = simple_state(5, Objective::DropIngredients { target: 2 });
        assert!(state.record_ingredients(1).is_empty());
        let events = state.record_ingredients(1);
        assert!(matches!(events.as_slice(), [Event::LevelComplete { .. }]));
    }

    #[test]
    fn test_snapshot_reports_board_and_progress() {
        let mut board = Board::from_layout(&SIMPLE).unwrap();
        board.set(Coord::new(0, 0), Some(Token::new(1, SpecialKind::Wrapped)));
        let state = RunState::with_board(
            level(4, 4, 9, Objective::Score { target: 500 }),
            board,
            quiet_rng(),
        )
        .unwrap();
        let view = state.snapshot();

        assert_eq!(view.cells.len(), 16);
        assert_eq!(
            view.cell(Coord::new(0, 0)),
            CellView::Token(Token::new(1, SpecialKind::Wrapped))
        );
        assert_eq!(view.moves_remaining, 9);
        assert_eq!(view.objective_text, "Score 500 points");
        assert_eq!(view.objective[0].target, 500);
        assert_eq!(view.phase, PhaseView::AwaitingFirstSelection);
    }

    #[test]
    fn test_with_board_checks_mask() {
        let board = Board::from_layout(&["012", "120"]).unwrap();
        let err = RunState::with_board(
            level(4, 4, 5, Objective::Score { target: 10 }),
            board,
            quiet_rng(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MaskShape { .. }));
    }
}

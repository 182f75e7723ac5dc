//! Objective/scoring tracker
//!
//! Accumulates everything a level objective can depend on and decides the
//! attempt's outcome. Success is always checked before failure, so the move
//! that reaches the goal with zero moves left still wins.

use std::collections::BTreeSet;

use crate::level::Objective;
use crate::types::{color_name, ColorId, Coord, Token, MAX_COLOR_POOL};

/// How an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// One line of objective progress, e.g. "red 12/20".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveProgress {
    pub label: String,
    pub current: u32,
    pub target: u32,
}

impl ObjectiveProgress {
    pub fn is_met(&self) -> bool {
        self.current >= self.target
    }
}

#[derive(Debug, Clone)]
pub struct ObjectiveTracker {
    objective: Objective,
    score: u32,
    colors_captured: [u32; MAX_COLOR_POOL as usize],
    jelly: BTreeSet<Coord>,
    jellies_cleared: u32,
    ingredients_dropped: u32,
}

impl ObjectiveTracker {
    pub fn new(objective: Objective, jelly: BTreeSet<Coord>) -> Self {
        Self {
            objective,
            score: 0,
            colors_captured: [0; MAX_COLOR_POOL as usize],
            jelly,
            jellies_cleared: 0,
            ingredients_dropped: 0,
        }
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Count a cleared token. Returns true if a jelly under it was removed.
    pub fn record_clear(&mut self, at: Coord, token: Token) -> bool {
        if let Some(count) = self.colors_captured.get_mut(token.color as usize) {
            *count = count.saturating_add(1);
        }
        if self.jelly.remove(&at) {
            self.jellies_cleared += 1;
            return true;
        }
        false
    }

    /// Ingredients are delivered by the caller; the cascade never adds them.
    pub fn record_ingredients(&mut self, count: u32) {
        self.ingredients_dropped = self.ingredients_dropped.saturating_add(count);
    }

    pub fn colors_captured(&self, color: ColorId) -> u32 {
        self.colors_captured
            .get(color as usize)
            .copied()
            .unwrap_or(0)
    }

    pub fn jellies_cleared(&self) -> u32 {
        self.jellies_cleared
    }

    /// Jelly tiles still waiting to be cleared.
    pub fn jelly_remaining(&self) -> &BTreeSet<Coord> {
        &self.jelly
    }

    pub fn ingredients_dropped(&self) -> u32 {
        self.ingredients_dropped
    }

    pub fn is_objective_complete(&self) -> bool {
        self.progress().iter().all(|p| p.is_met())
    }

    /// Outcome after a settle, given the moves left.
    pub fn evaluate(&self, moves_remaining: u32) -> Option<Outcome> {
        if self.is_objective_complete() {
            Some(Outcome::Success)
        } else if moves_remaining == 0 {
            Some(Outcome::Failure)
        } else {
            None
        }
    }

    /// Current/target pairs for every part of the objective.
    pub fn progress(&self) -> Vec<ObjectiveProgress> {
        match &self.objective {
            Objective::Score { target } => vec![ObjectiveProgress {
                label: "score".to_string(),
                current: self.score,
                target: *target,
            }],
            Objective::Jelly { target } => vec![ObjectiveProgress {
                label: "jelly".to_string(),
                current: self.jellies_cleared,
                target: *target,
            }],
            Objective::CollectColors { targets } => targets
                .iter()
                .map(|(color, count)| ObjectiveProgress {
                    label: color_name(*color).unwrap_or("?").to_string(),
                    current: self.colors_captured(*color),
                    target: *count,
                })
                .collect(),
            Objective::DropIngredients { target } => vec![ObjectiveProgress {
                label: "ingredients".to_string(),
                current: self.ingredients_dropped,
                target: *target,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_objective() {
        let mut tracker = ObjectiveTracker::new(Objective::Score { target: 500 }, BTreeSet::new());
        tracker.add_score(499);
        assert_eq!(tracker.evaluate(3), None);
        tracker.add_score(1);
        assert_eq!(tracker.evaluate(3), Some(Outcome::Success));
    }

    #[test]
    fn test_success_beats_failure_on_last_move() {
        let mut tracker = ObjectiveTracker::new(Objective::Score { target: 100 }, BTreeSet::new());
        assert_eq!(tracker.evaluate(0), Some(Outcome::Failure));
        tracker.add_score(100);
        assert_eq!(tracker.evaluate(0), Some(Outcome::Success));
    }

    #[test]
    fn test_jelly_cleared_once() {
        let jelly: BTreeSet<Coord> = [Coord::new(0, 0), Coord::new(1, 1)].into_iter().collect();
        let mut tracker = ObjectiveTracker::new(Objective::Jelly { target: 2 }, jelly);

        assert!(tracker.record_clear(Coord::new(0, 0), Token::plain(1)));
        assert!(!tracker.record_clear(Coord::new(0, 0), Token::plain(1)));
        assert_eq!(tracker.jellies_cleared(), 1);
        assert!(!tracker.is_objective_complete());

        tracker.record_clear(Coord::new(1, 1), Token::plain(2));
        assert!(tracker.is_objective_complete());
        assert!(tracker.jelly_remaining().is_empty());
    }

    #[test]
    fn test_collect_needs_every_color() {
        let mut tracker = ObjectiveTracker::new(
            Objective::CollectColors {
                targets: vec![(0, 2), (3, 1)],
            },
            BTreeSet::new(),
        );
        tracker.record_clear(Coord::new(0, 0), Token::plain(0));
        tracker.record_clear(Coord::new(0, 1), Token::plain(0));
        assert!(!tracker.is_objective_complete());

        tracker.record_clear(Coord::new(0, 2), Token::plain(3));
        assert!(tracker.is_objective_complete());

        let progress = tracker.progress();
        assert_eq!(progress[0].label, "red");
        assert_eq!(progress[1].label, "green");
        assert_eq!(progress[1].current, 1);
    }

    #[test]
    fn test_ingredients_recorded_externally() {
        let mut tracker =
            ObjectiveTracker::new(Objective::DropIngredients { target: 2 }, BTreeSet::new());
        tracker.record_ingredients(1);
        assert_eq!(tracker.evaluate(5), None);
        tracker.record_ingredients(1);
        assert_eq!(tracker.evaluate(5), Some(Outcome::Success));
        assert_eq!(tracker.ingredients_dropped(), 2);
    }
}

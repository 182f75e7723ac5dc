//! Grid generator - initial boards with no pre-existing match
//!
//! One greedy pass in row-major order. Each active cell draws a color and
//! redraws while the draw would complete a run of three with the two cells
//! directly above or the two cells directly to the left. Inactive cells stay empty.

use crate::board::{Board, ShapeMask};
use crate::error::ConfigError;
use crate::rng::RandomSource;
use crate::types::{ColorId, Coord, Token, GENERATION_RETRY_LIMIT, MAX_COLOR_POOL};

/// Generate a fully populated board over `mask`.
///
/// Fails only for a color pool outside `1..=MAX_COLOR_POOL`. When no color can
/// avoid a run (pools of one or two colors) the constraint is relaxed for that
/// cell instead of failing.
pub fn generate<R: RandomSource + ?Sized>(
    mask: &ShapeMask,
    color_pool: u8,
    rng: &mut R,
) -> Result<Board, ConfigError> {
    if color_pool < 1 || color_pool > MAX_COLOR_POOL {
        return Err(ConfigError::ColorPool {
            size: color_pool,
            max: MAX_COLOR_POOL,
        });
    }

    let mut board = Board::new(mask.clone());
    let coords: Vec<Coord> = board.active_coords().collect();
    let mut relaxed = 0usize;

    for at in coords {
        let mut color = rng.next_color(color_pool);
        let mut tries = 1;
        while completes_run(&board, at, color) {
            if tries >= GENERATION_RETRY_LIMIT {
                match (0..color_pool).find(|&c| !completes_run(&board, at, c)) {
                    Some(c) => color = c,
                    None => relaxed += 1,
                }
                break;
            }
            color = rng.next_color(color_pool);
            tries += 1;
        }
        board.set(at, Some(Token::plain(color)));
    }

    if relaxed > 0 {
        log::warn!(
            "generator relaxed the no-match rule at {} cell(s) (color pool {})",
            relaxed,
            color_pool
        );
    }

    Ok(board)
}

/// True if placing `color` at `at` would form a run of three with already placed cells.
fn completes_run(board: &Board, at: Coord, color: ColorId) -> bool {
    let same = |c: Coord| board.token(c).map(|t| t.color) == Some(color);
    (same(at.offset(-1, 0)) && same(at.offset(-2, 0)))
        || (same(at.offset(0, -1)) && same(at.offset(0, -2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_matches;
    use crate::rng::{ScriptedRng, SimpleRng};

    #[test]
    fn test_generated_boards_have_no_match() {
        for seed in 1..200u32 {
            let mut rng = SimpleRng::new(seed);
            let board = generate(&ShapeMask::full(8, 8), 4, &mut rng).unwrap();
            assert!(board.is_full());
            assert!(find_matches(&board).is_empty(), "seed {seed} produced a match");
        }
    }

    #[test]
    fn test_redraws_rejected_color() {
        let mut rng = ScriptedRng::new(vec![0, 0, 0, 1]);
        let board = generate(&ShapeMask::full(1, 3), 6, &mut rng).unwrap();
        assert_eq!(board.to_layout(), vec!["001"]);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_inactive_cells_stay_empty() {
        let mask = ShapeMask::from_rows(&[
            vec![false, true, true, false],
            vec![true, true, true, true],
            vec![false, true, true, false],
        ])
        .unwrap();
        let mut rng = SimpleRng::new(42);
        let board = generate(&mask, 5, &mut rng).unwrap();

        for corner in [(0, 0), (0, 3), (2, 0), (2, 3)] {
            assert_eq!(board.get(Coord::new(corner.0, corner.1)), Some(None));
        }
        assert_eq!(board.tokens().count(), 8);
    }

    #[test]
    fn test_stuck_rng_falls_back_to_free_color() {
        let mut rng = ScriptedRng::new(vec![2]);
        let board = generate(&ShapeMask::full(3, 3), 3, &mut rng).unwrap();
        assert!(find_matches(&board).is_empty());
    }

    #[test]
    fn test_single_color_pool_relaxes() {
        let mut rng = SimpleRng::new(1);
        let board = generate(&ShapeMask::full(3, 3), 1, &mut rng).unwrap();
        assert!(board.is_full());
        assert!(!find_matches(&board).is_empty());
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let mut rng = SimpleRng::new(1);
        assert_eq!(
            generate(&ShapeMask::full(3, 3), 0, &mut rng),
            Err(ConfigError::ColorPool { size: 0, max: 6 })
        );
    }
}

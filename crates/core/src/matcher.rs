//! Match detector
//!
//! Two linear scans: every row left to right, then every column top to bottom.
//! Empty and inactive cells break a run. Each maximal run of at least
//! [`MIN_MATCH_LEN`] tokens sharing a color becomes one [`MatchRegion`]; a cell
//! sitting in both a horizontal and a vertical run shows up in both regions.

use crate::board::Board;
use crate::types::{ColorId, Coord, Direction, MIN_MATCH_LEN};

/// A maximal straight run of same-colored tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRegion {
    /// Run cells in scan order (left to right, or top to bottom).
    pub positions: Vec<Coord>,
    pub color: ColorId,
    pub direction: Direction,
}

impl MatchRegion {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.positions.contains(&coord)
    }
}

/// Find every match on the board, horizontal regions first.
pub fn find_matches(board: &Board) -> Vec<MatchRegion> {
    let mut out = Vec::new();
    for row in 0..board.rows() {
        scan_line(
            board,
            (0..board.cols()).map(|col| Coord::new(row, col)),
            Direction::Horizontal,
            &mut out,
        );
    }
    for col in 0..board.cols() {
        scan_line(
            board,
            (0..board.rows()).map(|row| Coord::new(row, col)),
            Direction::Vertical,
            &mut out,
        );
    }
    out
}

/// True if the board holds at least one match.
pub fn has_match(board: &Board) -> bool {
    !find_matches(board).is_empty()
}

fn scan_line(
    board: &Board,
    line: impl Iterator<Item = Coord>,
    direction: Direction,
    out: &mut Vec<MatchRegion>,
) {
    let mut run: Vec<Coord> = Vec::new();
    let mut run_color: Option<ColorId> = None;

    for at in line {
        let color = board.token(at).map(|t| t.color);
        if color.is_some() && color == run_color {
            run.push(at);
            continue;
        }
        flush(&mut run, run_color, direction, out);
        run_color = color;
        if color.is_some() {
            run.push(at);
        }
    }
    flush(&mut run, run_color, direction, out);
}

fn flush(
    run: &mut Vec<Coord>,
    color: Option<ColorId>,
    direction: Direction,
    out: &mut Vec<MatchRegion>,
) {
    if let (Some(color), true) = (color, run.len() >= MIN_MATCH_LEN) {
        out.push(MatchRegion {
            positions: std::mem::take(run),
            color,
            direction,
        });
    } else {
        run.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_on_checkerboard() {
        let board = Board::from_layout(&["0101", "1010", "0101"]).unwrap();
        assert!(find_matches(&board).is_empty());
        assert!(!has_match(&board));
    }

    #[test]
    fn test_horizontal_and_vertical_runs() {
        let board = Board::from_layout(&[
            "2224", //
            "5134", //
            "5314", //
        ])
        .unwrap();
        let regions = find_matches(&board);

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].direction, Direction::Horizontal);
        assert_eq!(regions[0].color, 2);
        assert_eq!(
            regions[0].positions,
            vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]
        );
        assert_eq!(regions[1].direction, Direction::Vertical);
        assert_eq!(regions[1].color, 4);
        assert_eq!(regions[1].len(), 3);
    }

    #[test]
    fn test_run_is_maximal() {
        let board = Board::from_layout(&["1111101"]).unwrap();
        let regions = find_matches(&board);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].len(), 5);
    }

    #[test]
    fn test_inactive_and_empty_break_runs() {
        let board = Board::from_layout(&["11#11", "11.11"]).unwrap();
        assert!(find_matches(&board).is_empty());
    }

    #[test]
    fn test_shared_cell_appears_in_both_regions() {
        let board = Board::from_layout(&[
            "030", //
            "333", //
            "030", //
        ])
        .unwrap();
        let regions = find_matches(&board);

        assert_eq!(regions.len(), 2);
        let shared = Coord::new(1, 1);
        assert!(regions.iter().all(|r| r.contains(shared)));
    }

    #[test]
    fn test_run_at_end_of_line() {
        let board = Board::from_layout(&["0122", "0132", "0562"]).unwrap();
        let regions = find_matches(&board);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].positions[0], Coord::new(0, 0));
        assert_eq!(regions[1].positions[2], Coord::new(2, 3));
    }
}

//! Special-token resolver
//!
//! Decides which special token a match creates and which cells a special
//! token clears when it detonates, alone or paired with another special.
//!
//! # Creation rules
//!
//! | Match shape | Result | Placed at |
//! |-------------|--------|-----------|
//! | straight run of 5+ | `ColorBomb` | middle of the run |
//! | L / T (2+ rows and 2+ columns) | `Wrapped` | the shared corner cell |
//! | straight run of 4 | striped, perpendicular to the run | second cell of the run |
//! | straight run of 3 | nothing | - |
//!
//! # Pair effects
//!
//! | Pair | Area |
//! |------|------|
//! | bomb + bomb | every token on the board |
//! | bomb + striped | row and column of every token of the partner's color |
//! | bomb + wrapped | 3x3 around every token of the partner's color |
//! | striped + striped | one row and one column through the midpoint |
//! | striped + wrapped | three rows and three columns around the midpoint |
//! | wrapped + wrapped | 5x5 around the midpoint |

use std::collections::BTreeSet;

use crate::board::Board;
use crate::matcher::MatchRegion;
use crate::types::{ColorId, Coord, Direction, SpecialKind, COLOR_BOMB_RUN_LEN, STRIPED_RUN_LEN};

/// A special token to place after a clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialSpawn {
    pub kind: SpecialKind,
    pub at: Coord,
}

/// Overlapping match regions merged into one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    /// Unique cells, first region's order first.
    pub positions: Vec<Coord>,
    pub color: ColorId,
    /// Direction of the first region in the group.
    pub direction: Direction,
}

/// Merge regions that share at least one cell.
pub fn group_regions(regions: &[MatchRegion]) -> Vec<MatchGroup> {
    let mut groups: Vec<MatchGroup> = Vec::new();

    for region in regions {
        let touching: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| region.positions.iter().any(|p| g.positions.contains(p)))
            .map(|(i, _)| i)
            .collect();

        match touching.split_first() {
            None => groups.push(MatchGroup {
                positions: region.positions.clone(),
                color: region.color,
                direction: region.direction,
            }),
            Some((&first, rest)) => {
                // Fold later groups into the earliest one, highest index first.
                for &i in rest.iter().rev() {
                    let merged = groups.remove(i);
                    push_unique(&mut groups[first].positions, &merged.positions);
                }
                push_unique(&mut groups[first].positions, &region.positions);
            }
        }
    }

    groups
}

fn push_unique(into: &mut Vec<Coord>, from: &[Coord]) {
    for p in from {
        if !into.contains(p) {
            into.push(*p);
        }
    }
}

/// Decide the special token created by a matched shape.
///
/// ```
/// use cascade_crush_core::special::classify;
/// use cascade_crush_types::{Coord, Direction, SpecialKind};
///
/// let run: Vec<Coord> = (1..=4).map(|c| Coord::new(3, c)).collect();
/// let spawn = classify(&run, Direction::Horizontal).unwrap();
/// assert_eq!(spawn.kind, SpecialKind::StripedCol);
/// assert_eq!(spawn.at, Coord::new(3, 2));
/// ```
pub fn classify(positions: &[Coord], direction: Direction) -> Option<SpecialSpawn> {
    let longest = longest_straight_run(positions);
    if longest.len() >= COLOR_BOMB_RUN_LEN {
        return Some(SpecialSpawn {
            kind: SpecialKind::ColorBomb,
            at: longest[longest.len() / 2],
        });
    }

    let rows: BTreeSet<i16> = positions.iter().map(|p| p.row).collect();
    let cols: BTreeSet<i16> = positions.iter().map(|p| p.col).collect();
    if rows.len() >= 2 && cols.len() >= 2 {
        let corner = positions
            .iter()
            .find(|p| {
                positions.iter().filter(|q| q.row == p.row).count() >= 2
                    && positions.iter().filter(|q| q.col == p.col).count() >= 2
            })
            .copied()
            .unwrap_or(positions[positions.len() / 2]);
        return Some(SpecialSpawn {
            kind: SpecialKind::Wrapped,
            at: corner,
        });
    }

    if positions.len() == STRIPED_RUN_LEN {
        return Some(SpecialSpawn {
            kind: direction.perpendicular_stripe(),
            at: positions[1],
        });
    }

    None
}

/// Longest run of consecutive cells along a single row or column, sorted.
fn longest_straight_run(positions: &[Coord]) -> Vec<Coord> {
    let mut best: Vec<Coord> = Vec::new();

    let mut by_row = positions.to_vec();
    by_row.sort();
    let mut by_col = positions.to_vec();
    by_col.sort_by_key(|p| (p.col, p.row));

    for (sorted, horizontal) in [(by_row, true), (by_col, false)] {
        let mut run: Vec<Coord> = Vec::new();
        for p in sorted {
            let continues = run.last().map_or(false, |last: &Coord| {
                if horizontal {
                    last.row == p.row && last.col + 1 == p.col
                } else {
                    last.col == p.col && last.row + 1 == p.row
                }
            });
            if !continues {
                if run.len() > best.len() {
                    best = std::mem::take(&mut run);
                }
                run.clear();
            }
            run.push(p);
        }
        if run.len() > best.len() {
            best = run;
        }
    }

    best
}

/// Cells cleared when a single special detonates at `at`.
///
/// `target` is the color a color bomb removes; a bomb with no target clears nothing.
pub fn effect_area(
    kind: SpecialKind,
    at: Coord,
    board: &Board,
    target: Option<ColorId>,
) -> Vec<Coord> {
    let mut area = BTreeSet::new();
    match kind {
        SpecialKind::None => {}
        SpecialKind::StripedRow => add_row(board, at.row, &mut area),
        SpecialKind::StripedCol => add_col(board, at.col, &mut area),
        SpecialKind::Wrapped => add_block(board, at, 1, &mut area),
        SpecialKind::ColorBomb => {
            if let Some(color) = target {
                area.extend(board.coords_of_color(color));
            }
        }
    }
    area.into_iter().collect()
}

/// Cells cleared when two special tokens are swapped into each other.
///
/// `a` and `b` are the post-swap positions; a bomb's partner supplies the target color.
pub fn combined_effect(
    kind_a: SpecialKind,
    kind_b: SpecialKind,
    a: Coord,
    b: Coord,
    board: &Board,
) -> Vec<Coord> {
    use SpecialKind::{ColorBomb, Wrapped};

    let mut area = BTreeSet::new();
    let center = a.midpoint(b);

    match (kind_a, kind_b) {
        (ColorBomb, ColorBomb) => area.extend(board.tokens().map(|(c, _)| c)),
        (ColorBomb, other) | (other, ColorBomb) => {
            let partner = if kind_a == ColorBomb { b } else { a };
            let targets: Vec<Coord> = match board.token(partner) {
                Some(t) => board.coords_of_color(t.color).collect(),
                None => Vec::new(),
            };
            for t in targets {
                if other.is_striped() {
                    add_row(board, t.row, &mut area);
                    add_col(board, t.col, &mut area);
                } else if other == Wrapped {
                    add_block(board, t, 1, &mut area);
                }
            }
        }
        (x, y) if x.is_striped() && y.is_striped() => {
            add_row(board, center.row, &mut area);
            add_col(board, center.col, &mut area);
        }
        (x, Wrapped) | (Wrapped, x) if x.is_striped() => {
            for d in -1..=1 {
                add_row(board, center.row + d, &mut area);
                add_col(board, center.col + d, &mut area);
            }
        }
        (Wrapped, Wrapped) => add_block(board, center, 2, &mut area),
        _ => {}
    }

    area.into_iter().collect()
}

/// Area set off by swapping `a` with `b`, if either token is special.
///
/// Two specials use [`combined_effect`]. A lone striped or wrapped token
/// detonates where it landed; a lone color bomb clears its partner's color.
/// Both swapped cells are always part of the area.
pub fn swap_trigger(board: &Board, a: Coord, b: Coord) -> Option<Vec<Coord>> {
    let ta = board.token(a)?;
    let tb = board.token(b)?;

    let mut area: BTreeSet<Coord> = match (ta.is_special(), tb.is_special()) {
        (false, false) => return None,
        (true, true) => combined_effect(ta.special, tb.special, a, b, board)
            .into_iter()
            .collect(),
        (true, false) => single_activation(ta.special, a, tb.color, board),
        (false, true) => single_activation(tb.special, b, ta.color, board),
    };
    area.insert(a);
    area.insert(b);
    Some(area.into_iter().collect())
}

fn single_activation(
    kind: SpecialKind,
    at: Coord,
    partner_color: ColorId,
    board: &Board,
) -> BTreeSet<Coord> {
    let target = (kind == SpecialKind::ColorBomb).then_some(partner_color);
    effect_area(kind, at, board, target).into_iter().collect()
}

fn add_row(board: &Board, row: i16, area: &mut BTreeSet<Coord>) {
    for col in 0..board.cols() {
        add_cell(board, Coord::new(row, col), area);
    }
}

fn add_col(board: &Board, col: i16, area: &mut BTreeSet<Coord>) {
    for row in 0..board.rows() {
        add_cell(board, Coord::new(row, col), area);
    }
}

fn add_block(board: &Board, center: Coord, radius: i16, area: &mut BTreeSet<Coord>) {
    for dr in -radius..=radius {
        for dc in -radius..=radius {
            add_cell(board, center.offset(dr, dc), area);
        }
    }
}

/// Only active, occupied cells can be cleared.
fn add_cell(board: &Board, at: Coord, area: &mut BTreeSet<Coord>) {
    if board.token(at).is_some() {
        area.insert(at);
    }
}

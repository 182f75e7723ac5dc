//! Scoring module - per-step points and star ratings
//!
//! Each cleared token is worth `BASE_CLEAR_POINTS x (1 + 1/2 x cascade_depth)`.
//! The cascade multiplier is kept as a numerator/denominator pair so the sum for
//! a step is computed in integers and rounded once. Creating a special token adds
//! a flat bonus that is not multiplied.

use crate::types::{
    SpecialKind, BASE_CLEAR_POINTS, CASCADE_BONUS_DENOMINATOR, CASCADE_BONUS_NUMERATOR,
    COLOR_BOMB_CREATION_BONUS, STAR_COUNT, STRIPED_CREATION_BONUS, WRAPPED_CREATION_BONUS,
};

/// Points earned by one resolution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepScore {
    /// Points for cleared tokens, cascade multiplier applied.
    pub clear_points: u32,
    /// Flat bonus for specials created in this step.
    pub creation_bonus: u32,
    pub total: u32,
}

/// Points for `cleared` tokens at `depth` (0 for the swap's own pass).
///
/// ```
/// use cascade_crush_core::scoring::clear_points;
///
/// assert_eq!(clear_points(3, 0), 180);
/// assert_eq!(clear_points(3, 1), 270);
/// assert_eq!(clear_points(4, 2), 480);
/// ```
pub fn clear_points(cleared: usize, depth: u32) -> u32 {
    let multiplier = CASCADE_BONUS_DENOMINATOR as u64
        + CASCADE_BONUS_NUMERATOR as u64 * depth as u64;
    let raw = (BASE_CLEAR_POINTS as u64)
        .saturating_mul(cleared as u64)
        .saturating_mul(multiplier);
    let rounded = raw.saturating_add(CASCADE_BONUS_DENOMINATOR as u64 / 2)
        / CASCADE_BONUS_DENOMINATOR as u64;
    rounded.min(u32::MAX as u64) as u32
}

/// Flat bonus for creating a special token of `kind`.
pub fn creation_bonus(kind: SpecialKind) -> u32 {
    match kind {
        SpecialKind::None => 0,
        SpecialKind::StripedRow | SpecialKind::StripedCol => STRIPED_CREATION_BONUS,
        SpecialKind::Wrapped => WRAPPED_CREATION_BONUS,
        SpecialKind::ColorBomb => COLOR_BOMB_CREATION_BONUS,
    }
}

/// Score a whole step: cleared tokens plus every special created.
pub fn score_step(cleared: usize, depth: u32, created: &[SpecialKind]) -> StepScore {
    let clear = clear_points(cleared, depth);
    let bonus = created
        .iter()
        .map(|k| creation_bonus(*k))
        .fold(0u32, |acc, b| acc.saturating_add(b));
    StepScore {
        clear_points: clear,
        creation_bonus: bonus,
        total: clear.saturating_add(bonus),
    }
}

/// Stars earned: the count of ascending thresholds the score has reached.
///
/// ```
/// use cascade_crush_core::scoring::star_rating;
///
/// let stars = [1000, 2000, 3000];
/// assert_eq!(star_rating(999, &stars), 0);
/// assert_eq!(star_rating(1000, &stars), 1);
/// assert_eq!(star_rating(2500, &stars), 2);
/// assert_eq!(star_rating(9000, &stars), 3);
/// ```
pub fn star_rating(score: u32, thresholds: &[u32; STAR_COUNT]) -> u8 {
    thresholds
        .iter()
        .rposition(|t| score >= *t)
        .map(|i| i as u8 + 1)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_points_table() {
        assert_eq!(clear_points(0, 0), 0);
        assert_eq!(clear_points(3, 0), 180);
        assert_eq!(clear_points(5, 0), 300);
        assert_eq!(clear_points(3, 1), 270);
        assert_eq!(clear_points(3, 3), 450);
        assert_eq!(clear_points(1, 1), 90);
    }

    #[test]
    fn test_clear_points_saturates() {
        assert_eq!(clear_points(usize::MAX / 2, 10), u32::MAX);
    }

    #[test]
    fn test_creation_bonus_table() {
        assert_eq!(creation_bonus(SpecialKind::None), 0);
        assert_eq!(creation_bonus(SpecialKind::StripedRow), 120);
        assert_eq!(creation_bonus(SpecialKind::StripedCol), 120);
        assert_eq!(creation_bonus(SpecialKind::Wrapped), 200);
        assert_eq!(creation_bonus(SpecialKind::ColorBomb), 200);
    }

    #[test]
    fn test_score_step_adds_unmultiplied_bonus() {
        let score = score_step(4, 1, &[SpecialKind::StripedCol]);
        assert_eq!(score.clear_points, 360);
        assert_eq!(score.creation_bonus, 120);
        assert_eq!(score.total, 480);
    }

    #[test]
    fn test_star_rating_takes_highest_reached() {
        let stars = [100, 200, 300];
        assert_eq!(star_rating(0, &stars), 0);
        assert_eq!(star_rating(199, &stars), 1);
        assert_eq!(star_rating(200, &stars), 2);
        assert_eq!(star_rating(300, &stars), 3);
    }
}

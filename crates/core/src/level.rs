//! Level configuration and validation
//!
//! A [`LevelConfig`] is plain data handed to the engine by whoever owns the level
//! catalog. [`LevelConfig::validate`] is the single gate for `InvalidConfig`
//! problems; [`crate::RunState::start_attempt`] always calls it.

use std::collections::BTreeSet;

use crate::board::ShapeMask;
use crate::error::ConfigError;
use crate::types::{color_name, ColorId, Coord, MAX_BOARD_DIM, MAX_COLOR_POOL, STAR_COUNT};

/// What the player must achieve before running out of moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Objective {
    Score { target: u32 },
    Jelly { target: u32 },
    /// Required capture count per color.
    CollectColors { targets: Vec<(ColorId, u32)> },
    DropIngredients { target: u32 },
}

impl Objective {
    /// Short snake_case tag used on the wire.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Objective::Score { .. } => "score",
            Objective::Jelly { .. } => "jelly",
            Objective::CollectColors { .. } => "collect",
            Objective::DropIngredients { .. } => "ingredients",
        }
    }

    /// Human readable goal text.
    ///
    /// ```
    /// use cascade_crush_core::Objective;
    ///
    /// let goal = Objective::CollectColors { targets: vec![(0, 20), (4, 15)] };
    /// assert_eq!(goal.describe(), "Collect 20 red, 15 blue");
    /// assert_eq!(Objective::Score { target: 1000 }.describe(), "Score 1000 points");
    /// ```
    pub fn describe(&self) -> String {
        match self {
            Objective::Score { target } => format!("Score {target} points"),
            Objective::Jelly { target } => format!("Clear {target} jellies"),
            Objective::CollectColors { targets } => {
                let parts: Vec<String> = targets
                    .iter()
                    .map(|(color, count)| {
                        format!("{count} {}", color_name(*color).unwrap_or("?"))
                    })
                    .collect();
                format!("Collect {}", parts.join(", "))
            }
            Objective::DropIngredients { target } => format!("Drop {target} ingredients"),
        }
    }
}

/// Static description of one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    pub id: u32,
    pub name: String,
    pub rows: i16,
    pub cols: i16,
    /// Playable cells, row-major; `None` means every cell is active.
    pub shape: Option<Vec<Vec<bool>>>,
    pub move_limit: u32,
    pub color_pool: u8,
    pub objective: Objective,
    /// Score thresholds for one, two and three stars.
    pub stars: [u32; STAR_COUNT],
    pub jelly: Vec<Coord>,
}

impl LevelConfig {
    /// A rectangular level with no jelly.
    pub fn new(
        rows: i16,
        cols: i16,
        move_limit: u32,
        color_pool: u8,
        objective: Objective,
        stars: [u32; STAR_COUNT],
    ) -> Self {
        Self {
            id: 0,
            name: String::new(),
            rows,
            cols,
            shape: None,
            move_limit,
            color_pool,
            objective,
            stars,
            jelly: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: u32, name: impl Into<String>) -> Self {
        self.id = id;
        self.name = name.into();
        self
    }

    pub fn with_shape(mut self, shape: Vec<Vec<bool>>) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_jelly(mut self, jelly: Vec<Coord>) -> Self {
        self.jelly = jelly;
        self
    }

    /// Build the shape mask, checking it against the declared dimensions.
    pub fn mask(&self) -> Result<ShapeMask, ConfigError> {
        if self.rows < 1 || self.cols < 1 || self.rows > MAX_BOARD_DIM || self.cols > MAX_BOARD_DIM
        {
            return Err(ConfigError::Dimensions {
                rows: self.rows,
                cols: self.cols,
                max: MAX_BOARD_DIM,
            });
        }

        let mask = match &self.shape {
            None => ShapeMask::full(self.rows, self.cols),
            Some(rows) => {
                let mask = ShapeMask::from_rows(rows)?;
                if mask.rows() != self.rows || mask.cols() != self.cols {
                    return Err(ConfigError::MaskShape {
                        rows: rows.len(),
                        cols: rows.first().map(|r| r.len()).unwrap_or(0),
                        expected_rows: self.rows,
                        expected_cols: self.cols,
                    });
                }
                mask
            }
        };

        if mask.active_count() == 0 {
            return Err(ConfigError::EmptyMask);
        }
        Ok(mask)
    }

    /// Unique jelly coordinates.
    pub fn jelly_set(&self) -> BTreeSet<Coord> {
        self.jelly.iter().copied().collect()
    }

    /// Check every static constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mask = self.mask()?;

        if self.color_pool < 1 || self.color_pool > MAX_COLOR_POOL {
            return Err(ConfigError::ColorPool {
                size: self.color_pool,
                max: MAX_COLOR_POOL,
            });
        }
        if self.move_limit == 0 {
            return Err(ConfigError::ZeroMoveLimit);
        }
        if !self.stars.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::StarThresholds(self.stars));
        }

        let jelly = self.jelly_set();
        if let Some(bad) = jelly.iter().find(|c| !mask.is_active(**c)) {
            return Err(ConfigError::JellyOutsideBoard {
                row: bad.row,
                col: bad.col,
            });
        }

        match &self.objective {
            Objective::Score { target } | Objective::DropIngredients { target } => {
                if *target == 0 {
                    return Err(ConfigError::ZeroTarget);
                }
            }
            Objective::Jelly { target } => {
                if *target == 0 {
                    return Err(ConfigError::ZeroTarget);
                }
                if *target as usize > jelly.len() {
                    return Err(ConfigError::JellyTarget {
                        target: *target,
                        available: jelly.len(),
                    });
                }
            }
            Objective::CollectColors { targets } => {
                if targets.is_empty() {
                    return Err(ConfigError::EmptyCollect);
                }
                for (color, count) in targets {
                    if *color >= self.color_pool {
                        return Err(ConfigError::CollectColor {
                            color: *color,
                            pool: self.color_pool,
                        });
                    }
                    if *count == 0 {
                        return Err(ConfigError::ZeroTarget);
                    }
                }
            }
        }

        Ok(())
    }
}

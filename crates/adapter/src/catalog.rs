//! Level catalog - JSON level files turned into validated [`LevelConfig`]s
//!
//! # File Format
//!
//! ```json
//! {
//!   "levels": [
//!     {
//!       "id": 6,
//!       "name": "Lollipop Lake",
//!       "rows": 8, "cols": 8,
//!       "move_limit": 30,
//!       "colors": 5,
//!       "objective": { "type": "collect", "targets": { "red": 15, "blue": 15 } },
//!       "stars": [2000, 3500, 5500],
//!       "shape": [[0, 1, 1, 0], ...],
//!       "jelly": [[2, 2], [2, 3]]
//!     }
//!   ]
//! }
//! ```
//!
//! - `objective.type` is one of `score`, `jelly`, `collect`, `ingredients`
//! - collect targets are keyed by palette name and keep their file order
//! - `shape` rows hold `1` for playable cells and `0` for holes
//! - `jelly` is either a list of `[row, col]` pairs or
//!   `{"all_except": [[row, col], ...]}` covering every playable cell but those
//!
//! Every level is validated while loading; the first invalid one fails the load.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Deserializer};

use crate::core::{LevelConfig, Objective};
use crate::types::{color_from_name, Coord};

/// Built-in catalog, compiled into the binary.
pub const BUILTIN_LEVELS: &str = include_str!("../levels/builtin.json");

/// Environment variable naming a replacement catalog file.
pub const LEVELS_PATH_ENV: &str = "CASCADE_LEVELS_PATH";

#[derive(Debug, Deserialize)]
struct CatalogFile {
    levels: Vec<LevelEntry>,
}

#[derive(Debug, Deserialize)]
struct LevelEntry {
    id: u32,
    #[serde(default)]
    name: String,
    rows: i16,
    cols: i16,
    move_limit: u32,
    colors: u8,
    objective: ObjectiveEntry,
    stars: [u32; 3],
    #[serde(default)]
    shape: Option<Vec<Vec<u8>>>,
    #[serde(default)]
    jelly: Option<JellyEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ObjectiveEntry {
    Score {
        target: u32,
    },
    Jelly {
        target: u32,
    },
    Collect {
        #[serde(deserialize_with = "ordered_targets")]
        targets: Vec<(String, u32)>,
    },
    Ingredients {
        target: u32,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JellyEntry {
    Cells(Vec<[i16; 2]>),
    AllExcept { all_except: Vec<[i16; 2]> },
}

/// Read a `{"name": count}` map keeping the order it was written in.
fn ordered_targets<'de, D>(deserializer: D) -> Result<Vec<(String, u32)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct V;
    impl<'de> serde::de::Visitor<'de> for V {
        type Value = Vec<(String, u32)>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a map of color name to count")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut out = Vec::new();
            while let Some((name, count)) = map.next_entry::<String, u32>()? {
                out.push((name, count));
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(V)
}

impl LevelEntry {
    fn into_config(self) -> anyhow::Result<LevelConfig> {
        let objective = match self.objective {
            ObjectiveEntry::Score { target } => Objective::Score { target },
            ObjectiveEntry::Jelly { target } => Objective::Jelly { target },
            ObjectiveEntry::Ingredients { target } => Objective::DropIngredients { target },
            ObjectiveEntry::Collect { targets } => {
                let mut resolved = Vec::with_capacity(targets.len());
                for (name, count) in targets {
                    let Some(color) = color_from_name(&name) else {
                        bail!("unknown color {:?} in collect objective", name);
                    };
                    resolved.push((color, count));
                }
                Objective::CollectColors { targets: resolved }
            }
        };

        let shape: Option<Vec<Vec<bool>>> = self
            .shape
            .map(|rows| rows.iter().map(|r| r.iter().map(|&v| v != 0).collect()).collect());

        let jelly = match self.jelly {
            None => Vec::new(),
            Some(JellyEntry::Cells(cells)) => cells.iter().map(|&[r, c]| Coord::new(r, c)).collect(),
            Some(JellyEntry::AllExcept { all_except }) => {
                let skip: BTreeSet<Coord> = all_except.iter().map(|&[r, c]| Coord::new(r, c)).collect();
                let mut cells = Vec::new();
                for row in 0..self.rows {
                    for col in 0..self.cols {
                        let at = Coord::new(row, col);
                        let active = shape
                            .as_ref()
                            .and_then(|s| s.get(row as usize)?.get(col as usize).copied())
                            .unwrap_or(true);
                        if active && !skip.contains(&at) {
                            cells.push(at);
                        }
                    }
                }
                cells
            }
        };

        let mut config = LevelConfig::new(
            self.rows,
            self.cols,
            self.move_limit,
            self.colors,
            objective,
            self.stars,
        )
        .with_id(self.id, self.name)
        .with_jelly(jelly);
        if let Some(shape) = shape {
            config = config.with_shape(shape);
        }

        config.validate()?;
        Ok(config)
    }
}

/// An ordered, validated set of levels.
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let file: CatalogFile = serde_json::from_str(json).context("malformed level catalog")?;
        if file.levels.is_empty() {
            bail!("level catalog has no levels");
        }

        let mut seen = BTreeSet::new();
        let mut levels = Vec::with_capacity(file.levels.len());
        for entry in file.levels {
            let id = entry.id;
            if !seen.insert(id) {
                bail!("duplicate level id {}", id);
            }
            let config = entry
                .into_config()
                .with_context(|| format!("invalid level {}", id))?;
            levels.push(config);
        }
        Ok(Self { levels })
    }

    /// The catalog compiled into the crate.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_json(BUILTIN_LEVELS).context("built-in level catalog")
    }

    /// Load a catalog file from disk.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("failed to load {}", path.display()))
    }

    /// Load `CASCADE_LEVELS_PATH` if set, otherwise the built-in catalog.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(LEVELS_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Self::builtin(),
        }
    }

    pub fn levels(&self) -> &[LevelConfig] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&LevelConfig> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Id of the first level in file order.
    pub fn first_id(&self) -> Option<u32> {
        self.levels.first().map(|l| l.id)
    }

    /// Id of the level after `id`, wrapping to the first.
    pub fn next_id(&self, id: u32) -> Option<u32> {
        let idx = self.levels.iter().position(|l| l.id == id)?;
        Some(self.levels[(idx + 1) % self.levels.len()].id)
    }

    /// Id of the level before `id`, wrapping to the last.
    pub fn prev_id(&self, id: u32) -> Option<u32> {
        let idx = self.levels.iter().position(|l| l.id == id)?;
        let len = self.levels.len();
        Some(self.levels[(idx + len - 1) % len].id)
    }
}

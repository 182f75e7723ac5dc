//! Core engine module - pure, deterministic, and testable
//!
//! This crate contains every puzzle rule: board and shape mask, generation,
//! match detection, special tokens, cascades, scoring and objectives.
//! It has **no dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: the same RNG seed and inputs replay the same attempt
//! - **Testable**: randomness is injected through [`RandomSource`]
//! - **Portable**: runs in the terminal front-end, behind the TCP adapter, or headless
//!
//! # Module Structure
//!
//! - [`board`]: token grid with shape mask, gravity and refill
//! - [`generator`]: initial boards with no pre-existing match
//! - [`matcher`]: row/column run detection
//! - [`special`]: special-token creation rules and blast areas
//! - [`scoring`]: per-step points and star ratings
//! - [`tracker`]: objective bookkeeping and outcome
//! - [`level`]: level configuration and validation
//! - [`run_state`]: the cascade engine for one attempt
//! - [`snapshot`]: read-only views for presenters
//!
//! # Example
//!
//! ```
//! use cascade_crush_core::{LevelConfig, Objective, RunState, SimpleRng};
//! use cascade_crush_types::Coord;
//!
//! let level = LevelConfig::new(8, 8, 20, 5, Objective::Score { target: 3000 }, [3000, 6000, 9000]);
//! let mut run = RunState::start_attempt(level, SimpleRng::new(12345)).unwrap();
//!
//! // Swapping two cells either resolves fully or is rejected.
//! let outcome = run.attempt_swap(Coord::new(0, 0), Coord::new(0, 1));
//! if !outcome.accepted {
//!     assert_eq!(run.moves_remaining(), 20);
//! }
//!
//! let view = run.snapshot();
//! assert_eq!(view.cells.len(), 64);
//! ```

pub mod board;
pub mod error;
pub mod events;
pub mod generator;
pub mod level;
pub mod matcher;
pub mod rng;
pub mod run_state;
pub mod scoring;
pub mod snapshot;
pub mod special;
pub mod tracker;

pub use cascade_crush_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Collapse, Fall, ShapeMask, Spawn};
pub use error::ConfigError;
pub use events::Event;
pub use generator::generate;
pub use level::{LevelConfig, Objective};
pub use matcher::{find_matches, MatchRegion};
pub use rng::{RandomSource, ScriptedRng, SimpleRng};
pub use run_state::{Phase, Rejection, RunState, Selection, SwapOutcome};
pub use scoring::{star_rating, StepScore};
pub use snapshot::{BoardView, CellView, PhaseView};
pub use special::{classify, combined_effect, effect_area, SpecialSpawn};
pub use tracker::{ObjectiveProgress, ObjectiveTracker, Outcome};

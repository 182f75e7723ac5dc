//! Session: one player working through a level catalog.
//!
//! Owns the current [`RunState`], the board cursor and the attempt counter, and
//! turns both local key actions and remote commands into engine calls. No I/O
//! happens here; the binary draws and polls, the adapter carries remote traffic.

use anyhow::{Context, Result};

use crate::adapter::protocol::{create_ack, create_swap_ack, AckMessage, ObservationMessage};
use crate::adapter::server::build_observation;
use crate::adapter::{ClientCommand, LevelCatalog};
use crate::core::{BoardView, Event, RunState, Selection, SimpleRng, SwapOutcome};
use crate::input::{Cursor, UiAction};
use crate::types::Coord;

/// Mixed into the seed on every new attempt so restarts deal a fresh board.
const ATTEMPT_SEED_STRIDE: u32 = 0x9E37_79B9;

pub struct Session {
    catalog: LevelCatalog,
    level_id: u32,
    seed: u32,
    attempt: u32,
    run: RunState,
    cursor: Cursor,
    obs_seq: u64,
}

impl Session {
    /// Start on `level_id`, or the catalog's first level.
    pub fn new(catalog: LevelCatalog, level_id: Option<u32>, seed: u32) -> Result<Self> {
        let level_id = match level_id {
            Some(id) => {
                catalog
                    .get(id)
                    .with_context(|| format!("no level with id {}", id))?;
                id
            }
            None => catalog.first_id().context("level catalog is empty")?,
        };
        let run = Self::attempt(&catalog, level_id, seed)?;
        let cursor = Cursor::new(run.board().rows(), run.board().cols());
        Ok(Self {
            catalog,
            level_id,
            seed,
            attempt: 0,
            run,
            cursor,
            obs_seq: 0,
        })
    }

    fn attempt(catalog: &LevelCatalog, level_id: u32, seed: u32) -> Result<RunState> {
        let config = catalog
            .get(level_id)
            .with_context(|| format!("no level with id {}", level_id))?
            .clone();
        RunState::start_attempt(config, SimpleRng::new(seed))
            .with_context(|| format!("cannot start level {}", level_id))
    }

    fn attempt_seed(&self) -> u32 {
        self.seed
            .wrapping_add(self.attempt.wrapping_mul(ATTEMPT_SEED_STRIDE))
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn level_name(&self) -> &str {
        &self.run.config().name
    }

    pub fn cursor(&self) -> Coord {
        self.cursor.position()
    }

    pub fn is_resolving(&self) -> bool {
        self.run.is_resolving()
    }

    /// Abandon the current attempt and deal a new board for the same level.
    pub fn restart(&mut self) -> Result<()> {
        self.attempt = self.attempt.wrapping_add(1);
        self.run = Self::attempt(&self.catalog, self.level_id, self.attempt_seed())?;
        log::debug!("restart level {} (attempt {})", self.level_id, self.attempt);
        Ok(())
    }

    /// Move to the next (or previous) level in catalog order.
    pub fn change_level(&mut self, forward: bool) -> Result<()> {
        let next = if forward {
            self.catalog.next_id(self.level_id)
        } else {
            self.catalog.prev_id(self.level_id)
        };
        let Some(next) = next else {
            return Ok(());
        };
        self.level_id = next;
        self.attempt = 0;
        self.run = Self::attempt(&self.catalog, next, self.attempt_seed())?;
        self.cursor = Cursor::new(self.run.board().rows(), self.run.board().cols());
        Ok(())
    }

    /// Apply a key action. Returns true when anything visible changed.
    ///
    /// Accepted swaps are left resolving; the caller drives [`Session::step`].
    pub fn apply_ui(&mut self, action: UiAction) -> Result<bool> {
        match action {
            UiAction::MoveCursor { .. } => Ok(self.cursor.apply(action)),
            UiAction::Select => Ok(self.run.select(self.cursor.position()) != Selection::Ignored),
            UiAction::Cancel => match self.run.selected() {
                Some(at) => Ok(self.run.select(at) == Selection::Deselected),
                None => Ok(false),
            },
            UiAction::Restart => self.restart().map(|_| true),
            UiAction::NextLevel => self.change_level(true).map(|_| true),
            UiAction::PrevLevel => self.change_level(false).map(|_| true),
        }
    }

    /// One cascade pass of a pending resolution.
    pub fn step(&mut self) -> Vec<Event> {
        self.run.step()
    }

    /// Apply a remote command and build its ack. Remote swaps resolve to completion.
    pub fn handle_remote(&mut self, seq: u64, command: ClientCommand) -> Result<AckMessage> {
        match command {
            ClientCommand::Swap { a, b } => {
                let outcome = self.run.attempt_swap(a, b);
                Ok(create_swap_ack(seq, &outcome))
            }
            ClientCommand::Select { at } => {
                let ack = match self.run.select(at) {
                    Selection::Swapped(mut outcome) => {
                        if outcome.accepted {
                            outcome.events.extend(self.run.resolve());
                        }
                        create_swap_ack(seq, &outcome)
                    }
                    Selection::Selected(_) | Selection::Deselected => create_ack(seq),
                    Selection::Ignored => AckMessage {
                        rejection: Some("ignored".to_string()),
                        ..create_swap_ack(seq, &SwapOutcome::default())
                    },
                };
                Ok(ack)
            }
            ClientCommand::Restart => {
                self.restart()?;
                Ok(create_ack(seq))
            }
        }
    }

    /// Fill `view` with the current state.
    pub fn snapshot_into(&self, view: &mut BoardView) {
        self.run.snapshot_into(view);
    }

    /// Observation of the current state, numbered in send order.
    pub fn observation(&mut self) -> ObservationMessage {
        self.obs_seq += 1;
        build_observation(&self.run.snapshot(), self.obs_seq)
    }
}

//! Terminal Cascade Crush runner (default binary).
//!
//! Plays the level catalog with a keyboard cursor. Cascades are animated one
//! pass at a time. When the control adapter is enabled (see `cascade_crush::adapter`),
//! remote clients can play the same board and receive observations.

use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};

use cascade_crush::adapter::{Adapter, InboundCommand, InboundPayload, LevelCatalog, OutboundMessage};
use cascade_crush::core::BoardView;
use cascade_crush::input::{handle_key_event, should_quit};
use cascade_crush::session::Session;
use cascade_crush::term::{FrameBuffer, GameView, Hud, TerminalRenderer, Viewport};

/// Pause between cascade passes.
const STEP_MS: u64 = 140;
/// Input poll interval while idle; also bounds adapter latency.
const IDLE_POLL_MS: u64 = 30;

#[derive(Debug, Parser)]
#[command(version, about = "Terminal tile-matching puzzle")]
struct Args {
    /// Level id to start on (defaults to the first level in the catalog)
    #[arg(short, long)]
    level: Option<u32>,

    /// Board seed (defaults to the clock)
    #[arg(short, long)]
    seed: Option<u32>,

    /// Level catalog JSON (overrides CASCADE_LEVELS_PATH)
    #[arg(long, value_name = "FILE")]
    levels: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let catalog = match &args.levels {
        Some(path) => LevelCatalog::load(path)?,
        None => LevelCatalog::from_env()?,
    };
    let seed = args.seed.unwrap_or_else(clock_seed);
    let mut session = Session::new(catalog, args.level, seed)?;
    let mut adapter = Adapter::start_from_env();

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut session, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn run(
    term: &mut TerminalRenderer,
    session: &mut Session,
    mut adapter: Option<&mut Adapter>,
) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut board = BoardView::default();

    let step_every = Duration::from_millis(STEP_MS);
    let mut last_step = Instant::now();
    let mut dirty = true;

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        session.snapshot_into(&mut board);
        let hud = Hud {
            level_name: session.level_name(),
            remote: adapter.is_some(),
        };
        view.render_into(&board, Some(session.cursor()), &hud, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input, with a short timeout so cascades and remote commands keep moving.
        let timeout = if session.is_resolving() {
            step_every.saturating_sub(last_step.elapsed())
        } else {
            Duration::from_millis(IDLE_POLL_MS)
        };

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        let was_resolving = session.is_resolving();
                        dirty |= session.apply_ui(action)?;
                        if !was_resolving && session.is_resolving() {
                            last_step = Instant::now();
                        }
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        if let Some(adapter) = adapter.as_deref_mut() {
            while let Some(cmd) = adapter.try_recv() {
                dirty |= handle_remote(adapter, session, cmd)?;
            }
        }

        if session.is_resolving() && last_step.elapsed() >= step_every {
            last_step = Instant::now();
            session.step();
            dirty = true;
        }

        if dirty {
            dirty = false;
            if let Some(adapter) = adapter.as_deref() {
                let obs = session.observation();
                adapter.send(OutboundMessage::BroadcastObservation { obs });
            }
        }
    }
}

/// Answer one adapter message. Returns true when the game state changed.
fn handle_remote(adapter: &Adapter, session: &mut Session, cmd: InboundCommand) -> Result<bool> {
    let InboundCommand {
        client_id,
        seq,
        payload,
    } = cmd;
    match payload {
        InboundPayload::SnapshotRequest => {
            let obs = session.observation();
            adapter.send(OutboundMessage::ToClientObservation { client_id, obs });
            Ok(false)
        }
        InboundPayload::Command(command) => {
            let ack = session.handle_remote(seq, command)?;
            adapter.send(OutboundMessage::ToClientAck { client_id, ack });
            Ok(true)
        }
    }
}

//! Terminal "game renderer" module.
//!
//! A small rendering layer for terminal play. It avoids widget toolkits and
//! instead renders into a framebuffer that is flushed to the terminal with
//! `crossterm`, rewriting only what changed between frames.
//!
//! - [`GameView`] turns a `core::BoardView` into a [`FrameBuffer`] (pure, testable)
//! - [`TerminalRenderer`] owns raw mode and the alternate screen and flushes frames

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use cascade_crush_core as core;
pub use cascade_crush_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{color_rgb, token_glyph, GameView, Hud, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};

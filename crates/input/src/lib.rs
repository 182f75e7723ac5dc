//! Terminal input module (engine-facing).
//!
//! Independent of any UI framework: maps `crossterm` key events into
//! [`UiAction`]s and keeps the board cursor those actions move.

pub mod cursor;
pub mod map;

pub use cascade_crush_types as types;

pub use cursor::Cursor;
pub use map::{handle_key_event, should_quit, UiAction};

//! Cascade Crush (workspace facade crate).
//!
//! Re-exports the member crates under `cascade_crush::{core,adapter,term,input,types}` and
//! holds [`session::Session`], the glue the terminal binary drives.

pub use cascade_crush_adapter as adapter;
pub use cascade_crush_core as core;
pub use cascade_crush_input as input;
pub use cascade_crush_term as term;
pub use cascade_crush_types as types;

pub mod session;

//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! This crate lets an external agent (a solver, a bot, a test harness) play
//! a level through a TCP socket, and supplies the level catalog the front-end
//! loads its levels from.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Server sends a board observation after every change
//! 5. **Commanding**: Controller sends swaps or clicks; each is acked with the
//!    engine's verdict and the ordered event list
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: `swap` two cells, `select` one cell, or `restart` the level
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with assigned role and server capabilities
//! - **observation**: Full board snapshot (cells, specials, jelly, score, moves, objective)
//! - **ack**: Command result: `accepted`, optional `rejection`, and `events`
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `CASCADE_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `CASCADE_AI_PORT`: Port number (default: 7878)
//! - `CASCADE_AI_MAX_PENDING`: Bounded command queue size (default: 10)
//! - `CASCADE_AI_LOG_PATH`: Append every wire line to this file
//! - `CASCADE_AI_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//! - `CASCADE_LEVELS_PATH`: Load levels from this JSON file instead of the built-in catalog
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1234567890,"client":{"name":"bot","version":"1.0.0"},"protocol_version":"1.0.0","formats":["json"],"requested":{"stream_observations":true,"command_mode":"swap"}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1234567891,"level_id":1,"phase":"awaiting_first_selection","board":{...},...}
//! Client -> Server: {"type":"command","seq":2,"ts":1234567892,"mode":"swap","a":{"row":3,"col":1},"b":{"row":3,"col":2}}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567892,"status":"ok","accepted":true,"events":[{"kind":"swap",...},{"kind":"clear",...}]}
//! ```
//!
//! # Testing
//!
//! Connect with netcat for manual testing:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0","formats":["json"],"requested":{"stream_observations":true,"command_mode":"swap"}}
//! ```

pub mod catalog;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use cascade_crush_core as core;
pub use cascade_crush_types as types;

// Re-export protocol types for convenience
pub use catalog::LevelCatalog;
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::*;

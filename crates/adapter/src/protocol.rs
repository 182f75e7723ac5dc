//! Protocol module - JSON message types for the remote controller
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sender sequence
//! number) and `ts` (milliseconds since the Unix epoch).

use serde::{Deserialize, Serialize};

use crate::core::board::{Fall, Spawn};
use crate::core::{BoardView, CellView, Event, ObjectiveProgress, SwapOutcome};
use crate::types::{ColorId, Coord, SpecialKind};

/// Protocol version spoken by this adapter; clients must share the major version.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Identifier sent in every welcome.
pub const GAME_ID: &str = "cascade-crush";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CommandType {
    #[serde(rename = "command")]
    #[default]
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControlType {
    #[serde(rename = "control")]
    #[default]
    Control,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    pub formats: FormatsList,
    pub requested: RequestedCapabilities,
}

/// Accepted wire formats. Only JSON exists; anything else in the list is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatsList {
    pub json: bool,
}

impl<'de> Deserialize<'de> for FormatsList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(FormatsList {
            json: names.iter().any(|n| n.eq_ignore_ascii_case("json")),
        })
    }
}

impl Serialize for FormatsList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let names: &[&str] = if self.json { &["json"] } else { &[] };
        names.serialize(serializer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    pub stream_observations: bool,
    pub command_mode: CommandMode,
}

/// How a controller expresses moves.
///
/// - **swap**: name both cells of the exchange
/// - **select**: click cells one at a time, like the terminal player
/// - **restart**: abandon the attempt and start the level again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandMode {
    Swap,
    Select,
    Restart,
}

impl CommandMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandMode::Swap => "swap",
            CommandMode::Select => "select",
            CommandMode::Restart => "restart",
        }
    }
}

impl<'de> Deserialize<'de> for CommandMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("swap") {
            Ok(Self::Swap)
        } else if s.eq_ignore_ascii_case("select") {
            Ok(Self::Select)
        } else if s.eq_ignore_ascii_case("restart") {
            Ok(Self::Restart)
        } else {
            Err(serde::de::Error::custom(format!("invalid command mode: {s}")))
        }
    }
}

impl Serialize for CommandMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A board position on the wire: `{"row": r, "col": c}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireCoord {
    pub row: i16,
    pub col: i16,
}

impl From<Coord> for WireCoord {
    fn from(c: Coord) -> Self {
        Self {
            row: c.row,
            col: c.col,
        }
    }
}

impl From<WireCoord> for Coord {
    fn from(c: WireCoord) -> Self {
        Coord::new(c.row, c.col)
    }
}

/// Command message (controller only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub mode: CommandMode,
    /// First cell of a swap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<WireCoord>,
    /// Second cell of a swap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<WireCoord>,
    /// Clicked cell in select mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<WireCoord>,
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Claim,
    Release,
}

impl<'de> Deserialize<'de> for ControlAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("claim") {
            Ok(Self::Claim)
        } else if s.eq_ignore_ascii_case("release") {
            Ok(Self::Release)
        } else {
            Err(serde::de::Error::custom(format!("unknown control action: {s}")))
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: Vec<String>,
    pub command_modes: Vec<CommandMode>,
    pub specials: Vec<SpecialKindLower>,
    pub objectives: Vec<String>,
}

/// Command acknowledgment, sent once the game loop has applied the command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    /// False when the engine rejected the move; `rejection` then says why.
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<WireEvent>,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

// ============== Events ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKindLower {
    None,
    StripedRow,
    StripedCol,
    Wrapped,
    ColorBomb,
}

impl From<SpecialKind> for SpecialKindLower {
    fn from(kind: SpecialKind) -> Self {
        match kind {
            SpecialKind::None => SpecialKindLower::None,
            SpecialKind::StripedRow => SpecialKindLower::StripedRow,
            SpecialKind::StripedCol => SpecialKindLower::StripedCol,
            SpecialKind::Wrapped => SpecialKindLower::Wrapped,
            SpecialKind::ColorBomb => SpecialKindLower::ColorBomb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFall {
    pub from: WireCoord,
    pub to: WireCoord,
}

impl From<&Fall> for WireFall {
    fn from(f: &Fall) -> Self {
        Self {
            from: f.from.into(),
            to: f.to.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSpawn {
    pub at: WireCoord,
    pub color: ColorId,
    pub special: SpecialKindLower,
}

impl From<&Spawn> for WireSpawn {
    fn from(s: &Spawn) -> Self {
        Self {
            at: s.at.into(),
            color: s.token.color,
            special: s.token.special.into(),
        }
    }
}

/// Engine event as sent to clients, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WireEvent {
    Swap {
        a: WireCoord,
        b: WireCoord,
    },
    SwapReverted {
        a: WireCoord,
        b: WireCoord,
    },
    CascadeStep {
        depth: u32,
    },
    SpecialActivated {
        at: WireCoord,
        special: SpecialKindLower,
        cells: usize,
    },
    Clear {
        cells: Vec<WireCoord>,
        points: u32,
    },
    SpecialCreated {
        at: WireCoord,
        special: SpecialKindLower,
        color: ColorId,
        bonus: u32,
    },
    Refill {
        falls: Vec<WireFall>,
        spawns: Vec<WireSpawn>,
    },
    LevelComplete {
        score: u32,
        stars: u8,
    },
    LevelFailed {
        score: u32,
    },
}

impl From<&Event> for WireEvent {
    fn from(ev: &Event) -> Self {
        match ev {
            Event::Swap { a, b } => WireEvent::Swap {
                a: (*a).into(),
                b: (*b).into(),
            },
            Event::SwapReverted { a, b } => WireEvent::SwapReverted {
                a: (*a).into(),
                b: (*b).into(),
            },
            Event::CascadeStep { depth } => WireEvent::CascadeStep { depth: *depth },
            Event::SpecialActivated { at, kind, cells } => WireEvent::SpecialActivated {
                at: (*at).into(),
                special: (*kind).into(),
                cells: *cells,
            },
            Event::Clear { cells, points } => WireEvent::Clear {
                cells: cells.iter().map(|c| (*c).into()).collect(),
                points: *points,
            },
            Event::SpecialCreated {
                at,
                kind,
                color,
                bonus,
            } => WireEvent::SpecialCreated {
                at: (*at).into(),
                special: (*kind).into(),
                color: *color,
                bonus: *bonus,
            },
            Event::Refill { falls, spawns } => WireEvent::Refill {
                falls: falls.iter().map(WireFall::from).collect(),
                spawns: spawns.iter().map(WireSpawn::from).collect(),
            },
            Event::LevelComplete { score, stars } => WireEvent::LevelComplete {
                score: *score,
                stars: *stars,
            },
            Event::LevelFailed { score } => WireEvent::LevelFailed { score: *score },
        }
    }
}

// ============== Observation ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Board snapshot: `cells[row][col]` is `-1` for an inactive cell, `0` for an
/// empty one and `color + 1` for a token. Special tokens are listed separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: i16,
    pub cols: i16,
    pub cells: Vec<Vec<i8>>,
    pub specials: Vec<SpecialSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSnapshot {
    pub row: i16,
    pub col: i16,
    pub special: SpecialKindLower,
}

impl From<&BoardView> for BoardSnapshot {
    fn from(view: &BoardView) -> Self {
        let mut cells = Vec::with_capacity(view.rows.max(0) as usize);
        let mut specials = Vec::new();
        for row in 0..view.rows {
            let mut line = Vec::with_capacity(view.cols.max(0) as usize);
            for col in 0..view.cols {
                let at = Coord::new(row, col);
                let v = match view.cell(at) {
                    CellView::Inactive => -1,
                    CellView::Empty => 0,
                    CellView::Token(token) => {
                        if token.is_special() {
                            specials.push(SpecialSnapshot {
                                row,
                                col,
                                special: token.special.into(),
                            });
                        }
                        token.color as i8 + 1
                    }
                };
                line.push(v);
            }
            cells.push(line);
        }
        Self {
            rows: view.rows,
            cols: view.cols,
            cells,
            specials,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub label: String,
    pub current: u32,
    pub target: u32,
}

impl From<&ObjectiveProgress> for ProgressSnapshot {
    fn from(p: &ObjectiveProgress) -> Self {
        Self {
            label: p.label.clone(),
            current: p.current,
            target: p.target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveSnapshot {
    pub text: String,
    pub complete: bool,
    pub progress: Vec<ProgressSnapshot>,
}

/// Stable 64-bit hash of the observable state, hex encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(&s, 16)
            .map(StateHash)
            .map_err(serde::de::Error::custom)
    }
}

/// Game state observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub level_id: u32,
    pub phase: String,
    pub playable: bool,
    pub board: BoardSnapshot,
    pub jelly: Vec<WireCoord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<WireCoord>,
    pub score: u32,
    pub moves_remaining: u32,
    pub move_limit: u32,
    pub cascade_depth: u32,
    pub stars: u8,
    pub objective: ObjectiveSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    pub state_hash: StateHash,
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // An unknown type is answered with an error, not treated as malformed JSON.
            #[derive(Debug, Deserialize)]
            struct Header {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            match header.msg_type.as_deref() {
                Some("hello") | Some("command") | Some("control") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: header.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, command_mode: CommandMode) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        formats: FormatsList { json: true },
        requested: RequestedCapabilities {
            stream_observations: true,
            command_mode,
        },
    }
}

/// Create a swap command
pub fn create_swap_command(seq: u64, a: Coord, b: Coord) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        mode: CommandMode::Swap,
        a: Some(a.into()),
        b: Some(b.into()),
        at: None,
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        role,
        controller_id,
        game_id: GAME_ID.to_string(),
        capabilities: ServerCapabilities {
            formats: vec!["json".to_string()],
            command_modes: vec![CommandMode::Swap, CommandMode::Select, CommandMode::Restart],
            specials: vec![
                SpecialKindLower::StripedRow,
                SpecialKindLower::StripedCol,
                SpecialKindLower::Wrapped,
                SpecialKindLower::ColorBomb,
            ],
            objectives: ["score", "jelly", "collect", "ingredients"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        },
    }
}

/// Create an acknowledgment for a command that carried no engine result.
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
        accepted: true,
        rejection: None,
        events: Vec::new(),
    }
}

/// Create an acknowledgment carrying the engine's answer to a swap.
pub fn create_swap_ack(seq: u64, outcome: &SwapOutcome) -> AckMessage {
    AckMessage {
        accepted: outcome.accepted,
        rejection: outcome.rejection.map(|r| r.as_str().to_string()),
        events: outcome.events.iter().map(WireEvent::from).collect(),
        ..create_ack(seq)
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rejection, SwapOutcome};
    use crate::types::Token;

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1234567890,"client":{"name":"test-ai","version":"1.0.0"},"protocol_version":"1.0.0","formats":["json"],"requested":{"stream_observations":true,"command_mode":"swap"}}"#;

        let result = parse_message(json).unwrap();
        match result {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.msg_type, HelloType::Hello);
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "test-ai");
                assert_eq!(msg.protocol_version, "1.0.0");
                assert!(msg.formats.json);
                assert_eq!(msg.requested.command_mode, CommandMode::Swap);
            }
            _ => panic!("Expected Hello message"),
        }
    }

    #[test]
    fn test_parse_command_swap() {
        let json = r#"{"type":"command","seq":2,"ts":1234567900,"mode":"swap","a":{"row":3,"col":1},"b":{"row":3,"col":2}}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Command(msg) => {
                assert_eq!(msg.mode, CommandMode::Swap);
                assert_eq!(msg.a, Some(WireCoord { row: 3, col: 1 }));
                assert_eq!(msg.b, Some(WireCoord { row: 3, col: 2 }));
                assert!(msg.at.is_none());
            }
            _ => panic!("Expected Command message"),
        }
    }

    #[test]
    fn test_parse_command_select_case_insensitive() {
        let json = r#"{"type":"command","seq":4,"ts":0,"mode":"SELECT","at":{"row":0,"col":5}}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Command(msg) => {
                assert_eq!(msg.mode, CommandMode::Select);
                assert_eq!(msg.at.map(Coord::from), Some(Coord::new(0, 5)));
            }
            _ => panic!("Expected Command message"),
        }
    }

    #[test]
    fn test_parse_control() {
        let json = r#"{"type":"control","seq":3,"ts":1234567910,"action":"release"}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Control(msg) => assert_eq!(msg.action, ControlAction::Release),
            _ => panic!("Expected Control message"),
        }
    }

    #[test]
    fn test_unknown_type_is_not_a_parse_error() {
        let json = r#"{"type":"shuffle","seq":9,"ts":0}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Unknown(m) => assert_eq!(m.seq, 9),
            _ => panic!("Expected Unknown message"),
        }
    }

    #[test]
    fn test_bad_command_mode_is_a_parse_error() {
        let json = r#"{"type":"command","seq":2,"ts":0,"mode":"place"}"#;
        assert!(parse_message(json).is_err());
    }

    #[test]
    fn test_create_welcome() {
        let welcome = create_welcome(1, 7, AssignedRole::Controller, Some(7));
        assert_eq!(welcome.msg_type, WelcomeType::Welcome);
        assert_eq!(welcome.seq, 1);
        assert_eq!(welcome.protocol_version, PROTOCOL_VERSION);
        assert_eq!(welcome.client_id, 7);
        assert_eq!(welcome.role, AssignedRole::Controller);
        assert_eq!(welcome.game_id, "cascade-crush");

        let json = serde_json::to_string(&welcome).unwrap();
        assert!(json.contains(r#""command_modes":["swap","select","restart"]"#));
        assert!(json.contains(r#""color_bomb""#));
    }

    #[test]
    fn test_create_error() {
        let error = create_error(5, ErrorCode::NotController, "Only controller may send commands");
        assert_eq!(error.msg_type, ErrorType::Error);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""code":"not_controller""#));
    }

    #[test]
    fn test_swap_ack_carries_events() {
        let outcome = SwapOutcome {
            accepted: false,
            rejection: Some(Rejection::NoEffect),
            events: vec![
                Event::Swap {
                    a: Coord::new(0, 0),
                    b: Coord::new(0, 1),
                },
                Event::SwapReverted {
                    a: Coord::new(0, 0),
                    b: Coord::new(0, 1),
                },
            ],
        };
        let ack = create_swap_ack(12, &outcome);
        let json = serde_json::to_string(&ack).unwrap();
        let parsed: AckMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seq, 12);
        assert!(!parsed.accepted);
        assert_eq!(parsed.rejection.as_deref(), Some("no_effect"));
        assert_eq!(parsed.events.len(), 2);
        assert!(json.contains(r#""kind":"swap_reverted""#));
    }

    #[test]
    fn test_plain_ack_omits_empty_fields() {
        let json = serde_json::to_string(&create_ack(3)).unwrap();
        assert!(json.contains(r#""status":"ok""#));
        assert!(!json.contains("events"));
        assert!(!json.contains("rejection"));
    }

    #[test]
    fn test_wire_event_from_special_created() {
        let ev = Event::SpecialCreated {
            at: Coord::new(3, 2),
            kind: SpecialKind::StripedCol,
            color: 0,
            bonus: 120,
        };
        let wire = WireEvent::from(&ev);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["kind"], "special_created");
        assert_eq!(json["special"], "striped_col");
        assert_eq!(json["at"]["col"], 2);
        assert_eq!(json["bonus"], 120);
    }

    #[test]
    fn test_board_snapshot_encoding() {
        let view = BoardView {
            rows: 1,
            cols: 3,
            cells: vec![
                CellView::Inactive,
                CellView::Empty,
                CellView::Token(Token::new(2, SpecialKind::Wrapped)),
            ],
            ..BoardView::default()
        };
        let snap = BoardSnapshot::from(&view);
        assert_eq!(snap.cells, vec![vec![-1, 0, 3]]);
        assert_eq!(snap.specials.len(), 1);
        assert_eq!(snap.specials[0].special, SpecialKindLower::Wrapped);
    }

    #[test]
    fn test_state_hash_hex_roundtrip() {
        let json = serde_json::to_string(&StateHash(0xabc)).unwrap();
        assert_eq!(json, r#""0000000000000abc""#);
        let back: StateHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StateHash(0xabc));
    }
}

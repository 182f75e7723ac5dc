//! TCP server for the remote controller
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::core::BoardView;
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 10,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from `CASCADE_AI_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("CASCADE_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("CASCADE_AI_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("CASCADE_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let log_path = env::var("CASCADE_AI_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            max_pending_commands,
            log_path,
        }
    }
}

/// Shared server state
pub struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    /// Check if remote control is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("CASCADE_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Record `seq` if it is strictly greater than the client's last one.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    /// Handshake and sequencing gate shared by commands and control messages.
    async fn admit(&self, client_id: usize, seq: u64, what: &str) -> Result<(), ErrorMessage> {
        if !self.is_handshaken(client_id).await {
            return Err(create_error(
                seq,
                ErrorCode::HandshakeRequired,
                &format!("Send hello before {}", what),
            ));
        }
        if !self.check_and_update_seq(client_id, seq).await {
            return Err(create_error(
                seq,
                ErrorCode::InvalidCommand,
                "seq must be strictly increasing",
            ));
        }
        Ok(())
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub command_mode: CommandMode,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Line(String),
    Ack(AckMessage),
    Error(ErrorMessage),
    Welcome(WelcomeMessage),
    Observation(ObservationMessage),
}

impl ClientOutbound {
    /// Serialize into `buf` (cleared first), without the trailing newline.
    fn encode(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        fn json<T: Serialize>(buf: &mut Vec<u8>, v: &T) -> serde_json::Result<()> {
            serde_json::to_writer(buf, v)
        }

        buf.clear();
        match self {
            ClientOutbound::Line(line) => {
                buf.extend_from_slice(line.trim_end_matches('\n').as_bytes());
                Ok(())
            }
            ClientOutbound::Ack(v) => json(buf, v),
            ClientOutbound::Error(v) => json(buf, v),
            ClientOutbound::Welcome(v) => json(buf, v),
            ClientOutbound::Observation(v) => json(buf, v),
        }
    }
}

type WireLog = Option<mpsc::UnboundedSender<Vec<u8>>>;

/// Append every wire line (both directions) to `path` as JSON lines.
fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<Vec<u8>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[Adapter] cannot open wire log {}: {}", path, e);
                return;
            }
        };
        while let Some(mut line) = rx.recv().await {
            line.push(b'\n');
            if file.write_all(&line).await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });
    tx
}

/// Start the TCP server.
///
/// `ready_tx` receives the bound address once the listener is up, which lets
/// callers bind to port 0.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log: WireLog = config.log_path.clone().map(spawn_wire_log);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    let bound = listener.local_addr()?;
    println!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new());
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                let (target, out) = match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        (Some(client_id), ClientOutbound::Line(line))
                    }
                    OutboundMessage::Broadcast { line } => (None, ClientOutbound::Line(line)),
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        (Some(client_id), ClientOutbound::Observation(obs))
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        (None, ClientOutbound::Observation(obs))
                    }
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        (Some(client_id), ClientOutbound::Ack(ack))
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        (Some(client_id), ClientOutbound::Error(err))
                    }
                };
                match target {
                    Some(id) => {
                        if let Some(c) = clients.iter().find(|c| c.id == id) {
                            let _ = c.tx.send(out);
                        }
                    }
                    None => {
                        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
                            let _ = c.tx.send(out.clone());
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Adapter] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log = wire_log.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx, wire_log).await
            {
                eprintln!("[Adapter] Client {} error: {}", client_id, e);
            }
            println!("[Adapter] Client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log: WireLog,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            command_mode: CommandMode::Swap,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    let wire_log_out = wire_log.clone();
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            if msg.encode(&mut buf).is_err() {
                continue;
            }
            if let Some(log) = wire_log_out.as_ref() {
                let _ = log.send(buf.clone());
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let raw_line = line.trim_end_matches(['\n', '\r']);
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(log) = wire_log.as_ref() {
            let _ = log.send(raw_line.as_bytes().to_vec());
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    let error = create_error(
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                let major = PROTOCOL_VERSION.split('.').next().unwrap_or("1");
                if hello.protocol_version.split('.').next() != Some(major) {
                    let error = create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    break;
                }

                // First client to hello becomes controller.
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.command_mode = hello.requested.command_mode;
                        client.stream_observations = hello.requested.stream_observations;
                    }
                    if controller.is_none() {
                        *controller = Some(client_id);
                        println!("[Adapter] Client {} is now controller", client_id);
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, controller.map(|id| id as u64))
                };

                let welcome = create_welcome(hello.seq, client_id as u64, role, controller_id);
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if let Err(error) = state.admit(client_id, cmd.seq, "command").await {
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                if !state.is_controller(client_id).await {
                    let error = create_error(
                        cmd.seq,
                        ErrorCode::NotController,
                        "Only controller may send commands",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        let error = create_error(cmd.seq, ErrorCode::InvalidCommand, &message);
                        let _ = tx.send(ClientOutbound::Error(error));
                        continue;
                    }
                };

                // The game loop acks once the command has been applied.
                let queued = command_tx.try_send(InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Command(mapped),
                });
                if queued.is_err() {
                    let error =
                        create_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                    let _ = tx.send(ClientOutbound::Error(error));
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if let Err(error) = state.admit(client_id, ctrl.seq, "control").await {
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                let mut controller = state.controller.write().await;
                let reply = match ctrl.action {
                    ControlAction::Claim => match *controller {
                        None => {
                            *controller = Some(client_id);
                            println!("[Adapter] Client {} claimed control", client_id);
                            ClientOutbound::Ack(create_ack(ctrl.seq))
                        }
                        Some(id) if id == client_id => ClientOutbound::Ack(create_ack(ctrl.seq)),
                        Some(_) => ClientOutbound::Error(create_error(
                            ctrl.seq,
                            ErrorCode::ControllerActive,
                            "Controller already assigned",
                        )),
                    },
                    ControlAction::Release => {
                        if *controller == Some(client_id) {
                            *controller = None;
                            println!("[Adapter] Controller {} released", client_id);
                            ClientOutbound::Ack(create_ack(ctrl.seq))
                        } else {
                            ClientOutbound::Error(create_error(
                                ctrl.seq,
                                ErrorCode::NotController,
                                "Only controller may release",
                            ))
                        }
                    }
                };
                let _ = tx.send(reply);
            }

            Ok(ParsedMessage::Unknown(msg)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, msg.seq).await
                {
                    let error = create_error(
                        msg.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }
                let error = create_error(msg.seq, ErrorCode::InvalidCommand, "Unknown message type");
                let _ = tx.send(ClientOutbound::Error(error));
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                let error = create_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                );
                let _ = tx.send(ClientOutbound::Error(error));
            }
        }
    }

    // Remove the client; hand control to the lowest-id handshaken client if needed.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);

        if *controller == Some(client_id) {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            match next_id {
                Some(id) => println!("[Adapter] Controller {} promoted", id),
                None => println!("[Adapter] Controller {} released", client_id),
            }
        }
    }

    drop(tx);
    let _ = write_task.await;

    Ok(())
}

/// Map a protocol command into an engine command.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, String> {
    match cmd.mode {
        CommandMode::Swap => match (cmd.a, cmd.b) {
            (Some(a), Some(b)) => Ok(ClientCommand::Swap {
                a: a.into(),
                b: b.into(),
            }),
            _ => Err("swap needs both a and b".to_string()),
        },
        CommandMode::Select => match cmd.at {
            Some(at) => Ok(ClientCommand::Select { at: at.into() }),
            None => Err("select needs at".to_string()),
        },
        CommandMode::Restart => Ok(ClientCommand::Restart),
    }
}

/// Build an observation message from a board view
pub fn build_observation(view: &BoardView, seq: u64) -> ObservationMessage {
    use std::hash::{Hash, Hasher};

    let mut hasher = Fnv1aHasher::new();
    view.level_id.hash(&mut hasher);
    view.rows.hash(&mut hasher);
    view.cols.hash(&mut hasher);
    view.cells.hash(&mut hasher);
    view.jelly.hash(&mut hasher);
    view.selected.hash(&mut hasher);
    view.phase.hash(&mut hasher);
    view.score.hash(&mut hasher);
    view.moves_remaining.hash(&mut hasher);
    view.cascade_depth.hash(&mut hasher);
    view.outcome.hash(&mut hasher);
    let state_hash = StateHash(hasher.finish());

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        level_id: view.level_id,
        phase: view.phase.as_str().to_string(),
        playable: view.playable(),
        board: BoardSnapshot::from(view),
        jelly: view.jelly.iter().map(|c| (*c).into()).collect(),
        selected: view.selected.map(Into::into),
        score: view.score,
        moves_remaining: view.moves_remaining,
        move_limit: view.move_limit,
        cascade_depth: view.cascade_depth,
        stars: view.stars,
        objective: ObjectiveSnapshot {
            text: view.objective_text.clone(),
            complete: view.objective_met(),
            progress: view.objective.iter().map(ProgressSnapshot::from).collect(),
        },
        outcome: view.outcome.map(|o| o.as_str().to_string()),
        state_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LevelConfig, Objective, RunState, SimpleRng};
    use crate::types::Coord;

    fn command(json: &str) -> CommandMessage {
        match parse_message(json).unwrap() {
            ParsedMessage::Command(c) => c,
            _ => panic!("Expected Command message"),
        }
    }

    #[test]
    fn test_map_swap_command() {
        let cmd = command(
            r#"{"type":"command","seq":1,"ts":0,"mode":"swap","a":{"row":1,"col":1},"b":{"row":1,"col":2}}"#,
        );
        assert_eq!(
            map_command(&cmd),
            Ok(ClientCommand::Swap {
                a: Coord::new(1, 1),
                b: Coord::new(1, 2)
            })
        );
    }

    #[test]
    fn test_map_command_missing_fields() {
        let cmd = command(r#"{"type":"command","seq":1,"ts":0,"mode":"swap","a":{"row":1,"col":1}}"#);
        assert!(map_command(&cmd).is_err());
        let cmd = command(r#"{"type":"command","seq":1,"ts":0,"mode":"select"}"#);
        assert!(map_command(&cmd).is_err());
        let cmd = command(r#"{"type":"command","seq":1,"ts":0,"mode":"restart"}"#);
        assert_eq!(map_command(&cmd), Ok(ClientCommand::Restart));
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "type": oops"#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"type":"x"}"#), None);
    }

    #[test]
    fn test_server_config_from_env() {
        // Only checks that env parsing never panics.
        let _config = ServerConfig::from_env();
    }

    fn run() -> RunState {
        let level = LevelConfig::new(6, 6, 10, 4, Objective::Score { target: 500 }, [100, 200, 300])
            .with_id(3, "test");
        RunState::start_attempt(level, SimpleRng::new(99)).unwrap()
    }

    #[test]
    fn test_observation_mirrors_view() {
        let view = run().snapshot();
        let obs = build_observation(&view, 5);
        assert_eq!(obs.seq, 5);
        assert_eq!(obs.level_id, 3);
        assert_eq!(obs.board.cells.len(), 6);
        assert!(obs.board.cells.iter().flatten().all(|v| (1..=4).contains(v)));
        assert_eq!(obs.moves_remaining, 10);
        assert_eq!(obs.phase, "awaiting_first_selection");
        assert!(obs.playable);
        assert_eq!(obs.objective.text, "Score 500 points");
    }

    #[test]
    fn test_state_hash_tracks_selection() {
        let mut state = run();
        let before = build_observation(&state.snapshot(), 1);
        state.select(Coord::new(0, 0));
        let after = build_observation(&state.snapshot(), 2);
        assert_ne!(before.state_hash, after.state_hash);

        let again = build_observation(&state.snapshot(), 3);
        assert_eq!(after.state_hash, again.state_hash);
    }
}

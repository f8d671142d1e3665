//! In-process relay peer
//!
//! Plays the server side of the protocol for local games and tests. It keeps
//! the authoritative position, hands out seats in connection order (White,
//! then Black, then spectators) and relays accepted moves.
//!
//! # Message Flow
//!
//! ```text
//! client ──move──▶ relay ──move──▶ every other client
//!                        ──boardState──▶ every client
//! client ──checkmate──▶ relay ──checkmate──▶ every client
//! ```
//!
//! Frames travel as JSON strings over crossbeam channels. Nothing blocks:
//! [`LocalRelay::pump`] drains whatever is queued and returns.

use crate::game::position::{MoveOutcome, PositionState};
use crate::game::types::{Move, PieceColor};
use crate::networking::protocol::{ClientMessage, ServerMessage};
use crate::networking::transport::{ChannelTransport, ClientId};
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

/// Client end of a relay connection
pub struct Connection {
    pub id: ClientId,
    /// Outbound frames to the relay
    pub transport: ChannelTransport,
    /// Inbound frames from the relay
    pub inbox: Receiver<String>,
}

struct Peer {
    id: ClientId,
    outbox: Sender<String>,
}

pub struct LocalRelay {
    position: PositionState,
    white: Option<ClientId>,
    black: Option<ClientId>,
    peers: Vec<Peer>,
    inbox_tx: Sender<(ClientId, String)>,
    inbox_rx: Receiver<(ClientId, String)>,
}

impl Default for LocalRelay {
    fn default() -> Self {
        Self::new(PositionState::default())
    }
}

impl LocalRelay {
    pub fn new(position: PositionState) -> Self {
        let (inbox_tx, inbox_rx) = unbounded();
        Self {
            position,
            white: None,
            black: None,
            peers: Vec::new(),
            inbox_tx,
            inbox_rx,
        }
    }

    pub fn position(&self) -> &PositionState {
        &self.position
    }

    pub fn seat_of(&self, id: ClientId) -> Option<PieceColor> {
        if self.white == Some(id) {
            Some(PieceColor::White)
        } else if self.black == Some(id) {
            Some(PieceColor::Black)
        } else {
            None
        }
    }

    /// Register a new client, assign its role and send the current board
    pub fn connect(&mut self) -> Connection {
        let id = ClientId::new();
        let (outbox, inbox) = unbounded();
        self.peers.push(Peer { id, outbox });

        let role = if self.white.is_none() {
            self.white = Some(id);
            ServerMessage::PlayerRole(PieceColor::White)
        } else if self.black.is_none() {
            self.black = Some(id);
            ServerMessage::PlayerRole(PieceColor::Black)
        } else {
            ServerMessage::SpectatorRole
        };
        info!("[RELAY] Client {} connected ({})", id, describe(&role));

        self.send_to(id, &role);
        self.send_to(id, &ServerMessage::BoardState(self.position.fen()));

        Connection {
            id,
            transport: ChannelTransport::new(id, self.inbox_tx.clone()),
            inbox,
        }
    }

    /// Forget a client and free its seat
    pub fn disconnect(&mut self, id: ClientId) {
        self.peers.retain(|peer| peer.id != id);
        if self.white == Some(id) {
            self.white = None;
        }
        if self.black == Some(id) {
            self.black = None;
        }
        info!("[RELAY] Client {} disconnected", id);
    }

    /// Process every queued client frame, returns how many were handled
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok((from, frame)) = self.inbox_rx.try_recv() {
            handled += 1;
            match ClientMessage::from_json(&frame) {
                Ok(message) => self.handle(from, message),
                Err(e) => warn!("[RELAY] Dropping frame from {}: {}", from, e),
            }
        }
        handled
    }

    fn handle(&mut self, from: ClientId, message: ClientMessage) {
        match message {
            ClientMessage::Move(mv) => self.handle_move(from, mv),
            ClientMessage::Checkmate(winner) => {
                info!("[RELAY] {} reports checkmate, {} wins", from, winner.name());
                self.broadcast(&ServerMessage::Checkmate(winner), None);
            }
        }
    }

    fn handle_move(&mut self, from: ClientId, mv: Move) {
        let turn = self.position.turn();
        if self.seat_of(from) != Some(turn) {
            warn!("[RELAY] {} tried {} out of turn", from, mv);
            return;
        }

        match self.position.apply_move(&mv) {
            MoveOutcome::Applied(_) => {
                debug!("[RELAY] {} played {}", from, mv);
                self.broadcast(&ServerMessage::Move(mv), Some(from));
                self.broadcast(&ServerMessage::BoardState(self.position.fen()), None);
            }
            MoveOutcome::Rejected => {
                warn!("[RELAY] Invalid move {} from {}", mv, from);
            }
        }
    }

    fn broadcast(&mut self, message: &ServerMessage, except: Option<ClientId>) {
        let targets: Vec<ClientId> = self
            .peers
            .iter()
            .map(|peer| peer.id)
            .filter(|id| Some(*id) != except)
            .collect();
        for id in targets {
            self.send_to(id, message);
        }
    }

    fn send_to(&mut self, id: ClientId, message: &ServerMessage) {
        let frame = match message.to_json() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("[RELAY] Failed to encode {}: {}", message.event_name(), e);
                return;
            }
        };
        let Some(peer) = self.peers.iter().find(|peer| peer.id == id) else {
            return;
        };
        if peer.outbox.send(frame).is_err() {
            warn!("[RELAY] Client {} went away", id);
            self.disconnect(id);
        }
    }
}

fn describe(role: &ServerMessage) -> &'static str {
    match role {
        ServerMessage::PlayerRole(PieceColor::White) => "white",
        ServerMessage::PlayerRole(PieceColor::Black) => "black",
        _ => "spectator",
    }
}

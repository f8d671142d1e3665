//! Wire protocol between a client session and the server peer
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`. The
//! event sets are closed: [`ServerMessage`] for what the client receives and
//! [`ClientMessage`] for what it sends.

use crate::core::error::SyncResult;
use crate::game::types::{Move, PieceColor};
use serde::{Deserialize, Serialize};

/// Server → Client
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// A move played by another client, applied without re-sending
    Move(Move),
    /// Seat assignment for this client
    PlayerRole(PieceColor),
    /// No seat left, watch only
    SpectatorRole,
    /// Authoritative FEN snapshot
    BoardState(String),
    /// Game over, carries the winning color
    Checkmate(PieceColor),
}

/// Client → Server
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// A locally accepted move
    Move(Move),
    /// Local checkmate detected, carries the claimed winner
    Checkmate(PieceColor),
}

impl ServerMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::Move(_) => "move",
            ServerMessage::PlayerRole(_) => "playerRole",
            ServerMessage::SpectatorRole => "spectatorRole",
            ServerMessage::BoardState(_) => "boardState",
            ServerMessage::Checkmate(_) => "checkmate",
        }
    }

    pub fn from_json(frame: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(frame)?)
    }

    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ClientMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::Move(_) => "move",
            ClientMessage::Checkmate(_) => "checkmate",
        }
    }

    pub fn from_json(frame: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(frame)?)
    }

    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

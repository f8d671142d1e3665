//! Error types for the client core
//!
//! Covers the fallible seams of the client: square and FEN parsing, wire
//! decoding, the outbound transport and settings persistence. Illegal moves
//! are not errors here; the position reports them as a rejected outcome.

use thiserror::Error;

/// Errors that can occur in the client core
#[derive(Error, Debug)]
pub enum SyncError {
    /// Square text or grid coordinates outside the board
    #[error("Invalid square: {input}")]
    InvalidSquare { input: String },

    /// Board snapshot the rules engine cannot represent
    #[error("Invalid board state '{fen}': {message}")]
    InvalidFen { fen: String, message: String },

    /// Inbound frame that does not match the event taxonomy
    #[error("Failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),

    /// The peer end of the message channel is gone
    #[error("Transport closed: {message}")]
    TransportClosed { message: String },

    /// Settings file I/O error
    #[error("Settings I/O error: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings deserialization error
    #[error("Settings serialization error: {message}")]
    SettingsSerialization { message: String },
}

/// Result type alias for client core operations
pub type SyncResult<T> = Result<T, SyncError>;

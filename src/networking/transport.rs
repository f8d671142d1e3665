//! Outbound side of the message channel
//!
//! The coordinator only needs fire-and-forget delivery. [`ChannelTransport`]
//! feeds the in-process relay over a crossbeam channel; [`RecordingTransport`]
//! keeps everything it was given, which is what tests and headless tools want.

use crate::core::error::{SyncError, SyncResult};
use crate::networking::protocol::ClientMessage;
use crossbeam_channel::Sender;
use std::fmt;
use tracing::trace;
use uuid::Uuid;

/// Identity of one connected client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        ClientId(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form is enough to tell clients apart in logs
        let text = self.0.simple().to_string();
        f.write_str(&text[..8])
    }
}

/// Outbound message channel
///
/// Sends never wait for an acknowledgment and are never retried.
pub trait Transport {
    fn send(&mut self, message: ClientMessage) -> SyncResult<()>;
}

/// JSON frames tagged with the sending client, delivered to the relay inbox
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    client: ClientId,
    sender: Sender<(ClientId, String)>,
}

impl ChannelTransport {
    pub fn new(client: ClientId, sender: Sender<(ClientId, String)>) -> Self {
        Self { client, sender }
    }

    pub fn client(&self) -> ClientId {
        self.client
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, message: ClientMessage) -> SyncResult<()> {
        let frame = message.to_json()?;
        trace!("[TRANSPORT] {} -> {}", self.client, frame);
        self.sender
            .send((self.client, frame))
            .map_err(|e| SyncError::TransportClosed {
                message: e.to_string(),
            })
    }
}

/// Keeps every sent message in order
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    sent: Vec<ClientMessage>,
}

impl RecordingTransport {
    pub fn sent(&self) -> &[ClientMessage] {
        &self.sent
    }

    pub fn drain(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.sent)
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, message: ClientMessage) -> SyncResult<()> {
        self.sent.push(message);
        Ok(())
    }
}

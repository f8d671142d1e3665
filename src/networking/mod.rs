//! Networking module - the message channel seen from one client
//!
//! - [`protocol`] - closed inbound/outbound event sets and their JSON framing
//! - [`transport`] - the outbound [`Transport`] seam
//! - [`relay`] - an in-process server peer for local games and tests

pub mod protocol;
pub mod relay;
pub mod transport;

pub use protocol::{ClientMessage, ServerMessage};
pub use relay::{Connection, LocalRelay};
pub use transport::{ChannelTransport, ClientId, RecordingTransport, Transport};

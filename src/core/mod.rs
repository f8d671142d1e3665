//! Core module - error taxonomy and client settings
//!
//! - [`error`] - [`SyncError`] and the [`SyncResult`] alias
//! - [`settings`] - [`ClientSettings`] persisted as JSON

pub mod error;
pub mod settings;

pub use error::{SyncError, SyncResult};
pub use settings::{ClientSettings, PieceStyle};

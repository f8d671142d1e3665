//! Client settings persistence
//!
//! Loads [`ClientSettings`] from a JSON file. The file lives in the user's
//! configuration directory; when that cannot be resolved a local
//! `settings.json` is used instead.
//!
//! # Error Handling
//!
//! Load failures fall back to default settings and are logged. Save failures
//! are returned to the caller.

use crate::core::error::{SyncError, SyncResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// How pieces are drawn by the text board projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceStyle {
    /// Chess glyphs (♔ ♚ ...)
    #[default]
    Unicode,
    /// FEN letters, uppercase for White
    Letters,
}

/// User preferences for the terminal client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
    pub piece_style: PieceStyle,
    /// Draw file letters and rank numbers around the board
    pub show_coordinates: bool,
    /// Print captured piece lists under the board
    pub show_captured: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            log_filter: "duelboard=info".to_string(),
            piece_style: PieceStyle::default(),
            show_coordinates: true,
            show_captured: true,
        }
    }
}

impl ClientSettings {
    /// Resolve the default settings path
    ///
    /// E.g. `~/.config/duelboard/settings.json` on Linux.
    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "duelboard") {
            proj_dirs.config_dir().join(SETTINGS_FILENAME)
        } else {
            PathBuf::from(SETTINGS_FILENAME)
        }
    }

    /// Read settings from `path`, reporting any failure
    pub fn read_from(path: &Path) -> SyncResult<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| SyncError::SettingsSerialization {
            message: e.to_string(),
        })
    }

    /// Load settings from `path`, falling back to defaults
    ///
    /// A missing file is not an error. An unreadable or malformed file is
    /// logged and replaced by defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!(
                "[SETTINGS] No settings file found at {:?}. Using defaults.",
                path
            );
            return Self::default();
        }

        match Self::read_from(path) {
            Ok(settings) => {
                info!("[SETTINGS] Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!(
                    "[SETTINGS] Failed to load settings at {:?}: {}. Using defaults.",
                    path, e
                );
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON, creating the parent directory if needed
    pub fn save_to(&self, path: &Path) -> SyncResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json =
            serde_json::to_string_pretty(self).map_err(|e| SyncError::SettingsSerialization {
                message: e.to_string(),
            })?;
        fs::write(path, json)?;
        info!("[SETTINGS] Saved settings to {:?}", path);
        Ok(())
    }
}

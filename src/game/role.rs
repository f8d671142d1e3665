//! Role authority
//!
//! Holds the single role assigned to this client by the server peer and
//! derives what the UI may do with it. Before any assignment the client is
//! treated as a spectator.

use crate::game::types::PieceColor;
use serde::{Deserialize, Serialize};

/// Side this client is authorized to move for
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    White,
    Black,
    #[default]
    Spectator,
}

impl Role {
    /// Color this role plays, `None` for spectators
    pub fn color(self) -> Option<PieceColor> {
        match self {
            Role::White => Some(PieceColor::White),
            Role::Black => Some(PieceColor::Black),
            Role::Spectator => None,
        }
    }
}

impl From<PieceColor> for Role {
    fn from(color: PieceColor) -> Self {
        match color {
            PieceColor::White => Role::White,
            PieceColor::Black => Role::Black,
        }
    }
}

/// How the board is drawn for this client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// White at the bottom
    Normal,
    /// Black at the bottom
    Flipped,
}

#[derive(Debug, Default, Clone)]
pub struct RoleAuthority {
    role: Role,
    changed: bool,
}

impl RoleAuthority {
    pub fn role(&self) -> Role {
        self.role
    }

    /// Store a new role and mark derived permissions stale
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.changed = true;
    }

    /// Whether derived permission state must be recomputed; clears the flag
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// A piece may be dragged only by the player who owns its color
    pub fn can_drag(&self, piece_color: PieceColor) -> bool {
        self.role.color() == Some(piece_color)
    }

    pub fn board_orientation(&self) -> Orientation {
        match self.role {
            Role::Black => Orientation::Flipped,
            Role::White | Role::Spectator => Orientation::Normal,
        }
    }
}

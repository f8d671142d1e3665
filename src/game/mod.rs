//! Game module - client-side game state and synchronization
//!
//! # Module Organization
//!
//! - `types` - squares, pieces and the wire move
//! - `role` - role authority (who may drag what, board orientation)
//! - `position` - position state wrapping the rules engine
//! - `captured` - append-only captured piece records
//! - `outcome` - terminal condition classification
//! - `coordinator` - the move coordinator state machine
//!
//! Control flow: a gesture reaches the coordinator, which checks the role
//! authority and the position, applies the move, forwards it and reports
//! what changed. Rendering is a projection of the resulting session.

pub mod captured;
pub mod coordinator;
pub mod outcome;
pub mod position;
pub mod role;
pub mod types;

pub use coordinator::{GameSession, MoveCoordinator, Phase, SessionEvent};
pub use outcome::GameOutcome;
pub use position::{MoveOutcome, MoveResult, PositionState};
pub use role::{Orientation, Role, RoleAuthority};
pub use types::{Move, Piece, PieceColor, PieceKind, Square};

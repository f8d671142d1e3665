//! Move coordinator
//!
//! Drives one client session. Local gestures and inbound server messages are
//! the only two event sources; both are handled synchronously on the caller's
//! thread and every handler returns the [`SessionEvent`]s the presentation
//! layer should react to.
//!
//! # Phases
//!
//! ```text
//! AwaitingRole ──role message──▶ Active ──checkmate──▶ Terminated
//! ```
//!
//! - `AwaitingRole`: local moves are ignored, remote updates are applied.
//! - `Active`: local moves for the assigned color are applied and forwarded.
//!   Remote moves are applied and never forwarded again.
//! - `Terminated`: local moves are ignored. Remote moves and board states are
//!   still applied for display, without further transitions.
//!
//! Only checkmate terminates. Stalemate and draws are reported through
//! [`SessionEvent::Outcome`] and leave the session open.

use crate::game::outcome::GameOutcome;
use crate::game::position::{MoveOutcome, MoveResult, PositionState};
use crate::game::role::{Role, RoleAuthority};
use crate::game::types::{Move, PieceColor, Square};
use crate::networking::protocol::{ClientMessage, ServerMessage};
use crate::networking::transport::Transport;
use tracing::{debug, info, warn};

/// Everything one client knows about the game
///
/// Rendering borrows this; only the coordinator mutates it.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    position: PositionState,
    role: RoleAuthority,
}

impl GameSession {
    pub fn new(position: PositionState) -> Self {
        Self {
            position,
            role: RoleAuthority::default(),
        }
    }

    pub fn position(&self) -> &PositionState {
        &self.position
    }

    pub fn role(&self) -> &RoleAuthority {
        &self.role
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    AwaitingRole,
    Active,
    /// The game ended by checkmate; `winner` is the color that mated
    Terminated { winner: PieceColor },
}

/// What the presentation layer should react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Position or phase changed, draw the board again
    Redraw,
    /// Role changed, drag permissions and orientation must be recomputed
    PermissionsChanged,
    /// A captured-piece list grew
    CapturesChanged,
    /// Classification after an applied move
    Outcome(GameOutcome),
    /// End-of-game notice from the server peer
    GameOver { winner: PieceColor },
}

pub struct MoveCoordinator<T: Transport> {
    session: GameSession,
    phase: Phase,
    /// Square of the piece currently being dragged
    drag_source: Option<Square>,
    transport: T,
}

impl<T: Transport> MoveCoordinator<T> {
    pub fn new(transport: T) -> Self {
        Self::with_session(GameSession::default(), transport)
    }

    pub fn with_session(session: GameSession, transport: T) -> Self {
        Self {
            session,
            phase: Phase::AwaitingRole,
            drag_source: None,
            transport,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated { .. })
    }

    pub fn drag_source(&self) -> Option<Square> {
        self.drag_source
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Begin dragging the piece on grid square `(row, col)`
    ///
    /// Returns `false` when there is no piece there or this client may not
    /// move it.
    pub fn drag_start(&mut self, row: u8, col: u8) -> bool {
        self.drag_source = None;
        let Some(square) = Square::from_grid(row, col) else {
            return false;
        };
        if !self.may_move_from(square) {
            return false;
        }
        self.drag_source = Some(square);
        true
    }

    pub fn drag_end(&mut self) {
        self.drag_source = None;
    }

    /// Drop the dragged piece on grid square `(row, col)`
    pub fn drop_on(&mut self, row: u8, col: u8) -> Vec<SessionEvent> {
        let Some(source) = self.drag_source.take() else {
            return Vec::new();
        };
        let source = source.to_grid();
        self.submit_move(source, (row, col))
    }

    /// Attempt a local move between two grid squares
    ///
    /// Illegal or unauthorized attempts change nothing and are not reported
    /// beyond a redraw.
    pub fn submit_move(&mut self, source: (u8, u8), target: (u8, u8)) -> Vec<SessionEvent> {
        let Some(mv) = Move::from_grid(source, target) else {
            debug!("[COORDINATOR] Ignoring off-board gesture {:?} -> {:?}", source, target);
            return Vec::new();
        };
        if !self.may_move_from(mv.from) {
            debug!("[COORDINATOR] Ignoring local move {} ({:?})", mv, self.phase);
            return Vec::new();
        }

        let mut events = Vec::new();
        match self.session.position.apply_move(&mv) {
            MoveOutcome::Rejected => {
                debug!("[COORDINATOR] Illegal local move {}", mv);
            }
            MoveOutcome::Applied(result) => {
                info!("[COORDINATOR] Local move {}", mv);
                self.forward(ClientMessage::Move(mv));
                self.record(&result, &mut events);

                if result.outcome.is_checkmate() {
                    self.claim_checkmate();
                }
            }
        }
        events.push(SessionEvent::Redraw);
        events
    }

    /// Dispatch one inbound message
    pub fn handle_message(&mut self, message: ServerMessage) -> Vec<SessionEvent> {
        debug!("[COORDINATOR] Inbound {}", message.event_name());
        let mut events = Vec::new();
        match message {
            ServerMessage::Move(mv) => match self.session.position.apply_move(&mv) {
                MoveOutcome::Applied(result) => {
                    info!("[COORDINATOR] Remote move {}", mv);
                    self.record(&result, &mut events);
                }
                MoveOutcome::Rejected => {
                    // local and remote positions may have diverged
                    warn!("[COORDINATOR] Remote move {} does not apply here", mv);
                }
            },
            ServerMessage::PlayerRole(color) => {
                self.assign_role(Role::from(color), &mut events);
            }
            ServerMessage::SpectatorRole => {
                self.assign_role(Role::Spectator, &mut events);
            }
            ServerMessage::BoardState(fen) => {
                if let Err(e) = self.session.position.load_fen(&fen) {
                    warn!("[COORDINATOR] Ignoring board state: {}", e);
                }
            }
            ServerMessage::Checkmate(winner) => {
                info!("[COORDINATOR] {} wins by checkmate", winner.name());
                self.phase = Phase::Terminated { winner };
                self.drag_source = None;
                events.push(SessionEvent::GameOver { winner });
            }
        }
        events.push(SessionEvent::Redraw);
        events
    }

    /// Decode a JSON frame and dispatch it; undecodable frames are dropped
    pub fn handle_frame(&mut self, frame: &str) -> Vec<SessionEvent> {
        match ServerMessage::from_json(frame) {
            Ok(message) => self.handle_message(message),
            Err(e) => {
                warn!("[COORDINATOR] Dropping frame {}: {}", frame, e);
                Vec::new()
            }
        }
    }

    fn may_move_from(&self, square: Square) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        self.session
            .position
            .piece_at(square)
            .is_some_and(|piece| self.session.role.can_drag(piece.color))
    }

    fn assign_role(&mut self, role: Role, events: &mut Vec<SessionEvent>) {
        info!("[COORDINATOR] Assigned role {:?}", role);
        self.session.role.set_role(role);
        self.drag_source = None;
        if self.phase == Phase::AwaitingRole {
            self.phase = Phase::Active;
        }
        if self.session.role.take_changed() {
            events.push(SessionEvent::PermissionsChanged);
        }
    }

    /// Capture bookkeeping comes before any terminal transition
    fn record(&mut self, result: &MoveResult, events: &mut Vec<SessionEvent>) {
        if let Some(kind) = result.captured {
            self.session.position.record_capture(result.color, kind);
            events.push(SessionEvent::CapturesChanged);
        }
        events.push(SessionEvent::Outcome(result.outcome));
    }

    fn claim_checkmate(&mut self) {
        let Some(winner) = self.session.role.role().color() else {
            return;
        };
        info!("[COORDINATOR] Checkmate delivered, claiming win for {}", winner.name());
        self.forward(ClientMessage::Checkmate(winner));
        self.phase = Phase::Terminated { winner };
    }

    fn forward(&mut self, message: ClientMessage) {
        if let Err(e) = self.transport.send(message) {
            warn!("[COORDINATOR] Failed to send: {}", e);
        }
    }
}

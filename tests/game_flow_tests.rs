//! Game Flow Integration Tests
//!
//! Drives real client sessions through the in-process relay:
//! - Role assignment and permissions
//! - Local moves reaching the opponent
//! - Capture bookkeeping on both clients
//! - Checkmate termination and the end-of-game notice

use duelboard::game::{
    GameOutcome, MoveCoordinator, Orientation, Phase, PieceColor, PieceKind, PositionState, Role,
    SessionEvent, Square,
};
use duelboard::networking::{ChannelTransport, LocalRelay, ServerMessage};
use crossbeam_channel::Receiver;

struct Client {
    coordinator: MoveCoordinator<ChannelTransport>,
    inbox: Receiver<String>,
    events: Vec<SessionEvent>,
}

struct Table {
    relay: LocalRelay,
    clients: Vec<Client>,
}

impl Table {
    fn with_clients(count: usize) -> Self {
        let mut relay = LocalRelay::default();
        let clients = (0..count)
            .map(|_| {
                let connection = relay.connect();
                Client {
                    coordinator: MoveCoordinator::new(connection.transport),
                    inbox: connection.inbox,
                    events: Vec::new(),
                }
            })
            .collect();
        let mut table = Self { relay, clients };
        table.settle();
        table
    }

    fn settle(&mut self) {
        loop {
            let mut handled = self.relay.pump();
            for client in &mut self.clients {
                let frames: Vec<String> = client.inbox.try_iter().collect();
                handled += frames.len();
                for frame in frames {
                    let produced = client.coordinator.handle_frame(&frame);
                    client.events.extend(produced);
                }
            }
            if handled == 0 {
                break;
            }
        }
    }

    /// Drag `text[0..2]` to `text[2..4]` on client `index`, then deliver
    fn drag(&mut self, index: usize, text: &str) -> Vec<SessionEvent> {
        let from = Square::from_algebraic(&text[0..2]).unwrap().to_grid();
        let to = Square::from_algebraic(&text[2..4]).unwrap().to_grid();
        let coordinator = &mut self.clients[index].coordinator;
        let events = if coordinator.drag_start(from.0, from.1) {
            coordinator.drop_on(to.0, to.1)
        } else {
            Vec::new()
        };
        self.settle();
        events
    }

    fn client(&self, index: usize) -> &MoveCoordinator<ChannelTransport> {
        &self.clients[index].coordinator
    }
}

const WHITE: usize = 0;
const BLACK: usize = 1;
const WATCHER: usize = 2;

// ============================================================================
// Role Assignment Tests
// ============================================================================

#[test]
fn test_roles_assigned_in_connection_order() {
    let table = Table::with_clients(3);

    assert_eq!(table.client(WHITE).session().role().role(), Role::White);
    assert_eq!(table.client(BLACK).session().role().role(), Role::Black);
    assert_eq!(table.client(WATCHER).session().role().role(), Role::Spectator);
    for index in [WHITE, BLACK, WATCHER] {
        assert_eq!(table.client(index).phase(), Phase::Active);
    }
}

#[test]
fn test_black_orientation_and_permissions() {
    //! Black sees a flipped board and cannot pick up White pieces
    let mut table = Table::with_clients(2);
    let black = table.client(BLACK).session().role();

    assert_eq!(black.board_orientation(), Orientation::Flipped);
    assert!(!black.can_drag(PieceColor::White));
    assert!(black.can_drag(PieceColor::Black));

    let (row, col) = Square::from_algebraic("e2").unwrap().to_grid();
    assert!(!table.clients[BLACK].coordinator.drag_start(row, col));
}

#[test]
fn test_spectator_cannot_move() {
    let mut table = Table::with_clients(3);
    let events = table.drag(WATCHER, "e2e4");

    assert!(events.is_empty());
    assert_eq!(table.relay.position().turn(), PieceColor::White);
}

// ============================================================================
// Move Synchronization Tests
// ============================================================================

#[test]
fn test_opening_move_reaches_everyone() {
    //! e2e4 from White: accepted, no capture, outcome Ongoing, orientation unchanged
    let mut table = Table::with_clients(3);
    let events = table.drag(WHITE, "e2e4");

    assert_eq!(
        events,
        vec![SessionEvent::Outcome(GameOutcome::Ongoing), SessionEvent::Redraw]
    );
    assert_eq!(
        table.client(WHITE).session().role().board_orientation(),
        Orientation::Normal
    );

    let expected = table.relay.position().fen();
    for index in [WHITE, BLACK, WATCHER] {
        assert_eq!(table.client(index).session().position().fen(), expected);
        assert!(table
            .client(index)
            .session()
            .position()
            .captured()
            .by(PieceColor::White)
            .is_empty());
    }
}

#[test]
fn test_out_of_turn_drag_changes_nothing() {
    let mut table = Table::with_clients(2);
    let before = table.client(BLACK).session().position().fen();

    let events = table.drag(BLACK, "e7e5");
    assert_eq!(events, vec![SessionEvent::Redraw]);
    assert_eq!(table.client(BLACK).session().position().fen(), before);
    assert_eq!(table.relay.position().fen(), before);
}

#[test]
fn test_capture_recorded_once_on_both_clients() {
    //! The capturing color's record grows by exactly one on every client
    let mut table = Table::with_clients(3);
    table.drag(WHITE, "e2e4");
    table.drag(BLACK, "d7d5");
    table.drag(WHITE, "e4d5");

    for index in [WHITE, BLACK, WATCHER] {
        let captured = table.client(index).session().position().captured();
        assert_eq!(captured.by(PieceColor::White), &[PieceKind::Pawn]);
        assert!(captured.by(PieceColor::Black).is_empty());
    }
    assert!(table.clients[BLACK]
        .events
        .contains(&SessionEvent::CapturesChanged));
}

#[test]
fn test_captured_records_only_grow() {
    let mut table = Table::with_clients(2);
    let moves = [
        (WHITE, "e2e4"),
        (BLACK, "d7d5"),
        (WHITE, "e4d5"),
        (BLACK, "d8d5"),
        (WHITE, "b1c3"),
        (BLACK, "d5a2"),
        (WHITE, "a1a2"),
    ];

    let mut previous = (0, 0);
    for (index, text) in moves {
        table.drag(index, text);
        let captured = table.client(BLACK).session().position().captured();
        let lengths = (
            captured.by(PieceColor::White).len(),
            captured.by(PieceColor::Black).len(),
        );
        assert!(lengths.0 >= previous.0 && lengths.1 >= previous.1);
        previous = lengths;
    }

    let captured = table.client(BLACK).session().position().captured();
    assert_eq!(captured.by(PieceColor::White), &[PieceKind::Pawn, PieceKind::Queen]);
    assert_eq!(captured.by(PieceColor::Black), &[PieceKind::Pawn, PieceKind::Pawn]);
    assert_eq!(captured.material_advantage(), 8);
}

#[test]
fn test_incremental_moves_match_board_state_load() {
    let mut table = Table::with_clients(2);
    for (index, text) in [
        (WHITE, "g1f3"),
        (BLACK, "g8f6"),
        (WHITE, "g2g3"),
        (BLACK, "g7g6"),
        (WHITE, "f1g2"),
        (BLACK, "f8g7"),
        (WHITE, "e1g1"),
    ] {
        table.drag(index, text);
    }

    let played = table.client(BLACK).session().position();
    let loaded = PositionState::from_fen(&table.relay.position().fen()).unwrap();
    assert_eq!(played.grid(), loaded.grid());
    assert_eq!(played.turn(), PieceColor::Black);
}

// ============================================================================
// Checkmate Tests
// ============================================================================

#[test]
fn test_scholars_mate_terminates_everyone() {
    let mut table = Table::with_clients(3);
    for (index, text) in [
        (WHITE, "e2e4"),
        (BLACK, "e7e5"),
        (WHITE, "f1c4"),
        (BLACK, "b8c6"),
        (WHITE, "d1h5"),
        (BLACK, "g8f6"),
    ] {
        table.drag(index, text);
    }
    let events = table.drag(WHITE, "h5f7");

    assert!(events.contains(&SessionEvent::Outcome(GameOutcome::Checkmate(PieceColor::White))));
    assert_eq!(
        table.client(WHITE).session().position().classify_outcome(),
        GameOutcome::Checkmate(PieceColor::White)
    );
    for index in [WHITE, BLACK, WATCHER] {
        assert_eq!(
            table.client(index).phase(),
            Phase::Terminated {
                winner: PieceColor::White
            }
        );
        assert!(table.clients[index].events.contains(&SessionEvent::GameOver {
            winner: PieceColor::White
        }));
    }

    // further submissions are no-ops
    let before = table.relay.position().fen();
    assert!(table.drag(BLACK, "e8e7").is_empty());
    assert!(table.drag(WHITE, "c4f7").is_empty());
    assert_eq!(table.relay.position().fen(), before);
}

#[test]
fn test_inbound_checkmate_uses_payload_winner() {
    //! The notice names the color from the message, not a local classification
    let mut coordinator = MoveCoordinator::new(duelboard::networking::RecordingTransport::default());
    coordinator.handle_message(ServerMessage::PlayerRole(PieceColor::White));
    let events = coordinator.handle_message(ServerMessage::Checkmate(PieceColor::Black));

    assert_eq!(
        coordinator.session().position().classify_outcome(),
        GameOutcome::Ongoing
    );
    assert!(events.contains(&SessionEvent::GameOver {
        winner: PieceColor::Black
    }));
    assert_eq!(
        coordinator.phase(),
        Phase::Terminated {
            winner: PieceColor::Black
        }
    );
}

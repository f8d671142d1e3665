//! Position state
//!
//! Owns the current position and the captured-piece records. Legality and
//! terminal conditions are delegated to the `shakmaty` rules engine; this
//! module never edits the board by hand. The position is always either the
//! initial setup, a loaded snapshot, or the result of engine-validated moves
//! applied to one of those.

use crate::core::error::{SyncError, SyncResult};
use crate::game::captured::CapturedPieces;
use crate::game::outcome::GameOutcome;
use crate::game::types::{Move, Piece, PieceColor, PieceKind, Square};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position, PositionError};
use tracing::{debug, info};

/// Read-only 8×8 view, row 0 is rank 8 and column 0 is file a
pub type Grid = [[Option<Piece>; 8]; 8];

/// Data carried by an accepted move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    /// The move as it was requested
    pub mv: Move,
    /// Color of the side that moved
    pub color: PieceColor,
    /// Kind of the piece taken, including en passant
    pub captured: Option<PieceKind>,
    /// Classification of the position after the move
    pub outcome: GameOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied(MoveResult),
    /// The rules engine refused the move; nothing changed
    Rejected,
}

#[derive(Debug, Clone)]
pub struct PositionState {
    chess: Chess,
    captured: CapturedPieces,
    /// Repetition keys of every position since the last load, current last
    repetitions: Vec<String>,
}

impl Default for PositionState {
    fn default() -> Self {
        Self::from_chess(Chess::default())
    }
}

impl PositionState {
    /// Start from a FEN snapshot instead of the initial setup
    pub fn from_fen(fen: &str) -> SyncResult<Self> {
        Ok(Self::from_chess(parse_fen(fen)?))
    }

    fn from_chess(chess: Chess) -> Self {
        let key = repetition_key(&chess);
        Self {
            chess,
            captured: CapturedPieces::default(),
            repetitions: vec![key],
        }
    }

    /// Try to play `mv`; rejected moves leave the position untouched
    pub fn apply_move(&mut self, mv: &Move) -> MoveOutcome {
        let from = mv.from.to_engine();
        let to = mv.to.to_engine();

        let legal = self.chess.legal_moves();
        let Some(engine_move) = legal
            .iter()
            .find(|m| matches_request(m, from, to, mv.promotion))
        else {
            debug!("[POSITION] Rejected illegal move {}", mv);
            return MoveOutcome::Rejected;
        };

        let color = PieceColor::from_engine(self.chess.turn());
        let captured = engine_move.capture().map(PieceKind::from_engine);

        self.chess.play_unchecked(engine_move);
        self.repetitions.push(repetition_key(&self.chess));

        let outcome = self.classify_outcome();
        debug!(
            "[POSITION] {} played {} (capture: {:?}, outcome: {:?})",
            color.name(),
            mv,
            captured,
            outcome
        );

        MoveOutcome::Applied(MoveResult {
            mv: *mv,
            color,
            captured,
            outcome,
        })
    }

    /// Replace the whole position with an authoritative snapshot
    ///
    /// Move history is not checked. Castling rights without the pieces to
    /// back them and an en passant square without a double push are dropped
    /// rather than refused. Only text that does not parse, or a board the
    /// engine cannot hold at all (such as a missing king), is reported; the
    /// current position is then kept.
    pub fn load_fen(&mut self, fen: &str) -> SyncResult<()> {
        let chess = parse_fen(fen)?;
        if fen_of(&chess) == self.fen() {
            // already there, keep the repetition history
            debug!("[POSITION] Board state matches current position");
            return Ok(());
        }
        self.repetitions.clear();
        self.repetitions.push(repetition_key(&chess));
        self.chess = chess;
        info!("[POSITION] Loaded board state {}", fen);
        Ok(())
    }

    /// Classify the current position
    ///
    /// Checkmate → stalemate → draw → check → ongoing.
    pub fn classify_outcome(&self) -> GameOutcome {
        if self.chess.is_checkmate() {
            let loser = PieceColor::from_engine(self.chess.turn());
            GameOutcome::Checkmate(loser.opposite())
        } else if self.chess.is_stalemate() {
            GameOutcome::Stalemate
        } else if self.chess.is_insufficient_material()
            || self.chess.halfmoves() >= 100
            || self.is_threefold_repetition()
        {
            GameOutcome::Draw
        } else if self.chess.is_check() {
            GameOutcome::Check
        } else {
            GameOutcome::Ongoing
        }
    }

    pub fn record_capture(&mut self, captor: PieceColor, kind: PieceKind) {
        self.captured.record(captor, kind);
    }

    pub fn captured(&self) -> &CapturedPieces {
        &self.captured
    }

    pub fn turn(&self) -> PieceColor {
        PieceColor::from_engine(self.chess.turn())
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.chess
            .board()
            .piece_at(square.to_engine())
            .map(Piece::from_engine)
    }

    pub fn grid(&self) -> Grid {
        let mut grid = [[None; 8]; 8];
        for (row, cells) in grid.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                if let Some(square) = Square::from_grid(row as u8, col as u8) {
                    *cell = self.piece_at(square);
                }
            }
        }
        grid
    }

    pub fn fen(&self) -> String {
        fen_of(&self.chess)
    }

    fn is_threefold_repetition(&self) -> bool {
        let Some(current) = self.repetitions.last() else {
            return false;
        };
        self.repetitions.iter().filter(|key| *key == current).count() >= 3
    }
}

fn parse_fen(fen: &str) -> SyncResult<Chess> {
    let invalid = |message: String| SyncError::InvalidFen {
        fen: fen.to_string(),
        message,
    };
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|e: shakmaty::fen::ParseFenError| invalid(e.to_string()))?;
    // castling flags, en passant square, material and checks are taken as given
    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .or_else(PositionError::ignore_invalid_castling_rights)
        .or_else(PositionError::ignore_invalid_ep_square)
        .or_else(PositionError::ignore_too_much_material)
        .or_else(PositionError::ignore_impossible_check)
        .map_err(|e| invalid(e.to_string()))
}

fn fen_of(chess: &Chess) -> String {
    Fen::from_position(chess.clone(), EnPassantMode::Legal).to_string()
}

/// Placement, side to move, castling rights and en passant square
fn repetition_key(chess: &Chess) -> String {
    fen_of(chess)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Does a legal engine move correspond to the requested from/to pair?
///
/// Castling is requested as a two-square king move, the engine encodes it
/// as king-takes-rook.
fn matches_request(
    candidate: &shakmaty::Move,
    from: shakmaty::Square,
    to: shakmaty::Square,
    promotion: Option<PieceKind>,
) -> bool {
    let (move_from, move_to) = match candidate {
        shakmaty::Move::Normal {
            from: origin,
            to: target,
            ..
        } => (*origin, *target),
        shakmaty::Move::EnPassant {
            from: origin,
            to: target,
        } => (*origin, *target),
        shakmaty::Move::Castle { king, rook } => {
            let king_side = rook.file() > king.file();
            let file = if king_side {
                shakmaty::File::G
            } else {
                shakmaty::File::C
            };
            (*king, shakmaty::Square::from_coords(file, king.rank()))
        }
        shakmaty::Move::Put { .. } => return false,
    };

    if move_from != from || move_to != to {
        return false;
    }

    match candidate.promotion() {
        None => true,
        Some(role) => role == promotion.unwrap_or(PieceKind::Queen).to_engine(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(text: &str) -> Move {
        Move::from_coordinate(text).unwrap()
    }

    fn play(position: &mut PositionState, moves: &[&str]) -> Vec<MoveResult> {
        moves
            .iter()
            .map(|text| match position.apply_move(&mv(text)) {
                MoveOutcome::Applied(result) => result,
                MoveOutcome::Rejected => panic!("{} should be legal", text),
            })
            .collect()
    }

    fn sq(text: &str) -> Square {
        Square::from_algebraic(text).unwrap()
    }

    #[test]
    fn test_initial_position() {
        let position = PositionState::default();
        assert_eq!(position.turn(), PieceColor::White);
        assert_eq!(
            position.piece_at(sq("e1")),
            Some(Piece::new(PieceKind::King, PieceColor::White))
        );
        assert_eq!(
            position.grid()[0][3],
            Some(Piece::new(PieceKind::Queen, PieceColor::Black))
        );
        assert_eq!(position.classify_outcome(), GameOutcome::Ongoing);
    }

    #[test]
    fn test_pawn_push_accepted() {
        let mut position = PositionState::default();
        let result = play(&mut position, &["e2e4"]).remove(0);

        assert_eq!(result.color, PieceColor::White);
        assert_eq!(result.captured, None);
        assert_eq!(result.outcome, GameOutcome::Ongoing);
        assert_eq!(position.piece_at(sq("e2")), None);
        assert_eq!(
            position.piece_at(sq("e4")),
            Some(Piece::new(PieceKind::Pawn, PieceColor::White))
        );
        assert_eq!(position.turn(), PieceColor::Black);
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut position = PositionState::default();
        let grid_before = position.grid();
        let fen_before = position.fen();

        for text in ["e2e5", "e7e5", "g1g3", "a1a8", "e1g1"] {
            assert_eq!(position.apply_move(&mv(text)), MoveOutcome::Rejected);
        }

        assert_eq!(position.grid(), grid_before);
        assert_eq!(position.fen(), fen_before);
        assert_eq!(position.turn(), PieceColor::White);
    }

    #[test]
    fn test_capture_reported() {
        let mut position = PositionState::default();
        let results = play(&mut position, &["e2e4", "d7d5", "e4d5"]);
        assert_eq!(results[2].captured, Some(PieceKind::Pawn));
        assert_eq!(results[2].color, PieceColor::White);
    }

    #[test]
    fn test_en_passant_capture_reported() {
        let mut position = PositionState::default();
        let results = play(&mut position, &["e2e4", "a7a6", "e4e5", "d7d5", "e5d6"]);
        assert_eq!(results[4].captured, Some(PieceKind::Pawn));
        assert_eq!(position.piece_at(sq("d5")), None);
    }

    #[test]
    fn test_castling_as_king_two_squares() {
        let mut position = PositionState::default();
        play(&mut position, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"]);
        assert_eq!(
            position.piece_at(sq("g1")),
            Some(Piece::new(PieceKind::King, PieceColor::White))
        );
        assert_eq!(
            position.piece_at(sq("f1")),
            Some(Piece::new(PieceKind::Rook, PieceColor::White))
        );
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let mut position = PositionState::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let request = Move {
            from: sq("a7"),
            to: sq("a8"),
            promotion: None,
        };
        assert!(matches!(position.apply_move(&request), MoveOutcome::Applied(_)));
        assert_eq!(
            position.piece_at(sq("a8")),
            Some(Piece::new(PieceKind::Queen, PieceColor::White))
        );
    }

    #[test]
    fn test_promotion_kind_is_honored() {
        let mut position = PositionState::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        play(&mut position, &["a7a8n"]);
        assert_eq!(
            position.piece_at(sq("a8")),
            Some(Piece::new(PieceKind::Knight, PieceColor::White))
        );
    }

    #[test]
    fn test_check_classification() {
        let mut position = PositionState::default();
        let results = play(&mut position, &["e2e4", "f7f6", "d1h5"]);
        assert_eq!(results[2].outcome, GameOutcome::Check);
    }

    #[test]
    fn test_checkmate_classification() {
        let mut position = PositionState::default();
        let results = play(
            &mut position,
            &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"],
        );
        assert_eq!(results[6].captured, Some(PieceKind::Pawn));
        assert_eq!(results[6].outcome, GameOutcome::Checkmate(PieceColor::White));
        assert_eq!(
            position.classify_outcome(),
            GameOutcome::Checkmate(PieceColor::White)
        );
    }

    #[test]
    fn test_stalemate_classification() {
        let position = PositionState::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(position.classify_outcome(), GameOutcome::Stalemate);
    }

    #[test]
    fn test_insufficient_material_is_draw() {
        let position = PositionState::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(position.classify_outcome(), GameOutcome::Draw);
    }

    #[test]
    fn test_fifty_move_rule_is_draw() {
        let mut position = PositionState::from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 99 80").unwrap();
        assert_eq!(position.classify_outcome(), GameOutcome::Ongoing);
        let results = play(&mut position, &["a1a2"]);
        assert_eq!(results[0].outcome, GameOutcome::Draw);
    }

    #[test]
    fn test_threefold_repetition_is_draw() {
        let mut position = PositionState::default();
        let results = play(
            &mut position,
            &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"],
        );
        assert_eq!(results[3].outcome, GameOutcome::Ongoing);
        assert_eq!(results[7].outcome, GameOutcome::Draw);
    }

    #[test]
    fn test_load_fen_replaces_position() {
        let mut position = PositionState::default();
        position
            .load_fen("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
            .unwrap();
        assert_eq!(position.turn(), PieceColor::White);
        assert_eq!(position.piece_at(sq("e7")), None);
        assert_eq!(
            position.piece_at(sq("e5")),
            Some(Piece::new(PieceKind::Pawn, PieceColor::Black))
        );
    }

    #[test]
    fn test_invalid_fen_keeps_position() {
        let mut position = PositionState::default();
        let before = position.fen();

        let err = position.load_fen("not a board").unwrap_err();
        assert!(matches!(err, SyncError::InvalidFen { .. }));
        assert_eq!(position.fen(), before);
    }

    #[test]
    fn test_load_fen_drops_unbacked_castling_rights() {
        let mut position = PositionState::default();
        position.load_fen("4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1").unwrap();

        assert_eq!(position.piece_at(sq("a1")), None);
        assert_eq!(
            position.piece_at(sq("e8")),
            Some(Piece::new(PieceKind::King, PieceColor::Black))
        );
        assert_eq!(position.fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(position.classify_outcome(), GameOutcome::Draw);
    }

    #[test]
    fn test_load_fen_drops_stale_en_passant_square() {
        let mut position =
            PositionState::from_fen("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        position
            .load_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e6 0 1")
            .unwrap();

        assert_eq!(position.grid(), PositionState::default().grid());
        assert_eq!(position.fen(), PositionState::default().fen());
    }

    #[test]
    fn test_load_fen_without_king_is_refused() {
        let mut position = PositionState::default();
        let err = position.load_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap_err();
        assert!(matches!(err, SyncError::InvalidFen { .. }));
        assert_eq!(position.fen(), PositionState::default().fen());
    }

    #[test]
    fn test_moves_match_equivalent_load() {
        let moves = ["d2d4", "g8f6", "c2c4", "e7e6", "b1c3", "f8b4", "e2e3", "e8g8"];
        let mut played = PositionState::default();
        play(&mut played, &moves);

        let mut loaded = PositionState::default();
        loaded.load_fen(&played.fen()).unwrap();

        assert_eq!(loaded.grid(), played.grid());
        assert_eq!(loaded.turn(), played.turn());
        assert_eq!(loaded.fen(), played.fen());
    }

    #[test]
    fn test_record_capture_appends() {
        let mut position = PositionState::default();
        position.record_capture(PieceColor::Black, PieceKind::Bishop);
        position.record_capture(PieceColor::Black, PieceKind::Pawn);
        assert_eq!(
            position.captured().by(PieceColor::Black),
            &[PieceKind::Bishop, PieceKind::Pawn]
        );
    }
}

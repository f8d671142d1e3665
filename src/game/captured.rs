//! Captured pieces tracking
//!
//! One append-only list per captor color. Lists only grow within a session;
//! they are never reordered or truncated, a new session starts a new record.
//!
//! # Material Values
//!
//! Standard piece values in pawns: Pawn 1, Knight/Bishop 3, Rook 5, Queen 9,
//! King 0 (never captured). Positive advantage means White is ahead.

use crate::game::types::{PieceColor, PieceKind};

/// Pieces captured by each side, in capture order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapturedPieces {
    /// Black pieces taken by White
    white_captured: Vec<PieceKind>,
    /// White pieces taken by Black
    black_captured: Vec<PieceKind>,
}

impl CapturedPieces {
    /// Record that `captor` took a piece of kind `kind`
    pub fn record(&mut self, captor: PieceColor, kind: PieceKind) {
        match captor {
            PieceColor::White => self.white_captured.push(kind),
            PieceColor::Black => self.black_captured.push(kind),
        }
    }

    /// Pieces taken by `captor`, oldest first
    pub fn by(&self, captor: PieceColor) -> &[PieceKind] {
        match captor {
            PieceColor::White => &self.white_captured,
            PieceColor::Black => &self.black_captured,
        }
    }

    /// Material difference in pawn units
    pub fn material_advantage(&self) -> i32 {
        let white_score: i32 = self.white_captured.iter().map(|p| piece_value(*p)).sum();
        let black_score: i32 = self.black_captured.iter().map(|p| piece_value(*p)).sum();
        white_score - black_score
    }
}

fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 1,
        PieceKind::Knight => 3,
        PieceKind::Bishop => 3,
        PieceKind::Rook => 5,
        PieceKind::Queen => 9,
        PieceKind::King => 0,
    }
}

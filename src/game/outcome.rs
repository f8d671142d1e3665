//! Game outcome classification
//!
//! [`GameOutcome`] is derived from the position after every move and never
//! stored. Only checkmate ends a session; stalemate and draws are reported
//! for display and leave move submission open.
//!
//! # Classification Order
//!
//! ```text
//! Checkmate → Stalemate → Draw → Check → Ongoing
//! ```
//!
//! A mated king is always also in check; checkmate wins that tie.

use crate::game::types::PieceColor;

/// Classification of the current position
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// Play continues, side to move is not in check
    #[default]
    Ongoing,

    /// Side to move is in check but has a legal reply
    Check,

    /// Side to move is mated; carries the winning color
    Checkmate(PieceColor),

    /// Side to move has no legal moves and is not in check
    Stalemate,

    /// Insufficient material, fifty-move rule or threefold repetition
    Draw,
}

impl GameOutcome {
    pub fn is_checkmate(&self) -> bool {
        matches!(self, GameOutcome::Checkmate(_))
    }

    /// Human-readable status line
    pub fn message(&self) -> &'static str {
        match self {
            GameOutcome::Ongoing => "Game in progress",
            GameOutcome::Check => "Check!",
            GameOutcome::Checkmate(PieceColor::White) => "White wins by checkmate!",
            GameOutcome::Checkmate(PieceColor::Black) => "Black wins by checkmate!",
            GameOutcome::Stalemate => "Draw by stalemate",
            GameOutcome::Draw => "Draw",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ongoing() {
        let outcome = GameOutcome::default();
        assert_eq!(outcome, GameOutcome::Ongoing);
        assert!(!outcome.is_checkmate());
    }

    #[test]
    fn test_only_checkmate_is_checkmate() {
        assert!(GameOutcome::Checkmate(PieceColor::White).is_checkmate());
        assert!(!GameOutcome::Check.is_checkmate());
        assert!(!GameOutcome::Stalemate.is_checkmate());
        assert!(!GameOutcome::Draw.is_checkmate());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            GameOutcome::Checkmate(PieceColor::Black).message(),
            "Black wins by checkmate!"
        );
        assert_eq!(GameOutcome::Stalemate.message(), "Draw by stalemate");
    }
}

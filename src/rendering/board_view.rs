//! Board projection
//!
//! Pure function of a [`GameSession`] and the coordinator [`Phase`]. Holds no
//! state of its own; build a new view after every [`SessionEvent::Redraw`].
//!
//! [`SessionEvent::Redraw`]: crate::game::coordinator::SessionEvent::Redraw

use crate::core::settings::{ClientSettings, PieceStyle};
use crate::game::coordinator::{GameSession, Phase};
use crate::game::role::{Orientation, Role};
use crate::game::types::{Piece, PieceColor, Square};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareView {
    pub square: Square,
    pub piece: Option<Piece>,
    /// `(row + col)` even on the unflipped grid
    pub light: bool,
    /// The piece here may be picked up by this client
    pub draggable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub orientation: Orientation,
    /// Rows top to bottom as seen by this client
    pub rows: Vec<Vec<SquareView>>,
    /// Black pieces taken by White
    pub white_captured: Vec<Piece>,
    /// White pieces taken by Black
    pub black_captured: Vec<Piece>,
    /// Captured material in pawn units, positive when White is ahead
    pub material: i32,
    pub status: String,
}

impl BoardView {
    pub fn project(session: &GameSession, phase: Phase) -> Self {
        let authority = session.role();
        let orientation = authority.board_orientation();
        let grid = session.position().grid();
        let accepting_input = phase == Phase::Active;

        let mut rows = Vec::with_capacity(8);
        for row in 0..8u8 {
            let mut cells = Vec::with_capacity(8);
            for col in 0..8u8 {
                let Some(square) = Square::from_grid(row, col) else {
                    continue;
                };
                let piece = grid[row as usize][col as usize];
                cells.push(SquareView {
                    square,
                    piece,
                    light: (row + col) % 2 == 0,
                    draggable: accepting_input
                        && piece.is_some_and(|p| authority.can_drag(p.color)),
                });
            }
            rows.push(cells);
        }

        if orientation == Orientation::Flipped {
            rows.reverse();
            for cells in &mut rows {
                cells.reverse();
            }
        }

        let captured = session.position().captured();
        let taken = |captor: PieceColor| -> Vec<Piece> {
            captured
                .by(captor)
                .iter()
                .map(|kind| Piece::new(*kind, captor.opposite()))
                .collect()
        };

        Self {
            orientation,
            rows,
            white_captured: taken(PieceColor::White),
            black_captured: taken(PieceColor::Black),
            material: captured.material_advantage(),
            status: status_line(session, phase),
        }
    }

    /// Plain-text rendering for terminals
    pub fn render_text(&self, settings: &ClientSettings) -> String {
        let mut out = String::new();
        for cells in &self.rows {
            if settings.show_coordinates {
                if let Some(first) = cells.first() {
                    let _ = write!(out, "{} ", first.square.rank.to_number());
                }
            }
            for cell in cells {
                let glyph = match cell.piece {
                    Some(piece) => glyph(piece, settings.piece_style),
                    None if cell.light => '·',
                    None => ' ',
                };
                out.push(glyph);
                out.push(' ');
            }
            out.truncate(out.trim_end().len());
            out.push('\n');
        }

        if settings.show_coordinates {
            if let Some(cells) = self.rows.last() {
                out.push_str("  ");
                for cell in cells {
                    out.push(cell.square.file.to_char());
                    out.push(' ');
                }
                out.truncate(out.trim_end().len());
                out.push('\n');
            }
        }

        if settings.show_captured {
            for (label, pieces) in [("White", &self.white_captured), ("Black", &self.black_captured)] {
                let list: String = pieces
                    .iter()
                    .map(|piece| glyph(*piece, settings.piece_style))
                    .collect();
                let _ = writeln!(out, "{} captured: {}", label, list);
            }
            let _ = writeln!(out, "Material: {}", material_line(self.material));
        }

        out.push_str(&self.status);
        out.push('\n');
        out
    }
}

fn glyph(piece: Piece, style: PieceStyle) -> char {
    match style {
        PieceStyle::Unicode => piece.symbol(),
        PieceStyle::Letters => piece.letter(),
    }
}

fn material_line(material: i32) -> String {
    match material {
        0 => "even".to_string(),
        m if m > 0 => format!("White +{}", m),
        m => format!("Black +{}", -m),
    }
}

fn status_line(session: &GameSession, phase: Phase) -> String {
    let role = match session.role().role() {
        Role::White => "You play White",
        Role::Black => "You play Black",
        Role::Spectator => "Spectating",
    };
    match phase {
        Phase::AwaitingRole => "Waiting for a seat".to_string(),
        Phase::Terminated { winner } => {
            format!("{}. {} wins by checkmate!", role, winner.name())
        }
        Phase::Active => {
            let outcome = session.position().classify_outcome();
            format!(
                "{}. {} to move. {}",
                role,
                session.position().turn().name(),
                outcome.message()
            )
        }
    }
}

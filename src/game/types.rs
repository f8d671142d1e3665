//! Board coordinates, pieces and the wire move
//!
//! Newtypes keep file/rank and grid row/column from being mixed up. Grid
//! coordinates are the rendered, unflipped board: row 0 is the top (rank 8)
//! and column 0 is the left (file a).

use crate::core::error::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board coordinate representing a file (column) on the chessboard
///
/// Values range from 0 (file 'a') to 7 (file 'h').
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct File(u8);

impl File {
    /// Create a file from a character ('a'..='h')
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(File(c as u8 - b'a')),
            _ => None,
        }
    }

    /// Convert file to character ('a'..='h')
    pub fn to_char(self) -> char {
        (b'a' + self.0) as char
    }
}

/// Board coordinate representing a rank (row) on the chessboard
///
/// Values range from 0 (rank 1) to 7 (rank 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(u8);

impl Rank {
    /// Create a rank from a number (1-8)
    pub fn from_number(n: u8) -> Option<Self> {
        if (1..=8).contains(&n) {
            Some(Rank(n - 1))
        } else {
            None
        }
    }

    /// Convert rank to number (1-8)
    pub fn to_number(self) -> u8 {
        self.0 + 1
    }
}

/// Board square (file, rank)
///
/// Serialized as algebraic text, e.g. `"e4"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    pub file: File,
    pub rank: Rank,
}

impl Square {
    /// Create a square from rendered grid coordinates
    ///
    /// `file = 'a' + col`, `rank = 8 - row`.
    pub fn from_grid(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Square {
                file: File(col),
                rank: Rank(7 - row),
            })
        } else {
            None
        }
    }

    /// Grid coordinates `(row, col)` of this square
    pub fn to_grid(self) -> (u8, u8) {
        (7 - self.rank.0, self.file.0)
    }

    /// Create a square from algebraic notation (e.g., "e4")
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file_char = chars.next()?;
        let rank_char = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let rank_num = rank_char.to_digit(10)? as u8;

        Some(Square {
            file: File::from_char(file_char)?,
            rank: Rank::from_number(rank_num)?,
        })
    }

    /// Convert square to algebraic notation (e.g., "e4")
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file.to_char(), self.rank.to_number())
    }

    pub(crate) fn to_engine(self) -> shakmaty::Square {
        shakmaty::Square::from_coords(
            shakmaty::File::new(u32::from(self.file.0)),
            shakmaty::Rank::new(u32::from(self.rank.0)),
        )
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file.to_char(), self.rank.to_number())
    }
}

impl TryFrom<String> for Square {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Square::from_algebraic(&value).ok_or(SyncError::InvalidSquare { input: value })
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_algebraic()
    }
}

/// Side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceColor {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl PieceColor {
    pub fn opposite(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceColor::White => "White",
            PieceColor::Black => "Black",
        }
    }

    pub(crate) fn from_engine(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => PieceColor::White,
            shakmaty::Color::Black => PieceColor::Black,
        }
    }
}

/// Kind of chess piece, serialized as its lowercase FEN letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    #[serde(rename = "p")]
    Pawn,
    #[serde(rename = "n")]
    Knight,
    #[serde(rename = "b")]
    Bishop,
    #[serde(rename = "r")]
    Rook,
    #[serde(rename = "q")]
    Queen,
    #[serde(rename = "k")]
    King,
}

impl PieceKind {
    /// Lowercase FEN letter
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub(crate) fn from_engine(role: shakmaty::Role) -> Self {
        match role {
            shakmaty::Role::Pawn => PieceKind::Pawn,
            shakmaty::Role::Knight => PieceKind::Knight,
            shakmaty::Role::Bishop => PieceKind::Bishop,
            shakmaty::Role::Rook => PieceKind::Rook,
            shakmaty::Role::Queen => PieceKind::Queen,
            shakmaty::Role::King => PieceKind::King,
        }
    }

    pub(crate) fn to_engine(self) -> shakmaty::Role {
        match self {
            PieceKind::Pawn => shakmaty::Role::Pawn,
            PieceKind::Knight => shakmaty::Role::Knight,
            PieceKind::Bishop => shakmaty::Role::Bishop,
            PieceKind::Rook => shakmaty::Role::Rook,
            PieceKind::Queen => shakmaty::Role::Queen,
            PieceKind::King => shakmaty::Role::King,
        }
    }
}

/// A piece on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    pub fn new(kind: PieceKind, color: PieceColor) -> Self {
        Self { kind, color }
    }

    /// Unicode chess glyph
    pub fn symbol(self) -> char {
        match (self.color, self.kind) {
            (PieceColor::White, PieceKind::King) => '♔',
            (PieceColor::White, PieceKind::Queen) => '♕',
            (PieceColor::White, PieceKind::Rook) => '♖',
            (PieceColor::White, PieceKind::Bishop) => '♗',
            (PieceColor::White, PieceKind::Knight) => '♘',
            (PieceColor::White, PieceKind::Pawn) => '♙',
            (PieceColor::Black, PieceKind::King) => '♚',
            (PieceColor::Black, PieceKind::Queen) => '♛',
            (PieceColor::Black, PieceKind::Rook) => '♜',
            (PieceColor::Black, PieceKind::Bishop) => '♝',
            (PieceColor::Black, PieceKind::Knight) => '♞',
            (PieceColor::Black, PieceKind::Pawn) => '♟',
        }
    }

    /// FEN letter, uppercase for White
    pub fn letter(self) -> char {
        match self.color {
            PieceColor::White => self.kind.letter().to_ascii_uppercase(),
            PieceColor::Black => self.kind.letter(),
        }
    }

    pub(crate) fn from_engine(piece: shakmaty::Piece) -> Self {
        Piece {
            kind: PieceKind::from_engine(piece.role),
            color: PieceColor::from_engine(piece.color),
        }
    }
}

/// Move as it travels over the message channel
///
/// `promotion` is only consulted when the move is a pawn promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Build a move from two grid positions
    ///
    /// Promotion is always forced to a queen for locally originated moves.
    pub fn from_grid(source: (u8, u8), target: (u8, u8)) -> Option<Self> {
        Some(Move {
            from: Square::from_grid(source.0, source.1)?,
            to: Square::from_grid(target.0, target.1)?,
            promotion: Some(PieceKind::Queen),
        })
    }

    /// Parse coordinate notation such as `e2e4` or `e7e8n`
    ///
    /// Without an explicit suffix the promotion defaults to a queen.
    pub fn from_coordinate(text: &str) -> Option<Self> {
        let text = text.trim();
        let from = Square::from_algebraic(text.get(0..2)?)?;
        let to = Square::from_algebraic(text.get(2..4)?)?;
        let promotion = match text.get(4..) {
            None | Some("") => PieceKind::Queen,
            Some(rest) => {
                let mut chars = rest.chars();
                let kind = PieceKind::from_letter(chars.next()?)?;
                if chars.next().is_some() {
                    return None;
                }
                kind
            }
        };

        Some(Move {
            from,
            to,
            promotion: Some(promotion),
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

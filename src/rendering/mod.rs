//! Rendering module - pure projections of a session for display

pub mod board_view;

pub use board_view::{BoardView, SquareView};

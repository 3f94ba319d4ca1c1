//! Tic-tac-toe board state and rules.
//!
//! This crate is the pure half of the game: it owns the 3x3 grid, applies
//! moves, and evaluates terminal conditions. It performs no I/O.
//!
//! # Example
//!
//! ```
//! use tictactoe_board::{Board, Coord, GameOutcome, Mark, Move};
//!
//! let mut board = Board::new();
//! board.apply(Move::new(Mark::X, Coord::new(1, 1)?));
//! assert_eq!(board.evaluate(1), GameOutcome::InProgress);
//! # Ok::<(), tictactoe_board::InputError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod error;
mod outcome;
mod position;
pub mod rules;
mod types;

pub use action::Move;
pub use board::{Board, Rows};
pub use error::InputError;
pub use outcome::GameOutcome;
pub use position::Coord;
pub use types::{Cell, Mark};

/// Number of cells on the board; a game that reaches this many moves is full.
pub const CELL_COUNT: u8 = 9;

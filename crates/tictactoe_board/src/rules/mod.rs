//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]. Rules are kept apart from board storage
//! so the session layer can reason about each check on its own.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;

use crate::{Board, GameOutcome};
use tracing::instrument;

/// Computes the outcome of a board after `move_count` accepted moves.
///
/// Order matters: every winning line is checked before the full-board tie.
#[instrument(skip(board))]
pub fn evaluate(board: &Board, move_count: u8) -> GameOutcome {
    if let Some(mark) = check_winner(board) {
        return GameOutcome::Win(mark);
    }
    if is_full(move_count) {
        return GameOutcome::Tie;
    }
    GameOutcome::InProgress
}

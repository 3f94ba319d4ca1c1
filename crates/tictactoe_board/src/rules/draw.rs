//! Full-board detection.

use crate::CELL_COUNT;

/// Returns true once every cell has been played.
///
/// Uses the accepted-move count rather than re-scanning the board; the
/// session increments it exactly once per applied move.
pub fn is_full(move_count: u8) -> bool {
    move_count >= CELL_COUNT
}

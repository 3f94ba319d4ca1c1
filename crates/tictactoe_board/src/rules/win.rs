//! Win detection.

use crate::{Board, Cell, Mark};
use tracing::instrument;

/// Rows, then columns, then the two diagonals, as row-major indices.
#[rustfmt::skip]
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // Rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // Columns
    [0, 4, 8], [2, 4, 6],            // Diagonals
];

/// Returns the mark holding three cells in a line, if any.
///
/// A valid game stops at the first completed line, so at most one mark can
/// ever qualify; the scan order only matters for hand-built boards.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Mark> {
    let cells = board.cells();
    LINES.iter().find_map(|&[a, b, c]| match cells[a] {
        Cell::Occupied(mark) if cells[b] == cells[a] && cells[c] == cells[a] => Some(mark),
        _ => None,
    })
}

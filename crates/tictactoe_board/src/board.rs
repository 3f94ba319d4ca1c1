//! The 3x3 grid.

use crate::action::Move;
use crate::error::InputError;
use crate::outcome::GameOutcome;
use crate::position::Coord;
use crate::rules;
use crate::types::{Cell, Mark};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// The board as three rows of three cells, top row first.
pub type Rows = [[Cell; 3]; 3];

/// 3x3 tic-tac-toe board.
///
/// The board does no validation of its own: callers decide whether a move is
/// legal and the board records it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    /// Cells in row-major order (0-8).
    cells: [Cell; 9],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from rows, top row first.
    pub fn from_rows(rows: Rows) -> Self {
        let mut cells = [Cell::Empty; 9];
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                cells[r * 3 + c] = *cell;
            }
        }
        Self { cells }
    }

    /// Writes the move's mark into its cell.
    ///
    /// The caller has already checked the cell is empty and the move is in
    /// turn.
    #[instrument(skip(self))]
    pub fn apply(&mut self, mv: Move) {
        self.cells[mv.coord.index()] = Cell::Occupied(mv.player);
        trace!("Mark written");
    }

    /// Reads one cell.
    pub fn cell_at(&self, coord: Coord) -> Cell {
        self.cells[coord.index()]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Copies the board out as rows.
    pub fn rows(&self) -> Rows {
        let mut rows = [[Cell::Empty; 3]; 3];
        for (i, cell) in self.cells.iter().enumerate() {
            rows[i / 3][i % 3] = *cell;
        }
        rows
    }

    /// Number of cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells
            .iter()
            .filter(|c| **c == Cell::Occupied(mark))
            .count()
    }

    /// Evaluates the board given how many moves have been accepted.
    ///
    /// Wins are checked before the full-board tie, so the move that fills the
    /// last cell and completes a line is a win.
    #[instrument(skip(self))]
    pub fn evaluate(&self, move_count: u8) -> GameOutcome {
        rules::evaluate(self, move_count)
    }

    /// Renders the grid, one line per row:
    ///
    /// ```text
    /// | X | O |   |
    /// |   | X |   |
    /// | O |   |   |
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(42);
        for row in self.rows() {
            out.push_str(&format!("| {} | {} | {} |\n", row[0], row[1], row[2]));
        }
        out
    }

    /// Reads back the output of [`Board::render`].
    ///
    /// Blank lines are skipped; anything else must be exactly three
    /// `| a | b | c |` rows.
    #[instrument]
    pub fn from_rendered(text: &str) -> Result<Self, InputError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.len() != 3 {
            return Err(InputError::MalformedBoard {
                reason: format!("expected 3 rows, found {}", lines.len()),
            });
        }

        let mut rows = [[Cell::Empty; 3]; 3];
        for (r, line) in lines.iter().enumerate() {
            let inner = line
                .strip_prefix('|')
                .and_then(|rest| rest.strip_suffix('|'))
                .ok_or_else(|| InputError::MalformedBoard {
                    reason: format!("row {} is not enclosed in '|'", r),
                })?;
            let parts: Vec<&str> = inner.split('|').collect();
            if parts.len() != 3 {
                return Err(InputError::MalformedBoard {
                    reason: format!("row {} has {} cells", r, parts.len()),
                });
            }
            for (c, part) in parts.iter().enumerate() {
                rows[r][c] = Cell::try_from(part.trim().to_string())?;
            }
        }
        Ok(Self::from_rows(rows))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

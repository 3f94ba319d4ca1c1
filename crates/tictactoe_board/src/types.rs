//! Core domain types: marks and cells.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// One of the two player symbols.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
pub enum Mark {
    /// Player X.
    X,
    /// Player O.
    O,
}

impl FromStr for Mark {
    type Err = InputError;

    /// Parses `x`, `X`, `o` or `O`. Surrounding whitespace is ignored.
    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Mark::X),
            "O" | "o" => Ok(Mark::O),
            other => Err(InputError::UnknownMark {
                input: other.to_string(),
            }),
        }
    }
}

/// A position's contents.
///
/// Serialized as `"X"`, `"O"` or `" "` so a board snapshot reads like the
/// board itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Taken by a mark. Never changes afterwards.
    Occupied(Mark),
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }

    /// Returns true if nobody has played here.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Single-character symbol; a space for an empty cell.
    pub fn symbol(self) -> &'static str {
        match self {
            Cell::Empty => " ",
            Cell::Occupied(Mark::X) => "X",
            Cell::Occupied(Mark::O) => "O",
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        Cell::Occupied(mark)
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        cell.symbol().to_string()
    }
}

impl TryFrom<String> for Cell {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Ok(Cell::Empty);
        }
        // Cells are upper-case only; lower-case is a client convenience.
        match value.as_str() {
            "X" => Ok(Cell::Occupied(Mark::X)),
            "O" => Ok(Cell::Occupied(Mark::O)),
            _ => Err(InputError::UnknownMark { input: value }),
        }
    }
}

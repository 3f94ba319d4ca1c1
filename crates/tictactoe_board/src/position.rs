//! Board coordinates.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// A validated (row, column) pair, both in `0..=2`.
///
/// A `Coord` can only be built through [`Coord::new`] or parsing, so every
/// value in circulation addresses a real cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(i64, i64)", into = "(i64, i64)")]
pub struct Coord {
    row: u8,
    col: u8,
}

impl Coord {
    /// Side length of the board.
    pub const SIDE: u8 = 3;

    /// Creates a coordinate, rejecting anything off the board.
    #[instrument]
    pub fn new(row: i64, col: i64) -> Result<Self, InputError> {
        let side = i64::from(Self::SIDE);
        if !(0..side).contains(&row) || !(0..side).contains(&col) {
            return Err(InputError::CoordinateOutOfRange { row, col });
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Row, 0 at the top.
    pub fn row(self) -> usize {
        usize::from(self.row)
    }

    /// Column, 0 at the left.
    pub fn col(self) -> usize {
        usize::from(self.col)
    }

    /// Row-major index into a 9-cell array.
    pub fn index(self) -> usize {
        self.row() * usize::from(Self::SIDE) + self.col()
    }

    /// Builds a coordinate from a row-major index, if it is on the board.
    pub fn from_index(index: usize) -> Option<Self> {
        let side = usize::from(Self::SIDE);
        if index >= side * side {
            return None;
        }
        Some(Self {
            row: (index / side) as u8,
            col: (index % side) as u8,
        })
    }

    /// All nine coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..usize::from(Self::SIDE * Self::SIDE)).filter_map(Self::from_index)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl FromStr for Coord {
    type Err = InputError;

    /// Parses the literal form `(x,y)`. Whitespace anywhere is ignored, so
    /// `( 1 , 2 )` is accepted.
    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let malformed = || InputError::MalformedCoordinate {
            input: s.to_string(),
        };

        let inner = compact
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let (x, y) = inner.split_once(',').ok_or_else(malformed)?;
        let row = x.parse::<i64>().map_err(|_| malformed())?;
        let col = y.parse::<i64>().map_err(|_| malformed())?;

        Coord::new(row, col)
    }
}

impl TryFrom<(i64, i64)> for Coord {
    type Error = InputError;

    fn try_from((row, col): (i64, i64)) -> Result<Self, Self::Error> {
        Coord::new(row, col)
    }
}

impl From<Coord> for (i64, i64) {
    fn from(coord: Coord) -> Self {
        (i64::from(coord.row), i64::from(coord.col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_board_range() {
        for row in 0..3 {
            for col in 0..3 {
                let coord = Coord::new(row, col).unwrap();
                assert_eq!(coord.row(), row as usize);
                assert_eq!(coord.col(), col as usize);
            }
        }
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(
            Coord::new(3, 0),
            Err(InputError::CoordinateOutOfRange { row: 3, col: 0 })
        );
        assert!(Coord::new(0, -1).is_err());
        assert!(Coord::new(i64::MAX, 1).is_err());
    }

    #[test]
    fn test_index_round_trip() {
        let coords: Vec<_> = Coord::all().collect();
        assert_eq!(coords.len(), 9);
        for (i, coord) in coords.iter().enumerate() {
            assert_eq!(coord.index(), i);
        }
        assert_eq!(Coord::from_index(9), None);
    }

    #[test]
    fn test_parse_literal_form() {
        assert_eq!("(0,2)".parse::<Coord>().unwrap(), Coord::new(0, 2).unwrap());
        assert_eq!("( 2 , 1 )".parse::<Coord>().unwrap(), Coord::new(2, 1).unwrap());
    }

    #[test]
    fn test_parse_out_of_range_is_input_error() {
        assert_eq!(
            "(3,0)".parse::<Coord>(),
            Err(InputError::CoordinateOutOfRange { row: 3, col: 0 })
        );
    }

    #[test]
    fn test_parse_malformed() {
        for input in ["0,1", "(0,1", "0,1)", "(a,1)", "(1;1)", "(1,1,1)", "()", ""] {
            assert!(
                matches!(
                    input.parse::<Coord>(),
                    Err(InputError::MalformedCoordinate { .. })
                ),
                "expected {input:?} to be malformed"
            );
        }
    }
}

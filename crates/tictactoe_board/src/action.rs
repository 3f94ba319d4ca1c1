//! Move type.

use crate::position::Coord;
use crate::types::Mark;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A player placing their mark on a cell.
///
/// Constructing a `Move` already guarantees the coordinate is on the board;
/// whether it is legal in the current game is the session's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The player making the move.
    pub player: Mark,
    /// Target cell.
    pub coord: Coord,
}

impl Move {
    /// Creates a new move.
    #[instrument]
    pub fn new(player: Mark, coord: Coord) -> Self {
        Self { player, coord }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.player, self.coord)
    }
}

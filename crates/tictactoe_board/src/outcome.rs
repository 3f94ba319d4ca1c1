//! Game outcome.

/// Verdict on a board.
///
/// Always derived from the board and the move count, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    /// No winner and empty cells remain.
    InProgress,
    /// A mark completed a row, column or diagonal.
    Win(super::Mark),
    /// The board is full and nobody completed a line.
    Tie,
}

impl GameOutcome {
    /// Returns true for `Win` and `Tie`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<super::Mark> {
        match self {
            GameOutcome::Win(mark) => Some(*mark),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::InProgress => write!(f, "In progress"),
            GameOutcome::Win(mark) => write!(f, "Player {} wins", mark),
            GameOutcome::Tie => write!(f, "Tie"),
        }
    }
}

//! Input parsing errors.

/// Input that does not describe a valid mark, coordinate or board.
///
/// This is the error operators see for a bad command line; it is always
/// detected before any network I/O happens.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum InputError {
    /// Coordinate string is not of the form `(x,y)` with integer parts.
    #[display("Invalid move format {input:?}. Move should be in the format (x,y) with integer x and y")]
    MalformedCoordinate {
        /// The rejected text.
        input: String,
    },

    /// Coordinate parts parsed but fall outside the board.
    #[display("Invalid move ({row}, {col}). x and y must be integers between 0 and 2 (inclusive)")]
    CoordinateOutOfRange {
        /// Requested row.
        row: i64,
        /// Requested column.
        col: i64,
    },

    /// Player symbol is neither X nor O.
    #[display("Invalid player {input:?}. Player must be either X or O")]
    UnknownMark {
        /// The rejected text.
        input: String,
    },

    /// A rendered board could not be read back.
    #[display("Malformed board rendering: {reason}")]
    MalformedBoard {
        /// What was wrong with it.
        reason: String,
    },
}

impl std::error::Error for InputError {}

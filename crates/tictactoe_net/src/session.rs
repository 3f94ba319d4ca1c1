//! Turn coordination for a single game.
//!
//! [`SessionCoordinator`] is the only writer of the board, the move count and
//! the last mover. Every inbound move goes through [`SessionCoordinator::handle_move`],
//! which validates it, applies it, and produces exactly one [`Response`].

use crate::wire::{ErrorCode, GameResult, MoveRequest, Response};
use tictactoe_board::{Board, Cell, Coord, GameOutcome, Mark, Move};
use tracing::{debug, info, instrument, warn};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum SessionState {
    /// No move yet; either mark may open.
    AwaitingFirstMove,
    /// Marks must alternate.
    InProgress,
    /// Win or tie reached; no further moves are accepted.
    Finished,
}

/// Why a move was turned down. Rejections never change the session.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveRejection {
    /// The player who moved last tried again.
    #[display("Please wait for your turn.")]
    OutOfTurn {
        /// The offending mark.
        player: Mark,
    },

    /// Target cell is not empty.
    #[display("Move {coord} is invalid. The spot is already occupied")]
    CellOccupied {
        /// The taken cell.
        coord: Coord,
    },

    /// Row or column outside 0-2.
    #[display("Invalid move ({row}, {col}). Row and column must be integers between 0 and 2 (inclusive)")]
    CoordinateOutOfRange {
        /// Requested row.
        row: i64,
        /// Requested column.
        col: i64,
    },

    /// Player is neither X nor O.
    #[display("Invalid player {input:?}. Player must be either X or O")]
    UnknownMark {
        /// What was sent.
        input: String,
    },

    /// The game is over.
    #[display("The game is over. No further moves are accepted.")]
    GameFinished,

    /// A connection seated as one mark tried to play the other.
    #[display("Invalid move: you are playing as {seat}")]
    WrongSeat {
        /// The mark this connection plays.
        seat: Mark,
    },

    /// The mark is already played by another connection.
    #[display("Invalid move: player {mark} is already taken")]
    SeatTaken {
        /// The requested mark.
        mark: Mark,
    },
}

impl MoveRejection {
    /// Wire code for this rejection.
    pub fn code(&self) -> ErrorCode {
        match self {
            MoveRejection::OutOfTurn { .. } => ErrorCode::OutOfTurn,
            MoveRejection::CellOccupied { .. } => ErrorCode::CellOccupied,
            MoveRejection::CoordinateOutOfRange { .. } | MoveRejection::UnknownMark { .. } => {
                ErrorCode::InvalidInput
            }
            MoveRejection::GameFinished => ErrorCode::GameOver,
            MoveRejection::WrongSeat { .. } | MoveRejection::SeatTaken { .. } => {
                ErrorCode::WrongSeat
            }
        }
    }
}

impl std::error::Error for MoveRejection {}

impl From<MoveRejection> for Response {
    fn from(rejection: MoveRejection) -> Self {
        Response::Error {
            code: rejection.code(),
            text: rejection.to_string(),
        }
    }
}

/// Snapshot of a session, returned when the server stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    /// Verdict at the time of the snapshot.
    pub outcome: GameOutcome,
    /// Final board.
    pub board: Board,
    /// Accepted moves in order.
    pub history: Vec<Move>,
}

/// Authoritative state of one game.
#[derive(Debug, Clone, Default)]
pub struct SessionCoordinator {
    board: Board,
    move_count: u8,
    last_mover: Option<Mark>,
    finished: bool,
    history: Vec<Move>,
}

impl SessionCoordinator {
    /// Starts a session with an empty board.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating new game session");
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.finished {
            SessionState::Finished
        } else if self.last_mover.is_none() {
            SessionState::AwaitingFirstMove
        } else {
            SessionState::InProgress
        }
    }

    /// Returns true once a win or tie has been reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of accepted moves.
    pub fn move_count(&self) -> u8 {
        self.move_count
    }

    /// Mark of the last accepted move.
    pub fn last_mover(&self) -> Option<Mark> {
        self.last_mover
    }

    /// Accepted moves in order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Current verdict, recomputed from the board.
    pub fn outcome(&self) -> GameOutcome {
        self.board.evaluate(self.move_count)
    }

    /// Snapshot for reporting.
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            outcome: self.outcome(),
            board: self.board.clone(),
            history: self.history.clone(),
        }
    }

    /// Validates raw wire values, then hands the move to [`Self::handle_move`].
    ///
    /// Coordinate and mark problems are reported as input errors before the
    /// board is consulted.
    #[instrument(skip(self), fields(state = %self.state()))]
    pub fn handle_request(&mut self, request: &MoveRequest) -> Response {
        match Self::parse_request(request) {
            Ok(mv) => self.handle_move(mv),
            Err(rejection) => {
                warn!(%rejection, "Rejected malformed move");
                rejection.into()
            }
        }
    }

    /// Validates and applies one move, returning the reply for its sender.
    #[instrument(skip(self), fields(state = %self.state(), mv = %mv))]
    pub fn handle_move(&mut self, mv: Move) -> Response {
        if let Err(rejection) = self.check(&mv) {
            warn!(%rejection, "Rejected move");
            return rejection.into();
        }

        self.board.apply(mv);
        self.move_count += 1;
        self.last_mover = Some(mv.player);
        self.history.push(mv);
        self.assert_invariants();

        let outcome = self.outcome();
        let board = self.board.rows();
        let rendered = self.board.render();
        debug!(move_count = self.move_count, %outcome, "Move applied");

        match outcome {
            GameOutcome::InProgress => Response::Ack {
                text: format!("Your move was received. Current board:\n\n{}", rendered),
                board,
            },
            GameOutcome::Win(mark) => {
                self.finished = true;
                info!(winner = %mark, moves = self.move_count, "Game won");
                Response::Terminal {
                    text: format!("Player {} has won the game!\n\n{}", mark, rendered),
                    board,
                    result: GameResult::Win { mark },
                }
            }
            GameOutcome::Tie => {
                self.finished = true;
                info!(moves = self.move_count, "Game tied");
                Response::Terminal {
                    text: format!("It's a tie!\n\n{}", rendered),
                    board,
                    result: GameResult::Tie,
                }
            }
        }
    }

    /// Checks a move against the session without changing anything.
    ///
    /// Order: finished game, then turn, then occupancy.
    pub fn check(&self, mv: &Move) -> Result<(), MoveRejection> {
        if self.finished {
            return Err(MoveRejection::GameFinished);
        }
        if self.last_mover == Some(mv.player) {
            return Err(MoveRejection::OutOfTurn { player: mv.player });
        }
        if self.board.cell_at(mv.coord) != Cell::Empty {
            return Err(MoveRejection::CellOccupied { coord: mv.coord });
        }
        Ok(())
    }

    fn parse_request(request: &MoveRequest) -> Result<Move, MoveRejection> {
        let coord = Coord::new(request.row, request.col).map_err(|_| {
            MoveRejection::CoordinateOutOfRange {
                row: request.row,
                col: request.col,
            }
        })?;
        let player = request.mark().ok_or_else(|| MoveRejection::UnknownMark {
            input: request.player.clone(),
        })?;
        Ok(Move::new(player, coord))
    }

    fn assert_invariants(&self) {
        let x = self.board.count(Mark::X);
        let o = self.board.count(Mark::O);
        debug_assert!(x.abs_diff(o) <= 1, "marks out of balance: X={x} O={o}");
        debug_assert_eq!(
            usize::from(self.move_count),
            x + o,
            "move count disagrees with board"
        );
        debug_assert_eq!(self.history.len(), x + o, "history disagrees with board");
    }
}

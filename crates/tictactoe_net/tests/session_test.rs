//! Turn coordination properties, exercised through the public session API.

use tictactoe_board::{Board, Cell, Coord, GameOutcome, Mark, Move};
use tictactoe_net::wire::{ErrorCode, GameResult, MoveRequest, Response};
use tictactoe_net::{MoveRejection, SessionCoordinator, SessionState};

fn mv(mark: Mark, row: i64, col: i64) -> Move {
    Move::new(mark, Coord::new(row, col).unwrap())
}

fn play(session: &mut SessionCoordinator, moves: &[(Mark, i64, i64)]) -> Vec<Response> {
    moves
        .iter()
        .map(|&(mark, row, col)| session.handle_move(mv(mark, row, col)))
        .collect()
}

/// Small deterministic generator so the random-sequence test is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn test_first_move_on_empty_board_is_acknowledged() {
    let mut session = SessionCoordinator::new();
    let response = session.handle_move(mv(Mark::X, 0, 0));

    assert!(matches!(response, Response::Ack { .. }));
    let board = response.board().unwrap();
    assert_eq!(board.cell_at(Coord::new(0, 0).unwrap()), Cell::Occupied(Mark::X));
    assert_eq!(board.count(Mark::X), 1);
    assert_eq!(board.count(Mark::O), 0);
    assert_eq!(session.state(), SessionState::InProgress);
}

#[test]
fn test_top_row_win() {
    let mut session = SessionCoordinator::new();
    let responses = play(
        &mut session,
        &[
            (Mark::X, 0, 0),
            (Mark::O, 1, 0),
            (Mark::X, 0, 1),
            (Mark::O, 1, 1),
            (Mark::X, 0, 2),
        ],
    );

    let last = responses.last().unwrap();
    assert!(last.is_terminal());
    assert!(last.text().starts_with("Player X has won the game!\n\n"));
    match last {
        Response::Terminal { result, .. } => assert_eq!(*result, GameResult::Win { mark: Mark::X }),
        other => panic!("expected terminal, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Finished);
}

#[test]
fn test_full_board_without_line_is_a_tie() {
    // X O X / X O O / O X X
    let mut session = SessionCoordinator::new();
    let responses = play(
        &mut session,
        &[
            (Mark::X, 0, 0),
            (Mark::O, 0, 1),
            (Mark::X, 0, 2),
            (Mark::O, 1, 1),
            (Mark::X, 1, 0),
            (Mark::O, 1, 2),
            (Mark::X, 2, 1),
            (Mark::O, 2, 0),
            (Mark::X, 2, 2),
        ],
    );

    assert!(responses[..8].iter().all(|r| matches!(r, Response::Ack { .. })));
    let last = responses.last().unwrap();
    assert!(last.text().starts_with("It's a tie!\n\n"));
    assert_eq!(session.outcome(), GameOutcome::Tie);
    assert_eq!(session.move_count(), 9);
}

#[test]
fn test_win_on_ninth_move_is_not_a_tie() {
    // X O X / O X X / O O X: the ninth move completes the main diagonal.
    let mut session = SessionCoordinator::new();
    let responses = play(
        &mut session,
        &[
            (Mark::X, 0, 0),
            (Mark::O, 0, 1),
            (Mark::X, 0, 2),
            (Mark::O, 1, 0),
            (Mark::X, 1, 1),
            (Mark::O, 2, 0),
            (Mark::X, 1, 2),
            (Mark::O, 2, 1),
            (Mark::X, 2, 2),
        ],
    );

    assert_eq!(session.move_count(), 9);
    match responses.last().unwrap() {
        Response::Terminal { result, .. } => assert_eq!(*result, GameResult::Win { mark: Mark::X }),
        other => panic!("expected terminal, got {other:?}"),
    }
}

#[test]
fn test_out_of_turn_changes_nothing() {
    let mut session = SessionCoordinator::new();
    session.handle_move(mv(Mark::X, 0, 0));
    let before = session.board().clone();

    let response = session.handle_move(mv(Mark::X, 1, 1));
    assert_eq!(response.text(), "Please wait for your turn.");
    assert_eq!(response.error_code(), Some(ErrorCode::OutOfTurn));
    assert_eq!(session.board(), &before);
    assert_eq!(session.move_count(), 1);
    assert_eq!(session.last_mover(), Some(Mark::X));
}

#[test]
fn test_occupied_cell_changes_nothing() {
    let mut session = SessionCoordinator::new();
    session.handle_move(mv(Mark::X, 0, 0));

    let response = session.handle_move(mv(Mark::O, 0, 0));
    assert_eq!(
        response.text(),
        "Move (0, 0) is invalid. The spot is already occupied"
    );
    assert_eq!(response.error_code(), Some(ErrorCode::CellOccupied));
    assert_eq!(session.move_count(), 1);

    // O may still take its turn elsewhere.
    let response = session.handle_move(mv(Mark::O, 2, 2));
    assert!(matches!(response, Response::Ack { .. }));
}

#[test]
fn test_rejections_are_idempotent() {
    let mut session = SessionCoordinator::new();
    session.handle_move(mv(Mark::O, 1, 1));

    let first = session.handle_move(mv(Mark::O, 0, 0));
    let second = session.handle_move(mv(Mark::O, 0, 0));
    assert_eq!(first, second);
    assert_eq!(session.move_count(), 1);
    assert_eq!(session.history(), &[mv(Mark::O, 1, 1)]);
}

#[test]
fn test_no_moves_accepted_after_game_ends() {
    let mut session = SessionCoordinator::new();
    play(
        &mut session,
        &[
            (Mark::X, 0, 0),
            (Mark::O, 1, 0),
            (Mark::X, 0, 1),
            (Mark::O, 1, 1),
            (Mark::X, 0, 2),
        ],
    );
    let final_board = session.board().clone();

    for attempt in [mv(Mark::O, 2, 2), mv(Mark::X, 2, 2), mv(Mark::O, 0, 0)] {
        assert_eq!(session.check(&attempt), Err(MoveRejection::GameFinished));
        let response = session.handle_move(attempt);
        assert_eq!(response.error_code(), Some(ErrorCode::GameOver));
    }
    assert_eq!(session.board(), &final_board);
    assert_eq!(session.move_count(), 5);
}

#[test]
fn test_raw_request_out_of_range_is_input_error() {
    let mut session = SessionCoordinator::new();
    let response = session.handle_request(&MoveRequest {
        player: "O".to_string(),
        row: 0,
        col: -1,
    });
    assert_eq!(response.error_code(), Some(ErrorCode::InvalidInput));
    assert_eq!(session.state(), SessionState::AwaitingFirstMove);
}

#[test]
fn test_random_sequences_keep_alternation_and_occupancy() {
    let mut rng = Lcg(0x5eed);

    for _ in 0..200 {
        let mut session = SessionCoordinator::new();
        let mut expected = Board::new();

        for _ in 0..40 {
            let mark = if rng.next() % 2 == 0 { Mark::X } else { Mark::O };
            let index = (rng.next() % 9) as usize;
            let coord = Coord::from_index(index).unwrap();
            let attempt = Move::new(mark, coord);

            let previous = session.last_mover();
            let occupied = expected.cell_at(coord) != Cell::Empty;
            let finished = session.is_finished();
            let response = session.handle_move(attempt);

            if finished || previous == Some(mark) || occupied {
                assert!(response.error_code().is_some());
            } else {
                expected.apply(attempt);
                assert!(response.error_code().is_none());
            }
            assert_eq!(session.board(), &expected);
        }

        // Accepted moves strictly alternate.
        let history = session.history();
        assert!(history.windows(2).all(|w| w[0].player != w[1].player));
        let x = session.board().count(Mark::X);
        let o = session.board().count(Mark::O);
        assert!(x.abs_diff(o) <= 1);
        assert_eq!(usize::from(session.move_count()), history.len());
    }
}

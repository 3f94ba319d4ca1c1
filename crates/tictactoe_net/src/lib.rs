//! Networked tic-tac-toe: turn coordination, wire protocol, server and client.
//!
//! A [`GameServer`] hosts exactly one game. Clients connect over TCP and send
//! [`MoveRequest`](wire::MoveRequest) frames; the server feeds each one to the
//! [`SessionCoordinator`], which validates turn order and occupancy, applies
//! the move to the [`tictactoe_board::Board`], and returns one
//! [`Response`](wire::Response) for the sender.
//!
//! # Example
//!
//! ```
//! use tictactoe_board::{Coord, Mark, Move};
//! use tictactoe_net::SessionCoordinator;
//!
//! let mut session = SessionCoordinator::new();
//! let reply = session.handle_move(Move::new(Mark::X, Coord::new(0, 0)?));
//! assert!(reply.text().starts_with("Your move was received."));
//!
//! let reply = session.handle_move(Move::new(Mark::X, Coord::new(0, 1)?));
//! assert_eq!(reply.text(), "Please wait for your turn.");
//! # Ok::<(), tictactoe_board::InputError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;
mod client;
mod config;
mod server;
mod session;
pub mod wire;

pub use cli::{ClientCli, ServerCli, parse_coord, parse_mark};
pub use client::{ClientError, GameClient, submit_move};
pub use config::{
    ClientConfig, ConfigError, MAX_PORT, MIN_PORT, ServeMode, ServerConfig, parse_port,
    validate_port,
};
pub use server::{GameServer, ServerError};
pub use session::{GameSummary, MoveRejection, SessionCoordinator, SessionState};

//! TCP game server.
//!
//! Two schedules share the same [`SessionCoordinator`]:
//!
//! - **Sequential**: accept a connection, read one move, reply, close, repeat.
//!   Moves are trivially serialized and no locking is needed.
//! - **Concurrent**: up to two connections, one per player, each in its own
//!   task and able to submit any number of moves. A connection is seated as
//!   the first mark it plays and may not play the other. The coordinator sits
//!   behind a mutex held for the whole validate-apply-evaluate step, so moves
//!   are still applied one at a time.
//!
//! Either way the server stops accepting as soon as the game ends.

use crate::config::{ServeMode, ServerConfig};
use crate::session::{GameSummary, MoveRejection, SessionCoordinator};
use crate::wire::{self, MoveRequest, Response, WireError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tictactoe_board::Mark;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

/// Server failure. Only these end the process; per-connection problems are
/// logged and the server keeps going.
#[derive(Debug, derive_more::Display)]
pub enum ServerError {
    /// The listening socket could not be created.
    #[display("Could not start server on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// `accept` failed.
    #[display("Failed to accept connection: {_0}")]
    Accept(std::io::Error),

    /// The bound address could not be read back.
    #[display("Could not read local address: {_0}")]
    LocalAddr(std::io::Error),
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Bind { source, .. } => Some(source),
            ServerError::Accept(e) | ServerError::LocalAddr(e) => Some(e),
        }
    }
}

/// Live connections a concurrent server serves at once.
const SEATS: usize = 2;

/// Shared state of a concurrent game: the session and the marks currently
/// held by a live connection.
#[derive(Debug, Default)]
struct Table {
    session: SessionCoordinator,
    seated: Vec<Mark>,
}

impl Table {
    /// Seats the connection on its first valid mark, then plays the move.
    fn play(&mut self, seat: &mut Option<Mark>, request: &MoveRequest) -> Response {
        if let Some(mark) = request.mark().filter(|_| !self.session.is_finished()) {
            if let Err(rejection) = self.claim(seat, mark) {
                warn!(%rejection, "Rejected move from wrong seat");
                return rejection.into();
            }
        }
        self.session.handle_request(request)
    }

    fn claim(&mut self, seat: &mut Option<Mark>, mark: Mark) -> Result<(), MoveRejection> {
        match *seat {
            Some(own) if own == mark => Ok(()),
            Some(own) => Err(MoveRejection::WrongSeat { seat: own }),
            None if self.seated.contains(&mark) => Err(MoveRejection::SeatTaken { mark }),
            None => {
                self.seated.push(mark);
                *seat = Some(mark);
                debug!(%mark, "Connection seated");
                Ok(())
            }
        }
    }

    /// Frees a departing connection's mark so a reconnecting player can
    /// take it again.
    fn release(&mut self, seat: Option<Mark>) {
        if let Some(mark) = seat {
            self.seated.retain(|m| *m != mark);
            debug!(%mark, "Seat released");
        }
    }
}

/// A bound server that will host exactly one game.
#[derive(Debug)]
pub struct GameServer {
    listener: TcpListener,
    config: ServerConfig,
}

impl GameServer {
    /// Binds the listening socket.
    #[instrument(skip(config), fields(addr = %config.bind_addr()))]
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr).await.map_err(|source| {
            error!(%addr, error = %source, "Bind failed");
            ServerError::Bind { addr, source }
        })?;
        info!("Listening");
        Ok(Self { listener, config })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::LocalAddr)
    }

    /// The configuration this server was bound with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Hosts one game to completion and returns its summary.
    #[instrument(skip(self), fields(mode = ?self.config.mode()))]
    pub async fn run(self) -> Result<GameSummary, ServerError> {
        let summary = match self.config.mode() {
            ServeMode::Sequential => self.run_sequential().await?,
            ServeMode::Concurrent => self.run_concurrent().await?,
        };
        info!(outcome = %summary.outcome, moves = summary.history.len(), "Game finished, server closing");
        Ok(summary)
    }

    async fn run_sequential(self) -> Result<GameSummary, ServerError> {
        let timeout = self.config.read_timeout();
        let mut session = SessionCoordinator::new();

        while !session.is_finished() {
            let (stream, peer) = self.listener.accept().await.map_err(ServerError::Accept)?;
            debug!(%peer, "Accepted connection");
            if let Err(e) = exchange(&mut session, stream, timeout).await {
                warn!(%peer, error = %e, "Connection dropped");
            }
        }

        Ok(session.summary())
    }

    async fn run_concurrent(self) -> Result<GameSummary, ServerError> {
        let timeout = self.config.read_timeout();
        let table = Arc::new(Mutex::new(Table {
            session: SessionCoordinator::new(),
            seated: Vec::with_capacity(SEATS),
        }));
        let seats = Arc::new(Semaphore::new(SEATS));
        let (done_tx, mut done_rx) = watch::channel(false);
        let done_tx = Arc::new(done_tx);
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted.map_err(ServerError::Accept)?;
                    match Arc::clone(&seats).try_acquire_owned() {
                        Ok(permit) => {
                            debug!(%peer, "Accepted connection");
                            connections.spawn(serve_connection(
                                stream,
                                peer,
                                Arc::clone(&table),
                                Arc::clone(&done_tx),
                                done_rx.clone(),
                                timeout,
                                permit,
                            ));
                        }
                        Err(_) => {
                            warn!(%peer, "Server full, turning connection away");
                            connections.spawn(turn_away(stream, timeout));
                        }
                    }
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = done_rx.changed() => break,
            }
        }

        drop(self.listener);
        while connections.join_next().await.is_some() {}

        let summary = table.lock().await.session.summary();
        Ok(summary)
    }
}

/// One request/response exchange on a fresh connection.
#[instrument(skip_all)]
async fn exchange(
    session: &mut SessionCoordinator,
    mut stream: TcpStream,
    timeout: Duration,
) -> Result<(), WireError> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    let response = match wire::read_frame_timeout::<_, MoveRequest>(&mut reader, timeout).await {
        Ok(Some(request)) => session.handle_request(&request),
        Ok(None) => {
            debug!("Peer closed without sending a move");
            return Ok(());
        }
        Err(e) if e.is_decode_error() => {
            warn!(error = %e, "Undecodable request");
            Response::malformed()
        }
        Err(e) => return Err(e),
    };

    wire::write_frame_timeout(&mut write_half, &response, timeout).await?;
    write_half.shutdown().await?;
    Ok(())
}

/// Tells a connection beyond the two players that there is no room.
async fn turn_away(mut stream: TcpStream, timeout: Duration) {
    if let Err(e) = wire::write_frame_timeout(&mut stream, &Response::server_full(), timeout).await {
        debug!(error = %e, "Could not send server-full reply");
    }
    let _ = stream.shutdown().await;
}

/// Serves one long-lived connection until it closes, times out, or the game
/// ends. Holding `_permit` keeps the connection's seat counted.
#[instrument(skip(stream, table, done_tx, done_rx, timeout, _permit))]
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    table: Arc<Mutex<Table>>,
    done_tx: Arc<watch::Sender<bool>>,
    mut done_rx: watch::Receiver<bool>,
    timeout: Duration,
    _permit: OwnedSemaphorePermit,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut seat = None;

    loop {
        let frame = tokio::select! {
            frame = wire::read_frame_timeout::<_, MoveRequest>(&mut reader, timeout) => frame,
            _ = done_rx.changed() => {
                debug!("Game over, closing connection");
                break;
            }
        };

        let mut close_after_reply = false;
        let response = match frame {
            Ok(Some(request)) => {
                let mut table = table.lock().await;
                let response = table.play(&mut seat, &request);
                if table.session.is_finished() {
                    done_tx.send_replace(true);
                }
                response
            }
            Ok(None) => {
                debug!("Peer closed connection");
                break;
            }
            Err(e) if e.is_decode_error() => {
                warn!(error = %e, "Undecodable request");
                // Framing is lost after an oversized line.
                close_after_reply = matches!(e, WireError::FrameTooLarge { .. });
                Response::malformed()
            }
            Err(e) => {
                warn!(error = %e, "Connection dropped");
                break;
            }
        };

        if let Err(e) = wire::write_frame_timeout(&mut write_half, &response, timeout).await {
            warn!(error = %e, "Failed to send reply");
            break;
        }
        if response.is_terminal() || close_after_reply {
            break;
        }
    }

    table.lock().await.release(seat);
    let _ = write_half.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::ErrorCode;

    fn request(player: &str, row: i64, col: i64) -> MoveRequest {
        MoveRequest {
            player: player.to_string(),
            row,
            col,
        }
    }

    #[test]
    fn test_connection_keeps_its_first_mark() {
        let mut table = Table::default();
        let mut seat = None;

        let response = table.play(&mut seat, &request("X", 0, 0));
        assert!(matches!(response, Response::Ack { .. }));
        assert_eq!(seat, Some(Mark::X));

        let response = table.play(&mut seat, &request("O", 1, 0));
        assert_eq!(response.error_code(), Some(ErrorCode::WrongSeat));
        assert_eq!(response.text(), "Invalid move: you are playing as X");
        assert_eq!(table.session.move_count(), 1);
    }

    #[test]
    fn test_mark_held_by_another_connection() {
        let mut table = Table::default();
        let (mut first, mut second) = (None, None);

        table.play(&mut first, &request("O", 1, 1));
        let response = table.play(&mut second, &request("O", 0, 0));
        assert_eq!(response.error_code(), Some(ErrorCode::WrongSeat));
        assert_eq!(second, None);

        let response = table.play(&mut second, &request("X", 0, 0));
        assert!(matches!(response, Response::Ack { .. }));
        assert_eq!(second, Some(Mark::X));
    }

    #[test]
    fn test_released_seat_can_be_retaken() {
        let mut table = Table::default();
        let mut first = None;
        table.play(&mut first, &request("X", 0, 0));
        table.release(first);

        let mut rejoined = None;
        table.play(&mut rejoined, &request("O", 1, 1));
        let mut again = None;
        let response = table.play(&mut again, &request("X", 2, 2));
        assert!(matches!(response, Response::Ack { .. }));
        assert_eq!(again, Some(Mark::X));
    }

    #[test]
    fn test_invalid_mark_does_not_seat() {
        let mut table = Table::default();
        let mut seat = None;
        let response = table.play(&mut seat, &request("Z", 0, 0));
        assert_eq!(response.error_code(), Some(ErrorCode::InvalidInput));
        assert_eq!(seat, None);
    }
}

//! Wire protocol between client and server.
//!
//! Every message is one line of JSON wrapped in a versioned envelope:
//!
//! ```text
//! {"version":1,"payload":{"player":"X","row":0,"col":2}}
//! {"version":1,"payload":{"kind":"ack","text":"...","board":[["X"," "," "],...]}}
//! ```
//!
//! Responses are internally tagged by `kind` so either side can be
//! rewritten without sharing code with the other.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tictactoe_board::{Board, Mark, Move, Rows};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, trace};

/// Version written into every envelope. Frames carrying any other version
/// are rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// Longest frame accepted, newline included.
pub const MAX_FRAME_LEN: usize = 4096;

/// Versioned wrapper around every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Protocol version of the payload.
    pub version: u32,
    /// The message itself.
    pub payload: T,
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

/// Client to server: place `player`'s mark at (`row`, `col`).
///
/// Fields are kept raw so the server, not the decoder, decides what an
/// unacceptable mark or coordinate is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// `"X"` or `"O"`.
    pub player: String,
    /// Row, 0-2.
    pub row: i64,
    /// Column, 0-2.
    pub col: i64,
}

impl MoveRequest {
    /// The requested mark, if `player` is exactly `"X"` or `"O"`.
    ///
    /// Case folding is the client's job; the wire only carries upper case.
    pub fn mark(&self) -> Option<Mark> {
        match self.player.as_str() {
            "X" => Some(Mark::X),
            "O" => Some(Mark::O),
            _ => None,
        }
    }
}

impl From<Move> for MoveRequest {
    fn from(mv: Move) -> Self {
        Self {
            player: mv.player.to_string(),
            row: mv.coord.row() as i64,
            col: mv.coord.col() as i64,
        }
    }
}

/// Machine-readable reason attached to an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Coordinate off the board or unknown mark. A client bug, not a rule.
    InvalidInput,
    /// The same player moved twice in a row.
    OutOfTurn,
    /// The target cell is taken.
    CellOccupied,
    /// The game already ended.
    GameOver,
    /// The connection is seated as the other mark, or the mark belongs to
    /// another connection.
    WrongSeat,
    /// Both seats are taken; the connection is closed after this reply.
    ServerFull,
    /// The frame could not be decoded at all.
    MalformedRequest,
}

/// Final result carried by a terminal response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum GameResult {
    /// `mark` completed a line.
    Win {
        /// The winner.
        mark: Mark,
    },
    /// Full board, no line.
    Tie,
}

/// Server to client. Exactly one is sent per received move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Response {
    /// The move was rejected; nothing changed.
    Error {
        /// Human-readable explanation.
        text: String,
        /// Why it was rejected.
        code: ErrorCode,
    },
    /// The move was accepted and the game goes on.
    Ack {
        /// Human-readable acknowledgement including the board.
        text: String,
        /// Board after the move.
        board: Rows,
    },
    /// The move ended the game.
    Terminal {
        /// Human-readable result including the board.
        text: String,
        /// Final board.
        board: Rows,
        /// Winner or tie.
        result: GameResult,
    },
}

impl Response {
    /// Generic reply to a frame that could not be decoded.
    pub fn malformed() -> Self {
        Response::Error {
            text: "Could not read your move. Send a player (X or O) with a row and column."
                .to_string(),
            code: ErrorCode::MalformedRequest,
        }
    }

    /// Reply to a connection beyond the two players.
    pub fn server_full() -> Self {
        Response::Error {
            text: "Sorry, the server is full!".to_string(),
            code: ErrorCode::ServerFull,
        }
    }

    /// The human-readable text of any response.
    pub fn text(&self) -> &str {
        match self {
            Response::Error { text, .. }
            | Response::Ack { text, .. }
            | Response::Terminal { text, .. } => text,
        }
    }

    /// The board snapshot, if the response carries one.
    pub fn board(&self) -> Option<Board> {
        match self {
            Response::Ack { board, .. } | Response::Terminal { board, .. } => {
                Some(Board::from_rows(*board))
            }
            Response::Error { .. } => None,
        }
    }

    /// The error code of an error response.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Response::Error { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if this response ended the game.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Response::Terminal { .. })
    }
}

/// Failure to move a frame across a connection.
#[derive(Debug, derive_more::Display, derive_more::From)]
pub enum WireError {
    /// Socket failure.
    #[display("I/O error: {_0}")]
    #[from]
    Io(std::io::Error),

    /// Bytes arrived but are not a valid message.
    #[display("Malformed frame: {_0}")]
    #[from]
    Decode(serde_json::Error),

    /// Outgoing message could not be serialized.
    #[display("Could not encode frame: {_0}")]
    Encode(serde_json::Error),

    /// Envelope from an incompatible peer.
    #[display("Unsupported protocol version {found} (expected {expected})")]
    Version {
        /// Version in the frame.
        found: u32,
        /// Version this build speaks.
        expected: u32,
    },

    /// A line longer than [`MAX_FRAME_LEN`].
    #[display("Frame exceeds {limit} bytes")]
    FrameTooLarge {
        /// The limit that was hit.
        limit: usize,
    },

    /// The peer sent nothing for too long.
    #[display("No data received within {}ms", _0.as_millis())]
    Timeout(Duration),
}

impl WireError {
    /// Returns true when the peer sent bytes that are not a valid message,
    /// as opposed to the connection itself failing.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            WireError::Decode(_) | WireError::Version { .. } | WireError::FrameTooLarge { .. }
        )
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WireError::Io(e) => Some(e),
            WireError::Decode(e) | WireError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

/// Writes one message as a newline-terminated envelope and flushes.
#[instrument(skip_all)]
pub async fn write_frame<W, T>(writer: &mut W, payload: &T) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let envelope = Envelope {
        version: PROTOCOL_VERSION,
        payload,
    };
    let mut line = serde_json::to_vec(&envelope).map_err(WireError::Encode)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    trace!(bytes = line.len(), "Frame written");
    Ok(())
}

/// Reads one message. Returns `Ok(None)` if the peer closed the connection
/// before sending anything.
#[instrument(skip_all)]
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, WireError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = Vec::new();
    let read = (&mut *reader)
        .take(MAX_FRAME_LEN as u64 + 1)
        .read_until(b'\n', &mut line)
        .await?;
    if read == 0 {
        debug!("Peer closed connection");
        return Ok(None);
    }
    if line.len() > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge {
            limit: MAX_FRAME_LEN,
        });
    }
    trace!(bytes = line.len(), "Frame read");
    decode(&line).map(Some)
}

/// [`read_frame`] bounded by `limit`.
pub async fn read_frame_timeout<R, T>(reader: &mut R, limit: Duration) -> Result<Option<T>, WireError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    tokio::time::timeout(limit, read_frame(reader))
        .await
        .map_err(|_| WireError::Timeout(limit))?
}

/// [`write_frame`] bounded by `limit`, for peers that stop reading.
pub async fn write_frame_timeout<W, T>(
    writer: &mut W,
    payload: &T,
    limit: Duration,
) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    tokio::time::timeout(limit, write_frame(writer, payload))
        .await
        .map_err(|_| WireError::Timeout(limit))?
}

/// Decodes a single frame (with or without its trailing newline).
pub fn decode<T: DeserializeOwned>(line: &[u8]) -> Result<T, WireError> {
    let header: VersionHeader = serde_json::from_slice(line)?;
    if header.version != PROTOCOL_VERSION {
        return Err(WireError::Version {
            found: header.version,
            expected: PROTOCOL_VERSION,
        });
    }
    let envelope: Envelope<T> = serde_json::from_slice(line)?;
    Ok(envelope.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictactoe_board::Coord;
    use tokio::io::BufReader;

    #[test]
    fn test_request_shape() {
        let req = MoveRequest::from(Move::new(Mark::O, Coord::new(2, 1).unwrap()));
        let json = serde_json::to_value(Envelope {
            version: PROTOCOL_VERSION,
            payload: &req,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"version": 1, "payload": {"player": "O", "row": 2, "col": 1}})
        );
    }

    #[test]
    fn test_terminal_response_shape() {
        let mut board = Board::new();
        board.apply(Move::new(Mark::X, Coord::new(0, 0).unwrap()));
        let response = Response::Terminal {
            text: "done".to_string(),
            board: board.rows(),
            result: GameResult::Win { mark: Mark::X },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["kind"], "terminal");
        assert_eq!(json["result"], serde_json::json!({"outcome": "win", "mark": "X"}));
        assert_eq!(json["board"][0][0], "X");
        assert_eq!(json["board"][2][2], " ");
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(Response::malformed()).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["code"], "malformed_request");
    }

    #[test]
    fn test_decode_rejects_other_versions() {
        let line = br#"{"version":2,"payload":{"player":"X","row":0,"col":0}}"#;
        let err = decode::<MoveRequest>(line).unwrap_err();
        assert!(matches!(err, WireError::Version { found: 2, expected: 1 }));
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode::<MoveRequest>(b"hello\n").unwrap_err();
        assert!(matches!(err, WireError::Decode(_)));
        let err = decode::<MoveRequest>(br#"{"version":1,"payload":{"player":"X"}}"#).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[tokio::test]
    async fn test_frames_cross_a_stream() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = BufReader::new(server);

        let req = MoveRequest {
            player: "X".to_string(),
            row: 1,
            col: 1,
        };
        write_frame(&mut client, &req).await.unwrap();
        write_frame(&mut client, &req).await.unwrap();

        let first: Option<MoveRequest> = read_frame(&mut reader).await.unwrap();
        let second: Option<MoveRequest> = read_frame(&mut reader).await.unwrap();
        assert_eq!(first.as_ref(), Some(&req));
        assert_eq!(second, Some(req));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let payload = vec![b'a'; MAX_FRAME_LEN + 10];
        let mut reader = BufReader::new(payload.as_slice());
        let err = read_frame::<_, MoveRequest>(&mut reader).await.unwrap_err();
        assert!(matches!(err, WireError::FrameTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_write_timeout_when_peer_stops_reading() {
        let (mut client, _server) = tokio::io::duplex(16);
        let err = write_frame_timeout(&mut client, &Response::malformed(), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, WireError::Timeout(_)));
    }

    #[test]
    fn test_request_mark_is_exact() {
        let request = |player: &str| MoveRequest {
            player: player.to_string(),
            row: 0,
            col: 0,
        };
        assert_eq!(request("X").mark(), Some(Mark::X));
        assert_eq!(request("O").mark(), Some(Mark::O));
        assert_eq!(request("x").mark(), None);
        assert_eq!(request("XO").mark(), None);
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let (_client, server) = tokio::io::duplex(64);
        let mut reader = BufReader::new(server);
        let err = read_frame_timeout::<_, MoveRequest>(&mut reader, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, WireError::Timeout(_)));
    }
}

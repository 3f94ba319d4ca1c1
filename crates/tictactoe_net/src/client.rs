//! TCP client for submitting moves.

use crate::config::ClientConfig;
use crate::wire::{self, MoveRequest, Response, WireError};
use std::time::Duration;
use tictactoe_board::Move;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, error, info, instrument};

/// Client-side failure.
#[derive(Debug, derive_more::Display, derive_more::From)]
pub enum ClientError {
    /// No server at the configured address.
    #[display(
        "Could not connect to server at {addr}. Please make sure the server is running and that you are connecting to the right port."
    )]
    Connect {
        /// Address that was tried.
        addr: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Sending or receiving a frame failed.
    #[display("{_0}")]
    #[from]
    Wire(WireError),

    /// The server closed the connection without replying.
    #[display("The server closed the connection without replying.")]
    NoReply,
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Connect { source, .. } => Some(source),
            ClientError::Wire(e) => Some(e),
            ClientError::NoReply => None,
        }
    }
}

/// An open connection to a game server.
///
/// Against a sequential server each connection carries one move; against a
/// concurrent server the same client may send several.
#[derive(Debug)]
pub struct GameClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    read_timeout: Duration,
}

impl GameClient {
    /// Connects to the configured server.
    #[instrument(skip(config), fields(addr = %config.server_addr()))]
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let addr = config.server_addr();
        let stream = TcpStream::connect(&addr).await.map_err(|source| {
            error!(%addr, error = %source, "Connection failed");
            ClientError::Connect {
                addr: addr.clone(),
                source,
            }
        })?;
        debug!("Connected");

        let (read_half, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer,
            read_timeout: config.read_timeout(),
        })
    }

    /// Sends a validated move and waits for the reply.
    #[instrument(skip(self), fields(mv = %mv))]
    pub async fn send_move(&mut self, mv: Move) -> Result<Response, ClientError> {
        self.send_request(&MoveRequest::from(mv)).await
    }

    /// Sends a raw request and waits for the reply.
    pub async fn send_request(&mut self, request: &MoveRequest) -> Result<Response, ClientError> {
        wire::write_frame(&mut self.writer, request).await?;
        let response: Option<Response> =
            wire::read_frame_timeout(&mut self.reader, self.read_timeout).await?;
        let response = response.ok_or(ClientError::NoReply)?;
        info!(kind = response_kind(&response), "Reply received");
        Ok(response)
    }
}

fn response_kind(response: &Response) -> &'static str {
    match response {
        Response::Error { .. } => "error",
        Response::Ack { .. } => "ack",
        Response::Terminal { .. } => "terminal",
    }
}

/// Connects, submits one move, and returns the server's reply.
pub async fn submit_move(config: &ClientConfig, mv: Move) -> Result<Response, ClientError> {
    let mut client = GameClient::connect(config).await?;
    client.send_move(mv).await
}

//! Command-line interfaces for the two binaries.
//!
//! Every argument is validated by its value parser, so a bad port, mark or
//! coordinate is reported as a usage error before any socket is touched.

use crate::config::{ClientConfig, ConfigError, ServeMode, ServerConfig, parse_port};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tictactoe_board::{Coord, InputError, Mark, Move};

/// Tic-tac-toe game server. Hosts a single game and exits when it ends.
#[derive(Parser, Debug)]
#[command(name = "tictactoe-server")]
#[command(about = "Host one game of tic-tac-toe over TCP", long_about = None)]
#[command(version)]
pub struct ServerCli {
    /// Port to listen on (1024-65535)
    #[arg(value_parser = parse_port)]
    pub port: u16,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// TOML file with server settings; flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Serve both players in parallel over long-lived connections
    #[arg(long)]
    pub concurrent: bool,

    /// Seconds to wait for a connected client to send its move
    #[arg(long)]
    pub read_timeout_secs: Option<u64>,
}

impl ServerCli {
    /// Resolves the effective configuration: defaults, then the config file,
    /// then flags.
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        config = config.with_port(self.port);
        if let Some(host) = self.host {
            config = config.with_host(host);
        }
        if self.concurrent {
            config = config.with_mode(ServeMode::Concurrent);
        }
        if let Some(secs) = self.read_timeout_secs {
            config = config.with_read_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }
}

/// Tic-tac-toe client. Submits one move and prints the server's reply.
#[derive(Parser, Debug)]
#[command(name = "tictactoe-client")]
#[command(about = "Send one tic-tac-toe move to a server", long_about = None)]
#[command(version)]
pub struct ClientCli {
    /// Server port (1024-65535)
    #[arg(value_parser = parse_port)]
    pub port: u16,

    /// Your mark, X or O
    #[arg(value_parser = parse_mark)]
    pub mark: Mark,

    /// Target cell as (row,col), each 0-2
    #[arg(value_parser = parse_coord, allow_hyphen_values = true)]
    pub coord: Coord,

    /// Server address
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Seconds to wait for the reply
    #[arg(long)]
    pub read_timeout_secs: Option<u64>,
}

impl ClientCli {
    /// The move to submit.
    pub fn to_move(&self) -> Move {
        Move::new(self.mark, self.coord)
    }

    /// Connection settings.
    pub fn to_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.host.clone(), self.port);
        match self.read_timeout_secs {
            Some(secs) => config.with_read_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

/// Parses a mark, case-insensitively.
pub fn parse_mark(input: &str) -> Result<Mark, InputError> {
    input.parse()
}

/// Parses a coordinate in `(x,y)` form.
pub fn parse_coord(input: &str) -> Result<Coord, InputError> {
    input.parse()
}

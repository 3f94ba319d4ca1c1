//! Tic-tac-toe game server.

use anyhow::{Context, Result};
use clap::Parser;
use tictactoe_net::{GameServer, ServerCli};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = ServerCli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tictactoe_net=debug")),
        )
        .init();

    let config = cli.into_config()?;
    let server = GameServer::bind(config)
        .await
        .context("Could not start server. Is the port already in use?")?;
    info!(addr = %server.local_addr()?, "Server ready, waiting for moves");

    let summary = server.run().await?;
    info!(
        outcome = %summary.outcome,
        moves = summary.history.len(),
        "Final board:\n{}",
        summary.board
    );

    Ok(())
}

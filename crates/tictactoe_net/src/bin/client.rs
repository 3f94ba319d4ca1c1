//! Tic-tac-toe client: sends one move and prints the server's reply.

use anyhow::Result;
use clap::Parser;
use tictactoe_net::{ClientCli, submit_move};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = ClientCli::parse();

    // stdout carries only the server's reply.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let response = submit_move(&cli.to_config(), cli.to_move()).await?;
    println!("{}", response.text());

    Ok(())
}

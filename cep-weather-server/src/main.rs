//! Binary crate for the `cep-weather` HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Exposing the temperature pipeline over HTTP

use clap::Parser;

mod cli;
mod server;
mod telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}

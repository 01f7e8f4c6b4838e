//! Development tasks for the dungeon scaling workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod utils;

use anyhow::Result;
use clap::Parser;
use commands::{CheckConfig, Curve, Simulate};

/// Development tasks for dungeon scaling
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for dungeon scaling", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Print the population curve of one instance
    Curve(Curve),

    /// Validate a scaling settings file
    CheckConfig(CheckConfig),

    /// Drive a scripted population scenario against an in-memory host
    Simulate(Simulate),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for SCALING_CONFIG and RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    utils::init_tracing(cli.verbose);

    match cli.command {
        Command::Curve(cmd) => cmd.execute(),
        Command::CheckConfig(cmd) => cmd.execute(),
        Command::Simulate(cmd) => cmd.execute(),
    }
}

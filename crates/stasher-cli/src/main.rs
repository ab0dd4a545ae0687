//! Stasher CLI
//!
//! Command-line interface for replaying framework events into log records

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "stasher")]
#[command(about = "Stasher - framework events to structured JSON log lines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON-lines event file through the subscriber
    Replay(commands::replay::ReplayArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay(args) => commands::replay::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

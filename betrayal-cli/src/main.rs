//! Betrayal CLI - Terminal host for the game client
//!
//! Commands:
//! - play: Connect to a server and play in the terminal
//! - board: Print the board geometry for a render extent
//! - whoami: Print the persisted player id

mod board;
mod play;
mod terminal;
mod whoami;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "betrayal")]
#[command(about = "Last-player-standing hex board game client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a match server and play
    Play(play::PlayArgs),
    /// Print board geometry for a render extent
    Board(board::BoardArgs),
    /// Print the persisted player id, creating one if needed
    Whoami(whoami::WhoamiArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the board on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args),
        Commands::Board(args) => board::run(args),
        Commands::Whoami(args) => whoami::run(args),
    }
}

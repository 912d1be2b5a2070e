//! Play command - connect to a match server and play in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_client(), load_identity(), play()
//! - Level 3: spawn_input_reader()
//! - Level 4: argument validation

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use betrayal_client::{
    connect, player_id, transport::check_url, ClientConfig, FileStore, LocalInput, Session,
    SessionError,
};

use crate::terminal::{parse_command, TerminalSurface, COMMANDS};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// WebSocket endpoint of the match server
    #[arg(long, default_value = "ws://localhost:8080/ws")]
    pub server: String,

    /// File holding the persisted player id
    #[arg(long, value_name = "FILE")]
    pub identity: Option<PathBuf>,

    /// Render width used to map `click` coordinates
    #[arg(long, default_value = "800")]
    pub width: f64,

    /// Render height used to map `click` coordinates
    #[arg(long, default_value = "800")]
    pub height: f64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build the client configuration
/// 2. Load or create the player id
/// 3. Connect and drive the session until quit or disconnect
pub fn run(args: PlayArgs) -> Result<()> {
    let config = configure_client(&args)?;
    let id = load_identity(&config)?;

    tracing::info!("Playing as {} against {}", id, config.server_url);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(play(config, id))
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn configure_client(args: &PlayArgs) -> Result<ClientConfig> {
    validate_server(&args.server)?;
    validate_extent(args.width, args.height)?;

    let mut config = ClientConfig::default()
        .with_server_url(&args.server)
        .with_extent(args.width, args.height);
    if let Some(path) = &args.identity {
        config = config.with_identity_path(path);
    }
    Ok(config)
}

fn load_identity(config: &ClientConfig) -> Result<String> {
    let mut store = FileStore::new(&config.identity_path);
    player_id(&mut store).with_context(|| {
        format!("Failed to load identity from {}", config.identity_path.display())
    })
}

async fn play(config: ClientConfig, id: String) -> Result<()> {
    let (transport, inbound) = connect(&config.server_url)
        .await
        .with_context(|| format!("Failed to reach {}", config.server_url))?;

    let surface = TerminalSurface::new(std::io::stdout());
    let session = Session::new(id, config, transport, surface)?;
    let inputs = spawn_input_reader();

    match session.run(inbound, inputs).await {
        Ok(()) => Ok(()),
        Err(SessionError::ConnectionClosed) => {
            bail!("Lost connection to the server, restart to play again")
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Read commands from stdin until EOF, which quits
fn spawn_input_reader() -> UnboundedReceiver<LocalInput> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{}", COMMANDS);

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if line.trim() == "help" {
                println!("{}", COMMANDS);
                continue;
            }
            match parse_command(&line) {
                Ok(input) => {
                    if tx.send(input).is_err() {
                        return;
                    }
                }
                Err(e) => eprintln!("{} (type help for commands)", e),
            }
        }

        let _ = tx.send(LocalInput::Quit);
    });

    rx
}

// ============================================================================
// LEVEL 4 - VALIDATION
// ============================================================================

fn validate_server(url: &str) -> Result<()> {
    if let Err(e) = check_url(url) {
        bail!("Invalid server url '{}': {}", url, e);
    }
    Ok(())
}

fn validate_extent(width: f64, height: f64) -> Result<()> {
    if !(width > 0.0 && height > 0.0) {
        bail!("Render extent must be positive, got {}x{}", width, height);
    }
    Ok(())
}

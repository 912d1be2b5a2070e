//! Whoami command - show the player id used in every intent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use betrayal_client::{player_id, ClientConfig, FileStore};

#[derive(Args)]
pub struct WhoamiArgs {
    /// File holding the persisted player id
    #[arg(long, value_name = "FILE")]
    pub identity: Option<PathBuf>,
}

pub fn run(args: WhoamiArgs) -> Result<()> {
    let path = args
        .identity
        .unwrap_or_else(|| ClientConfig::default().identity_path);

    let mut store = FileStore::new(&path);
    let id = player_id(&mut store)
        .with_context(|| format!("Failed to load identity from {}", path.display()))?;

    println!("{}", id);
    Ok(())
}

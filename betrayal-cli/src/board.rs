//! Board command - print the board geometry for a render extent
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: validate_extent(), print_summary(), print_cells()

use anyhow::{bail, Result};
use clap::Args;
use serde_json::json;

use betrayal_core::board::playable_cell_count;
use betrayal_core::{Board, Layout, DEFAULT_BOARD_SIZE};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct BoardArgs {
    /// Render width in pixels
    #[arg(long, default_value = "800")]
    pub width: f64,

    /// Render height in pixels
    #[arg(long, default_value = "800")]
    pub height: f64,

    /// Cells per side of the square board index
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    pub size: usize,

    /// Output every cell center as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: BoardArgs) -> Result<()> {
    validate_extent(&args)?;

    let layout = Layout::fit(args.width, args.height, args.size);
    let board = Board::build(args.size, &layout);

    if args.json {
        print_cells(&board, &layout)
    } else {
        print_summary(&board, &layout);
        Ok(())
    }
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn validate_extent(args: &BoardArgs) -> Result<()> {
    if !(args.width > 0.0 && args.height > 0.0) {
        bail!("Extent must be positive, got {}x{}", args.width, args.height);
    }
    if args.size < 3 || args.size % 2 == 0 {
        bail!("Board size must be odd and at least 3, got {}", args.size);
    }
    Ok(())
}

fn print_summary(board: &Board, layout: &Layout) {
    println!("Board size:      {}", board.size());
    println!("Playable cells:  {}", board.cells().count());
    println!("Expected cells:  {}", playable_cell_count(board.size()));
    println!("Extent:          {}x{}", layout.width, layout.height);
    println!("Cell radius:     {:.3}", layout.cell_radius);
    println!("Cell width:      {:.3}", layout.cell_width());
    println!("Cell height:     {:.3}", layout.cell_height());
}

fn print_cells(board: &Board, layout: &Layout) -> Result<()> {
    let cells: Vec<_> = board
        .cells()
        .map(|cell| json!({"hex": cell.hex, "center": cell.center}))
        .collect();
    let output = json!({
        "size": board.size(),
        "layout": layout,
        "cells": cells,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

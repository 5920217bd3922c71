use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Force-directed layout and timeline geometry for a roguelike lineage chart.
#[derive(Parser, Debug)]
#[command(name = "roguelike-lineage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the force layout and write positions plus timeline geometry as JSON
    Layout {
        /// Directory holding the generated data files
        #[arg(short, long)]
        data: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML layout configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for the initial positions
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many steps if the layout has not converged
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Step as fast as possible instead of once per frame
        #[arg(long)]
        immediate: bool,
    },
    /// Print the year axis: year, x position and hue per line
    Years {
        /// Directory holding the generated data files
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Write timeline arcs as JSON, optionally with a selected game marker
    Timeline {
        /// Directory holding the generated data files
        #[arg(short, long)]
        data: PathBuf,

        /// Title of the game to highlight
        #[arg(short, long)]
        select: Option<String>,
    },
}

//! tvplay CLI - Headless TV Player Driver
//!
//! Features:
//! - Scripted remote-control sessions on a simulated primitive
//! - Saved position inspection and cleanup

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

/// Default file backing the saved position store
const DEFAULT_POSITIONS_FILE: &str = "tvplay-positions.json";

/// tvplay CLI - Remote-driven video player toolkit
#[derive(Parser)]
#[command(name = "tvplay")]
#[command(version)]
#[command(about = "Drive tvplay sessions headlessly", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session on the simulated primitive
    Simulate {
        /// Content identifier used for saved positions
        #[arg(long, default_value = "demo")]
        id: String,

        /// Direct (progressive) media URL
        #[arg(long, default_value = "")]
        url: String,

        /// HLS manifest URL
        #[arg(long, default_value = "")]
        hls_url: String,

        /// Run as a TV form factor (prefers HLS)
        #[arg(long)]
        tv: bool,

        /// Simulated media duration in seconds
        #[arg(short, long, default_value = "600")]
        duration: f64,

        /// Remote keys to press, in order
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<String>,

        /// Time between key presses in milliseconds
        #[arg(long, default_value = "250")]
        step_ms: u64,

        /// Player configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Saved position file to load and update
        #[arg(short, long)]
        positions: Option<PathBuf>,
    },

    /// Inspect or edit saved positions
    Positions {
        /// Saved position file
        #[arg(long, global = true, default_value = DEFAULT_POSITIONS_FILE)]
        file: PathBuf,

        #[command(subcommand)]
        action: PositionsAction,
    },
}

#[derive(Subcommand)]
enum PositionsAction {
    /// List recent saved positions
    List,

    /// Remove one saved position
    Clear {
        /// Content identifier
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tvplay_core::init();

    match cli.command {
        Commands::Simulate {
            id,
            url,
            hls_url,
            tv,
            duration,
            keys,
            step_ms,
            config,
            positions,
        } => {
            let options = commands::SimulateOptions {
                id,
                url,
                hls_url,
                tv,
                duration,
                keys,
                step_ms,
                config,
                positions,
            };
            commands::simulate(options, &cli.format).await?;
        }
        Commands::Positions { file, action } => match action {
            PositionsAction::List => commands::positions_list(&file, &cli.format)?,
            PositionsAction::Clear { id } => commands::positions_clear(&file, &id)?,
        },
    }

    Ok(())
}

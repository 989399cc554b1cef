use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tessera_core::Size;
use tessera_render::RetainedSurface;
use tessera_runtime::WidgetManager;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Indented tree with positions and sizes
    Tree,
    /// Surface nodes as JSON
    Json,
}

#[derive(Parser)]
#[command(author, version, about = "Runs a widget command script and prints the laid-out tree", long_about = None)]
struct Args {
    /// JSON file holding an array of command tuples
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Viewport width
    #[arg(long, default_value = "800")]
    width: f64,

    /// Viewport height
    #[arg(long, default_value = "600")]
    height: f64,

    /// Output format
    #[arg(long, value_enum, default_value = "tree")]
    format: Format,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so the printed tree stays clean
    let level = if args.debug { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let source = fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script: {}", args.script.display()))?;
    let tuples: Vec<Value> = serde_json::from_str(&source)
        .with_context(|| format!("Script is not a JSON array of commands: {}", args.script.display()))?;
    info!("Loaded {} commands from {}", tuples.len(), args.script.display());

    let mut manager = WidgetManager::new(RetainedSurface::new());
    if let Err(e) = manager.handle_command_tuples(&tuples) {
        warn!("{}", e);
    }
    manager
        .resize(Size::new(args.width, args.height))
        .context("Failed to lay out the main widget")?;

    let output = match args.format {
        Format::Tree => manager.surface().dump_tree(),
        Format::Json => {
            let nodes: Vec<_> = manager.surface().nodes().collect();
            serde_json::to_string_pretty(&nodes).context("Failed to serialize surface nodes")? + "\n"
        }
    };
    print!("{}", output);

    Ok(())
}

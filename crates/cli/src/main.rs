//! tnn-run - Main Entry Point
//!
//! Loads a model through the tract engine, runs one forward pass over
//! JSON-encoded tensors, and prints the outputs as JSON on stdout.

mod settings;
mod tensors;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use inference_engine::TractEngine;
use model_loader::OutputMode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "tnn-run", version, about = "Run one forward pass of a model")]
struct Args {
    /// Model path (`.tnnproto` descriptor or serialized graph)
    #[arg(short, long)]
    model: PathBuf,

    /// Load configuration file (TOML, JSON, or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input tensors as JSON; read from stdin when omitted
    #[arg(short, long)]
    inputs: Option<PathBuf>,

    /// Output shape: "list" or "dict"
    #[arg(long, default_value = "list")]
    output_mode: String,

    /// Log level written to stderr
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    info!("=== tnn-run v{} ===", env!("CARGO_PKG_VERSION"));

    let config = settings::load_config_dict(args.config.as_deref())?;
    let mut module = model_loader::load(TractEngine::new(), &args.model, &config)
        .with_context(|| format!("loading {}", args.model.display()))?;

    let inputs = tensors::read_inputs(args.inputs.as_deref(), std::io::stdin())?;
    let mode: OutputMode = args.output_mode.parse()?;
    let outputs = module.forward(inputs, mode)?;

    println!("{}", serde_json::to_string_pretty(&tensors::outputs_to_json(&outputs)?)?);
    Ok(())
}

/// Initialize logging
fn init_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }
}

//! sma4 - SMA4 e-Reader level codec
//!
//! ```text
//! sma4 new <name> <out.json> [--config FILE]
//! sma4 encode <level.json> <out.bin> [--config FILE]
//! sma4 decode <in.bin>
//! sma4 import <in.bin> <out.json> [--config FILE]
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sma4_codec::{build_level_binary_with, import_level, parse_level_tree, EncodeOptions};
use sma4_config::CodecConfig;
use sma4_core::EntityIdSequence;
use sma4_levels::{Level, LevelLoader};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sma4")]
#[command(about = "SMA4 e-Reader level codec")]
struct Cli {
    /// Codec config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Write a fresh one-room level as JSON
    New { name: String, output: PathBuf },

    /// Encode a level JSON into e-Reader level bytes
    Encode { input: PathBuf, output: PathBuf },

    /// Print the parsed tree of a level binary as JSON
    Decode { input: PathBuf },

    /// Rebuild an editable level JSON from a level binary
    Import { input: PathBuf, output: PathBuf },
}

fn load_config(path: Option<&PathBuf>) -> Result<CodecConfig> {
    match path {
        Some(path) => CodecConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(CodecConfig::default()),
    }
}

fn run(cli: Cli, config: &CodecConfig) -> Result<()> {
    let ids = EntityIdSequence::new();

    match cli.command {
        Command::New { name, output } => {
            let mut level = Level::create_default(name);
            level.settings.timer = config.default_timer;
            LevelLoader::save_file(&level, &output, config.pretty_json)
                .with_context(|| format!("writing {}", output.display()))?;
            info!("created '{}' at {}", level.name, output.display());
        }
        Command::Encode { input, output } => {
            let level = LevelLoader::load_file(&input, &ids)
                .with_context(|| format!("reading {}", input.display()))?;
            let options = EncodeOptions {
                name_override: config.level_name.clone(),
            };
            let bytes = build_level_binary_with(&level, &options)
                .with_context(|| format!("encoding '{}'", level.name))?;
            fs::write(&output, &bytes).with_context(|| format!("writing {}", output.display()))?;
            info!("wrote {} bytes to {}", bytes.len(), output.display());
        }
        Command::Decode { input } => {
            let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let tree = parse_level_tree(&bytes).with_context(|| format!("parsing {}", input.display()))?;
            let json = if config.pretty_json {
                serde_json::to_string_pretty(&tree)?
            } else {
                serde_json::to_string(&tree)?
            };
            println!("{}", json);
        }
        Command::Import { input, output } => {
            let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let tree = parse_level_tree(&bytes).with_context(|| format!("parsing {}", input.display()))?;
            let level = import_level(&tree, config.import_room_height, &ids)?;
            LevelLoader::save_file(&level, &output, config.pretty_json)
                .with_context(|| format!("writing {}", output.display()))?;
            info!("imported '{}' to {}", level.name, output.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.config.is_some() {
        config.display();
    } else {
        warn!("no --config given, using defaults");
    }

    run(cli, &config)
}

mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

/// chartwave - wave-order validation for GitOps manifests
#[derive(Parser)]
#[command(name = "chartwave")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Check rendered manifests for duplicates and sync-wave ordering problems
  Validate {
    /// Manifest file: multi-document YAML, or a JSON array
    file: PathBuf,

    /// Validator configuration overriding the default conventions
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Print the effective validator configuration
  Rules {
    /// Validator configuration overriding the default conventions
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Validate { file, config, format } => {
      let ok = cmd::cmd_validate(&file, config.as_deref(), format)?;
      Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
    Commands::Rules { config } => {
      cmd::cmd_rules(config.as_deref())?;
      Ok(ExitCode::SUCCESS)
    }
  }
}

//! CLI parse: clap types for gapfill. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gapfill - fills missing taxonomy slots with generated recommendations
#[derive(Parser)]
#[command(name = "gapfill")]
#[command(about = "Fill missing (category, dimension, price band) recommendations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path, layered above the workspace files
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Store directory (overrides storage.path)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run rounds until interrupted
    Run,
    /// Run a single round and print its summary
    Once {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show required, satisfied and missing slot counts
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Load categories from a JSON or TOML file into the taxonomy store
    ImportTaxonomy {
        /// Taxonomy file
        file: PathBuf,
    },
}

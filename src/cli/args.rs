//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Default configuration file name
pub const DEFAULT_CONFIG: &str = "folding.toml";

/// Output format for the ranges command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Automatically detect if terminal supports color
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// foldrules CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "foldrules")]
#[command(about = "Compute code folding ranges from declarative rules")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring (defaults to the configuration, then auto)
    #[arg(long, global = true)]
    pub color: Option<ColorChoice>,

    /// Log compile and scan details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available foldrules subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print folding ranges for files
    Ranges {
        /// Files or directories to scan (defaults to current directory)
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Rule configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,

        /// Scan every file as this language instead of detecting it
        #[arg(short, long)]
        language: Option<String>,

        /// Output format (defaults to the configuration)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Compile every rule and report invalid ones
    Validate {
        /// Rule configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },

    /// Write a starter folding.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

//! Ranges command implementation
//!
//! This module implements the `foldrules ranges` command, which:
//! - Loads the rule configuration
//! - Compiles one rule set per language, logging dropped rules
//! - Discovers files and detects their languages
//! - Computes folding ranges in parallel
//! - Formats output (human or JSONL)

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{EXIT_ERROR, EXIT_PARSE_ERROR, EXIT_SUCCESS};
use crate::config::{Config, OutputFormat as ConfiguredFormat};
use crate::engine::{ExecutionEngine, ExecutionResult};
use crate::error::ConfigError;
use crate::output::{HumanFormatter, JsonlFormatter};
use crate::rules::TracingSink;
use crate::types::LanguageId;
use std::io::Write;
use std::path::PathBuf;
use termcolor::StandardStream;

/// Error type specific to the ranges command
#[derive(Debug, thiserror::Error)]
pub(crate) enum RangesError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File walker error: {0}")]
    FileWalker(#[from] crate::engine::file_walker::FileWalkerError),

    #[error("Invalid language '{0}'")]
    Language(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for the ranges command
#[derive(Debug, Clone)]
pub struct RangesOptions {
    pub paths: Vec<PathBuf>,
    pub config: PathBuf,
    pub language: Option<String>,
    pub format: Option<OutputFormat>,
    pub color: Option<ColorChoice>,
}

/// Run the ranges command
///
/// # Returns
///
/// Exit code:
/// - 0: Success
/// - 2: Error (configuration/I/O error)
/// - 3: Parse error (invalid configuration syntax)
pub fn run_ranges(options: &RangesOptions) -> i32 {
    match run_ranges_inner(options) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            match e {
                RangesError::Config(ConfigError::Parse(_)) => EXIT_PARSE_ERROR,
                _ => EXIT_ERROR,
            }
        }
    }
}

fn run_ranges_inner(options: &RangesOptions) -> Result<(), RangesError> {
    let config = super::common::load_config(&options.config)?;

    let forced = options
        .language
        .as_deref()
        .map(|language| {
            LanguageId::new(language).ok_or_else(|| RangesError::Language(language.to_string()))
        })
        .transpose()?;

    let registry = super::common::build_registry(&config, &mut TracingSink);
    let files = super::common::discover_files(&options.paths, &config, forced.as_ref())?;

    if files.is_empty() {
        tracing::warn!("no files found to scan");
    }

    let result = ExecutionEngine::new(registry).execute(files);
    write_output(&result, options, &config)?;
    Ok(())
}

fn write_output(
    result: &ExecutionResult,
    options: &RangesOptions,
    config: &Config,
) -> Result<(), RangesError> {
    let format = options.format.unwrap_or(match config.output.format {
        ConfiguredFormat::Human => OutputFormat::Human,
        ConfiguredFormat::Jsonl => OutputFormat::Jsonl,
    });

    match format {
        OutputFormat::Human => {
            let color = super::common::color_choice(options.color, config);
            let mut stdout = StandardStream::stdout(color);
            HumanFormatter::new().write(&mut stdout, result)?;
        }
        OutputFormat::Jsonl => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(JsonlFormatter::new().format(result).as_bytes())?;
        }
    }
    Ok(())
}

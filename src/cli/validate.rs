//! Validate command implementation
//!
//! Compiles every language section of the configuration and prints each
//! dropped rule and deprecated field.

use crate::cli::args::ColorChoice;
use crate::cli::common::{EXIT_ERROR, EXIT_INVALID_RULES, EXIT_PARSE_ERROR, EXIT_SUCCESS};
use crate::config::Config;
use crate::error::ConfigError;
use crate::rules::{CollectingSink, Diagnostic, RuleSetRegistry};
use std::io;
use std::path::Path;
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

/// Outcome of validating a configuration
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Number of language-specific rule sets
    pub languages: usize,
    /// Diagnostics in report order, duplicates removed
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Returns true if no rule was dropped
    pub fn is_valid(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::InvalidRule { .. }))
    }
}

/// Compile every rule set of `config` and collect diagnostics
///
/// Wildcard rules are compiled once per language, so identical diagnostics
/// are reported once.
pub fn validate_config(config: &Config) -> ValidationReport {
    let mut sink = CollectingSink::new();
    let registry = RuleSetRegistry::build(config, &mut sink);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    for diagnostic in sink.diagnostics {
        if !diagnostics.contains(&diagnostic) {
            diagnostics.push(diagnostic);
        }
    }

    ValidationReport {
        languages: registry.len(),
        diagnostics,
    }
}

/// Run the validate command
///
/// # Returns
///
/// Exit code:
/// - 0: Every rule compiled
/// - 1: One or more rules were dropped
/// - 2: Error (configuration/I/O error)
/// - 3: Parse error (invalid configuration syntax)
pub fn run_validate(config_path: &Path, color: Option<ColorChoice>) -> i32 {
    let config = match super::common::load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return match e {
                ConfigError::Parse(_) => EXIT_PARSE_ERROR,
                _ => EXIT_ERROR,
            };
        }
    };

    let report = validate_config(&config);
    let mut stdout = StandardStream::stdout(super::common::color_choice(color, &config));
    if let Err(e) = write_report(&mut stdout, &report) {
        eprintln!("Error: {}", e);
        return EXIT_ERROR;
    }

    if report.is_valid() {
        EXIT_SUCCESS
    } else {
        EXIT_INVALID_RULES
    }
}

fn write_report(out: &mut dyn WriteColor, report: &ValidationReport) -> io::Result<()> {
    for diagnostic in &report.diagnostics {
        match diagnostic {
            Diagnostic::InvalidRule { rule, reason } => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                write!(out, "invalid")?;
                out.reset()?;
                writeln!(out, " {}: {}", rule, reason)?;
            }
            Diagnostic::DeprecatedField { name } => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
                write!(out, "deprecated")?;
                out.reset()?;
                writeln!(out, " field `{}`, use `nested` instead", name)?;
            }
        }
    }

    let invalid = report
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::InvalidRule { .. }))
        .count();
    if invalid == 0 {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "✓")?;
        out.reset()?;
        writeln!(out, " all rules compiled ({} languages)", report.languages)
    } else {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        write!(out, "✗")?;
        out.reset()?;
        writeln!(out, " {} invalid rules", invalid)
    }
}

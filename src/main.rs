//! foldrules CLI entry point

use clap::Parser;
use foldrules::cli::common::EXIT_ERROR;
use foldrules::cli::init::{InitOutcome, run_init};
use foldrules::cli::ranges::{RangesOptions, run_ranges};
use foldrules::cli::validate::run_validate;
use foldrules::cli::{Command, args::Cli};
use std::path::Path;
use std::process;

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let exit_code = match cli.command {
        Command::Init { force } => match run_init(Path::new("."), force) {
            Ok(InitOutcome::Created(path)) | Ok(InitOutcome::Overwritten(path)) => {
                println!("Created {}. Adjust the rules for your languages.", path.display());
                0
            }
            Ok(InitOutcome::Skipped(path)) => {
                println!("{} already exists. Use --force to overwrite it.", path.display());
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
        Command::Ranges {
            paths,
            config,
            language,
            format,
        } => run_ranges(&RangesOptions {
            paths,
            config,
            language,
            format,
            color: cli.color,
        }),
        Command::Validate { config } => run_validate(&config, cli.color),
    };

    process::exit(exit_code);
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `--verbose`
fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("foldrules=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

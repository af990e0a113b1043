//! `ifrc-connector` entry point.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use ifrc_cli::cli::{Cli, Command};
use ifrc_cli::commands::{run_connector, run_countries};
use ifrc_cli::logging::{LogConfig, init_logging};
use ifrc_cli::summary::print_summary;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    let outcome = match &cli.command {
        Command::Run(args) => run_connector(args).map(|result| print_summary(&result)),
        Command::Countries => run_countries(),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// `--log-level` beats `-v`/`-q`; `RUST_LOG` applies only when neither is given.
fn log_config(cli: &Cli) -> LogConfig {
    let explicit = cli.log_level.map(LevelFilter::from);
    let to_terminal = cli.log_file.is_none() && io::stderr().is_terminal();
    LogConfig {
        level_filter: explicit.unwrap_or_else(|| cli.verbosity.tracing_level_filter()),
        use_env_filter: explicit.is_none() && !cli.verbosity.is_present(),
        with_timestamps: cli.log_file.is_some(),
        with_ansi: match cli.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => to_terminal,
        },
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
        ..LogConfig::default()
    }
}

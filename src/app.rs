//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments into a `ConvertConfig`
//! - runs the conversion pipeline
//! - logs the run summary

use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};
use log::info;

use crate::cli::Cli;
use crate::domain::ConvertConfig;
use crate::error::AppError;

pub mod pipeline;

/// Version banner, also stored in every grid header.
pub const VERSION: &str = concat!("bin2grid V", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the log level spec (e.g. `debug`, `bin2grid=trace`).
pub const LOG_ENV: &str = "BIN2GRID_LOG";

/// Entry point for the `bin2grid` binary.
pub fn run() -> Result<(), AppError> {
    let _logger = init_logging();
    let cli = Cli::parse();

    info!("{VERSION}");

    let config = config_from_cli(&cli)?;
    let run = pipeline::run_conversion(&config, true)?;

    for line in crate::report::format_run_summary(&run) {
        info!("{line}");
    }
    info!("Conversion complete");
    Ok(())
}

pub fn config_from_cli(cli: &Cli) -> Result<ConvertConfig, AppError> {
    Ok(ConvertConfig {
        source_path: cli.source_path()?,
        output_path: cli.output_path(),
        uncertainty: !cli.no_uncertainty,
        uncertainty_bound_percent: cli.uncertainty_bound,
        grid_type: cli.grid_type()?,
    })
}

/// Start the stderr logger. `.env` files are honoured.
///
/// A logger that fails to start is reported and the run continues without it.
fn init_logging() -> Option<LoggerHandle> {
    dotenvy::dotenv().ok();
    let spec = std::env::var(LOG_ENV).unwrap_or_else(|_| "info".to_string());
    match Logger::try_with_str(&spec).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Logger initialization failed with {e}; continuing without logs");
            None
        }
    }
}

//! Command-line parsing for the bin-to-grid converter.
//!
//! The goal of this module is to keep **argument parsing** and **file naming
//! rules** separate from the conversion code.

use std::path::PathBuf;

use clap::Parser;

use crate::data::BIN_EXTENSION;
use crate::domain::GridType;
use crate::error::AppError;
use crate::io::GRID_EXTENSION;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "bin2grid",
    version,
    about = "Convert a binned sounding database into a single-valued depth grid"
)]
pub struct Cli {
    /// Maximum total uncertainty, as a percentage of depth.
    ///
    /// Cells whose uncertainty exceeds this bound store the null uncertainty.
    #[arg(value_name = "UNCERTAINTY_BOUND")]
    pub uncertainty_bound: u32,

    /// Do not store horizontal/vertical uncertainty (total uncertainty is still stored).
    #[arg(long = "no_uncertainty")]
    pub no_uncertainty: bool,

    /// Grid type: M (MISP), G (GMT) or N (NONE, no gap filling).
    #[arg(long = "grid_type", value_name = "GRID_TYPE", default_value = "M")]
    pub grid_type: String,

    /// Output grid file. Defaults to SOURCE_FILE with `.pfm` replaced by `.ch2`;
    /// `.ch2` is appended when missing.
    #[arg(long = "output_file", value_name = "GRID_FILE")]
    pub output_file: Option<String>,

    /// Bin database (`.pfm`).
    #[arg(value_name = "SOURCE_FILE")]
    pub source_file: String,
}

impl Cli {
    pub fn grid_type(&self) -> Result<GridType, AppError> {
        GridType::from_flag(&self.grid_type)
            .ok_or_else(|| AppError::usage(format!("Unknown grid type '{}'. Use M, G or N.", self.grid_type)))
    }

    pub fn source_path(&self) -> Result<PathBuf, AppError> {
        if !self.source_file.contains(BIN_EXTENSION) {
            return Err(AppError::usage(format!(
                "Source file '{}' is not a {BIN_EXTENSION} bin file.",
                self.source_file
            )));
        }
        Ok(PathBuf::from(&self.source_file))
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(output_file_name(&self.source_file, self.output_file.as_deref()))
    }
}

/// Resolve the output grid name.
///
/// Rules:
/// - no name (or a name shorter than 2 characters) -> source name with its
///   `.pfm` extension replaced by `.ch2`
/// - a name without a trailing `.ch2` -> `.ch2` appended
/// - otherwise unchanged
pub fn output_file_name(source: &str, explicit: Option<&str>) -> String {
    match explicit {
        Some(name) if name.chars().count() >= 2 => {
            if name.ends_with(GRID_EXTENSION) {
                name.to_string()
            } else {
                format!("{name}{GRID_EXTENSION}")
            }
        }
        _ => {
            let stem = source.strip_suffix(BIN_EXTENSION).unwrap_or(source);
            format!("{stem}{GRID_EXTENSION}")
        }
    }
}

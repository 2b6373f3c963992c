//! Bin database collaborator.
//!
//! The converter only needs three things from a bin database: its header, the
//! summary record of one bin, and the soundings stored in one bin. Anything
//! that can answer those (a file on disk, an in-memory fixture) implements
//! [`BinDatabase`].

use serde::{Deserialize, Serialize};

use crate::domain::{BinCell, GridCoord, Sounding};

pub mod bin_file;
pub mod memory;

pub use bin_file::BinFile;
pub use memory::MemoryBins;

/// Recognised file extension of bin databases.
pub const BIN_EXTENSION: &str = ".pfm";

#[derive(Debug, thiserror::Error)]
pub enum BinError {
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid bin file {path}: {message}")]
    Parse { path: String, message: String },
    #[error("bin (row {row}, col {col}) is outside the {height}x{width} bin grid")]
    OutOfBounds {
        row: u32,
        col: u32,
        height: u32,
        width: u32,
    },
    #[error("projected (non-geographic) bin databases are not supported")]
    Projected,
}

/// Bin database header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinHeader {
    /// Outer bounds of the bin grid (degrees): west, south, east, north edges.
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub x_bin_size_degrees: f64,
    pub y_bin_size_degrees: f64,
    pub bin_width: u32,
    pub bin_height: u32,
    /// Set when the database uses a projected coordinate system.
    #[serde(default)]
    pub projected: bool,
    /// Depth scale factor of the stored values.
    #[serde(default = "default_scale")]
    pub depth_scale: f32,
    #[serde(default = "default_scale")]
    pub horizontal_error_scale: f32,
    #[serde(default = "default_scale")]
    pub vertical_error_scale: f32,
}

fn default_scale() -> f32 {
    100.0
}

impl BinHeader {
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.row < self.bin_height && coord.col < self.bin_width
    }

    pub(crate) fn check_bounds(&self, coord: GridCoord) -> Result<(), BinError> {
        if self.contains(coord) {
            Ok(())
        } else {
            Err(BinError::OutOfBounds {
                row: coord.row,
                col: coord.col,
                height: self.bin_height,
                width: self.bin_width,
            })
        }
    }
}

/// Read access to a bin-organised sounding database.
pub trait BinDatabase {
    fn header(&self) -> &BinHeader;

    /// Summary record for one bin.
    fn read_bin(&self, coord: GridCoord) -> Result<BinCell, BinError>;

    /// All soundings stored in one bin. The caller owns the returned list.
    fn read_soundings(&self, coord: GridCoord) -> Result<Vec<Sounding>, BinError>;
}

/// Reject databases this converter cannot grid.
pub fn ensure_geographic(header: &BinHeader) -> Result<(), BinError> {
    if header.projected {
        return Err(BinError::Projected);
    }
    Ok(())
}

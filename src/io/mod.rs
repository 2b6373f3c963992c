//! Output grid collaborator.
//!
//! - `GridStore`: one-cell-at-a-time access used by both conversion passes
//! - `GridFile`: the on-disk raster (`grid_file`)
//! - `MemoryGrid`: an in-memory grid for tests (`memory`)

use crate::domain::{GridCell, GridCoord, GridHeader};

pub mod grid_file;
pub mod memory;

pub use grid_file::{GridAccess, GridFile};
pub use memory::MemoryGrid;

/// Recognised file extension of output grids.
pub const GRID_EXTENSION: &str = ".ch2";

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },
    #[error("{path} is not a grid file or is damaged: {message}")]
    Corrupt { path: String, message: String },
    #[error("grid header is {len} bytes, the header block holds at most {max}")]
    HeaderTooLarge { len: usize, max: usize },
    #[error("cell (row {row}, col {col}) is outside the grid")]
    OutOfBounds { row: u32, col: u32 },
    #[error("a {height}x{width} grid is too large")]
    TooLarge { height: u32, width: u32 },
    #[error("header dimensions cannot change after creation")]
    DimensionsChanged,
    #[error("grid was opened read-only")]
    ReadOnly,
}

/// Cell-level access to an open grid.
///
/// Writes reach the underlying storage immediately; nothing is buffered
/// across cells. Implementations do not track statistics of written values.
pub trait GridStore {
    fn header(&self) -> &GridHeader;

    fn read(&mut self, coord: GridCoord) -> Result<GridCell, GridError>;

    fn write(&mut self, coord: GridCoord, cell: &GridCell) -> Result<(), GridError>;

    /// Replace the stored header. Grid dimensions must not change.
    fn update_header(&mut self, header: &GridHeader) -> Result<(), GridError>;
}

pub(crate) fn cell_index(header: &GridHeader, coord: GridCoord) -> Result<u64, GridError> {
    if coord.row >= header.height || coord.col >= header.width {
        return Err(GridError::OutOfBounds {
            row: coord.row,
            col: coord.col,
        });
    }
    Ok(u64::from(coord.row) * u64::from(header.width) + u64::from(coord.col))
}

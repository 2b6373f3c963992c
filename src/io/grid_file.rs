//! Binary grid files.
//!
//! Layout:
//!
//! ```text
//! offset 0      magic "BIN2GRD1"
//! offset 8      header length (u32 LE)
//! offset 12     header JSON, padded with spaces up to HEADER_BLOCK_SIZE
//! HEADER_BLOCK  rows * cols records, row-major from the south-west cell
//! ```
//!
//! Each record is `RECORD_SIZE` bytes, little-endian:
//! status (u8), z, uncertainty, horizontal, vertical (f32), point count (u32).
//! An all-zero record is a `Null` cell, so a freshly sized file is an empty grid.
//! The header block has a fixed size so header updates never move records.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::domain::{CellStatus, GridCell, GridCoord, GridHeader};
use crate::io::{GridError, GridStore, cell_index};

const MAGIC: &[u8; 8] = b"BIN2GRD1";
const HEADER_BLOCK_SIZE: u64 = 16 * 1024;
const HEADER_PREFIX: usize = MAGIC.len() + 4;
pub const RECORD_SIZE: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAccess {
    ReadOnly,
    Update,
}

/// An open grid file.
#[derive(Debug)]
pub struct GridFile {
    path: PathBuf,
    file: File,
    header: GridHeader,
    access: GridAccess,
}

impl GridFile {
    /// Create (or truncate) a grid file with every cell `Null`.
    pub fn create(path: &Path, header: &GridHeader) -> Result<Self, GridError> {
        let len = file_len(header)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| io_error(path, e))?;

        let mut grid = Self {
            path: path.to_path_buf(),
            file,
            header: header.clone(),
            access: GridAccess::Update,
        };
        grid.write_header_block()?;
        grid.file.set_len(len).map_err(|e| io_error(path, e))?;
        Ok(grid)
    }

    /// Open an existing grid file, validating its magic and size.
    pub fn open(path: &Path, access: GridAccess) -> Result<Self, GridError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(access == GridAccess::Update)
            .open(path)
            .map_err(|e| io_error(path, e))?;

        let mut prefix = [0u8; HEADER_PREFIX];
        file.read_exact(&mut prefix)
            .map_err(|e| corrupt(path, format!("short header: {e}")))?;
        if &prefix[..MAGIC.len()] != MAGIC {
            return Err(corrupt(path, "bad magic"));
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&prefix[MAGIC.len()..]);
        let header_len = u32::from_le_bytes(len_bytes) as usize;
        if header_len > HEADER_BLOCK_SIZE as usize - HEADER_PREFIX {
            return Err(corrupt(path, format!("header length {header_len} exceeds header block")));
        }

        let mut json = vec![0u8; header_len];
        file.read_exact(&mut json)
            .map_err(|e| corrupt(path, format!("short header: {e}")))?;
        let header: GridHeader =
            serde_json::from_slice(&json).map_err(|e| corrupt(path, format!("invalid header: {e}")))?;

        let expected = file_len(&header).map_err(|e| corrupt(path, e.to_string()))?;
        let actual = file.metadata().map_err(|e| io_error(path, e))?.len();
        if actual != expected {
            return Err(corrupt(
                path,
                format!("file is {actual} bytes, a {}x{} grid needs {expected}", header.height, header.width),
            ));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            access,
        })
    }

    /// Flush everything to disk and close the file.
    pub fn close(self) -> Result<(), GridError> {
        if self.access == GridAccess::Update {
            self.file.sync_all().map_err(|e| io_error(&self.path, e))?;
        }
        Ok(())
    }

    fn write_header_block(&mut self) -> Result<(), GridError> {
        let json = serde_json::to_vec(&self.header).map_err(|e| GridError::Io {
            path: self.path.display().to_string(),
            message: format!("failed to encode header: {e}"),
        })?;
        let max = HEADER_BLOCK_SIZE as usize - HEADER_PREFIX;
        if json.len() > max {
            return Err(GridError::HeaderTooLarge { len: json.len(), max });
        }

        let mut block = Vec::with_capacity(HEADER_BLOCK_SIZE as usize);
        block.extend_from_slice(MAGIC);
        block.extend_from_slice(&(json.len() as u32).to_le_bytes());
        block.extend_from_slice(&json);
        block.resize(HEADER_BLOCK_SIZE as usize, b' ');

        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.write_all(&block))
            .map_err(|e| io_error(&self.path, e))
    }

    fn record_offset(&self, coord: GridCoord) -> Result<u64, GridError> {
        Ok(HEADER_BLOCK_SIZE + cell_index(&self.header, coord)? * RECORD_SIZE as u64)
    }
}

impl GridStore for GridFile {
    fn header(&self) -> &GridHeader {
        &self.header
    }

    fn read(&mut self, coord: GridCoord) -> Result<GridCell, GridError> {
        let offset = self.record_offset(coord)?;
        let mut buf = [0u8; RECORD_SIZE];
        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.read_exact(&mut buf))
            .map_err(|e| io_error(&self.path, e))?;
        decode_record(&buf).ok_or_else(|| {
            corrupt(
                &self.path,
                format!("unknown status {} at row {}, col {}", buf[0], coord.row, coord.col),
            )
        })
    }

    fn write(&mut self, coord: GridCoord, cell: &GridCell) -> Result<(), GridError> {
        if self.access != GridAccess::Update {
            return Err(GridError::ReadOnly);
        }
        let offset = self.record_offset(coord)?;
        let buf = encode_record(cell);
        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.write_all(&buf))
            .map_err(|e| io_error(&self.path, e))
    }

    fn update_header(&mut self, header: &GridHeader) -> Result<(), GridError> {
        if self.access != GridAccess::Update {
            return Err(GridError::ReadOnly);
        }
        if header.width != self.header.width || header.height != self.header.height {
            return Err(GridError::DimensionsChanged);
        }
        let previous = std::mem::replace(&mut self.header, header.clone());
        if let Err(e) = self.write_header_block() {
            self.header = previous;
            return Err(e);
        }
        Ok(())
    }
}

fn encode_record(cell: &GridCell) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    buf[0] = cell.status().to_byte();
    buf[1..5].copy_from_slice(&cell.z.to_le_bytes());
    buf[5..9].copy_from_slice(&cell.uncertainty.to_le_bytes());
    buf[9..13].copy_from_slice(&cell.horizontal_uncertainty.to_le_bytes());
    buf[13..17].copy_from_slice(&cell.vertical_uncertainty.to_le_bytes());
    buf[17..21].copy_from_slice(&cell.number_of_points.to_le_bytes());
    buf
}

fn decode_record(buf: &[u8; RECORD_SIZE]) -> Option<GridCell> {
    let status = CellStatus::from_byte(buf[0])?;
    let f = |i: usize| f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
    let count = u32::from_le_bytes([buf[17], buf[18], buf[19], buf[20]]);
    Some(GridCell::from_stored(status, f(1), f(5), f(9), f(13), count))
}

/// Total file size for a grid with this header.
fn file_len(header: &GridHeader) -> Result<u64, GridError> {
    header
        .cell_count()
        .checked_mul(RECORD_SIZE as u64)
        .and_then(|records| records.checked_add(HEADER_BLOCK_SIZE))
        .ok_or(GridError::TooLarge {
            height: header.height,
            width: header.width,
        })
}

fn io_error(path: &Path, e: std::io::Error) -> GridError {
    GridError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn corrupt(path: &Path, message: impl Into<String>) -> GridError {
    GridError::Corrupt {
        path: path.display().to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory::test_header;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("bin2grid-{}.ch2", uuid::Uuid::new_v4()))
    }

    #[test]
    fn new_grid_is_all_null() {
        let path = temp_path();
        let mut grid = GridFile::create(&path, &test_header(3, 4)).unwrap();
        for row in 0..3 {
            for col in 0..4 {
                let cell = grid.read(GridCoord::new(row, col)).unwrap();
                assert_eq!(cell, GridCell::null());
            }
        }
        grid.close().unwrap();
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn written_cell_reads_back_identically_after_reopen() {
        let path = temp_path();
        let header = test_header(3, 4);
        let mut cell = GridCell::observed(true);
        cell.z = 12.25;
        cell.uncertainty = 2.0;
        cell.horizontal_uncertainty = 19_999.0;
        cell.vertical_uncertainty = 0.2;
        cell.number_of_points = 3;

        let mut grid = GridFile::create(&path, &header).unwrap();
        grid.write(GridCoord::new(2, 3), &cell).unwrap();
        assert_eq!(grid.read(GridCoord::new(2, 3)).unwrap(), cell);
        grid.close().unwrap();

        let mut grid = GridFile::open(&path, GridAccess::ReadOnly).unwrap();
        assert_eq!(grid.header(), &header);
        assert_eq!(grid.read(GridCoord::new(2, 3)).unwrap(), cell);
        assert_eq!(grid.read(GridCoord::new(2, 2)).unwrap(), GridCell::null());
        assert!(matches!(
            grid.write(GridCoord::new(0, 0), &cell),
            Err(GridError::ReadOnly)
        ));
        grid.close().unwrap();
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn header_update_persists_without_touching_records() {
        let path = temp_path();
        let header = test_header(2, 2);
        let mut grid = GridFile::create(&path, &header).unwrap();
        let mut cell = GridCell::observed(false);
        cell.z = 5.0;
        grid.write(GridCoord::new(1, 1), &cell).unwrap();

        let mut updated = header.clone();
        updated.min_observed_z = 5.0;
        updated.max_observed_z = 5.0;
        grid.update_header(&updated).unwrap();

        let mut resized = header.clone();
        resized.width = 3;
        assert!(matches!(grid.update_header(&resized), Err(GridError::DimensionsChanged)));
        grid.close().unwrap();

        let mut grid = GridFile::open(&path, GridAccess::Update).unwrap();
        assert_eq!(grid.header().max_observed_z, 5.0);
        assert_eq!(grid.read(GridCoord::new(1, 1)).unwrap(), cell);
        grid.close().unwrap();
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn open_rejects_foreign_and_truncated_files() {
        let path = temp_path();
        std::fs::write(&path, b"definitely not a grid file").unwrap();
        assert!(matches!(
            GridFile::open(&path, GridAccess::ReadOnly),
            Err(GridError::Corrupt { .. })
        ));

        GridFile::create(&path, &test_header(2, 2)).unwrap().close().unwrap();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(HEADER_BLOCK_SIZE + 10).unwrap();
        drop(file);
        assert!(matches!(
            GridFile::open(&path, GridAccess::ReadOnly),
            Err(GridError::Corrupt { .. })
        ));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_creation() {
        let path = temp_path();
        let header = test_header(u32::MAX, u32::MAX);
        assert!(matches!(
            GridFile::create(&path, &header),
            Err(GridError::TooLarge { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn out_of_bounds_cells_are_rejected() {
        let path = temp_path();
        let mut grid = GridFile::create(&path, &test_header(2, 2)).unwrap();
        assert!(matches!(
            grid.read(GridCoord::new(0, 2)),
            Err(GridError::OutOfBounds { row: 0, col: 2 })
        ));
        grid.close().unwrap();
        let _ = std::fs::remove_file(path);
    }
}

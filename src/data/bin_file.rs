//! JSON bin database files.
//!
//! Layout:
//!
//! ```text
//! {
//!   "header": { "min_x": .., "min_y": .., "max_x": .., "max_y": ..,
//!               "x_bin_size_degrees": .., "y_bin_size_degrees": ..,
//!               "bin_width": .., "bin_height": .., "projected": false, .. },
//!   "bins": [
//!     { "row": 0, "col": 3, "standard_dev": 0.4,
//!       "soundings": [ { "depth": 12.1, "horizontal_error": 1.5,
//!                        "vertical_error": 0.3, "flags": { "deleted": true } } ] }
//!   ]
//! }
//! ```
//!
//! Bins are sparse: any bin not listed reads as an empty bin without data.
//! `has_data` defaults to "has at least one sounding" when omitted.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{BinDatabase, BinError, BinHeader};
use crate::domain::{BinCell, GridCoord, Sounding};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinFileDocument {
    pub header: BinHeader,
    #[serde(default)]
    pub bins: Vec<StoredBin>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBin {
    pub row: u32,
    pub col: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_data: Option<bool>,
    #[serde(default)]
    pub standard_dev: f32,
    #[serde(default)]
    pub soundings: Vec<Sounding>,
}

#[derive(Debug, Clone)]
struct BinEntry {
    cell: BinCell,
    soundings: Vec<Sounding>,
}

/// A bin database loaded from a JSON file.
#[derive(Debug, Clone)]
pub struct BinFile {
    header: BinHeader,
    bins: HashMap<GridCoord, BinEntry>,
}

impl BinFile {
    pub fn open(path: &Path) -> Result<Self, BinError> {
        let file = File::open(path).map_err(|e| BinError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let doc: BinFileDocument =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| BinError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::from_document(doc).map_err(|e| match e {
            BinError::OutOfBounds { .. } => BinError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            },
            other => other,
        })
    }

    pub fn from_document(doc: BinFileDocument) -> Result<Self, BinError> {
        let header = doc.header;
        let mut bins = HashMap::with_capacity(doc.bins.len());
        for stored in doc.bins {
            let coord = GridCoord::new(stored.row, stored.col);
            header.check_bounds(coord)?;
            let has_data = stored.has_data.unwrap_or(!stored.soundings.is_empty());
            bins.insert(
                coord,
                BinEntry {
                    cell: BinCell {
                        has_data,
                        standard_dev: stored.standard_dev,
                    },
                    soundings: stored.soundings,
                },
            );
        }
        Ok(Self { header, bins })
    }

    /// Write a document to disk (fixtures and tooling).
    pub fn write_document(path: &Path, doc: &BinFileDocument) -> Result<(), BinError> {
        let file = File::create(path).map_err(|e| BinError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::to_writer_pretty(file, doc).map_err(|e| BinError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl BinDatabase for BinFile {
    fn header(&self) -> &BinHeader {
        &self.header
    }

    fn read_bin(&self, coord: GridCoord) -> Result<BinCell, BinError> {
        self.header.check_bounds(coord)?;
        Ok(self
            .bins
            .get(&coord)
            .map(|entry| entry.cell)
            .unwrap_or_default())
    }

    fn read_soundings(&self, coord: GridCoord) -> Result<Vec<Sounding>, BinError> {
        self.header.check_bounds(coord)?;
        Ok(self
            .bins
            .get(&coord)
            .map(|entry| entry.soundings.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "header": {
            "min_x": -80.0, "min_y": 30.0, "max_x": -79.99, "max_y": 30.01,
            "x_bin_size_degrees": 0.005, "y_bin_size_degrees": 0.005,
            "bin_width": 2, "bin_height": 2
        },
        "bins": [
            { "row": 1, "col": 0, "standard_dev": 0.25,
              "soundings": [
                { "depth": 10.0, "vertical_error": 0.1 },
                { "depth": 11.0, "flags": { "deleted": true } }
              ] },
            { "row": 0, "col": 1, "has_data": false }
        ]
    }"#;

    fn load() -> BinFile {
        let doc: BinFileDocument = serde_json::from_str(DOC).unwrap();
        BinFile::from_document(doc).unwrap()
    }

    #[test]
    fn reads_listed_and_missing_bins() {
        let bins = load();
        assert_eq!(bins.header().depth_scale, 100.0);
        assert!(!bins.header().projected);

        let cell = bins.read_bin(GridCoord::new(1, 0)).unwrap();
        assert!(cell.has_data);
        assert_eq!(cell.standard_dev, 0.25);
        let soundings = bins.read_soundings(GridCoord::new(1, 0)).unwrap();
        assert_eq!(soundings.len(), 2);
        assert!(soundings[1].flags.deleted);

        assert!(!bins.read_bin(GridCoord::new(0, 1)).unwrap().has_data);
        assert!(!bins.read_bin(GridCoord::new(0, 0)).unwrap().has_data);
        assert!(bins.read_soundings(GridCoord::new(0, 0)).unwrap().is_empty());
    }

    #[test]
    fn rejects_out_of_bounds() {
        let bins = load();
        assert!(matches!(
            bins.read_bin(GridCoord::new(2, 0)),
            Err(BinError::OutOfBounds { row: 2, .. })
        ));

        let mut doc: BinFileDocument = serde_json::from_str(DOC).unwrap();
        doc.bins[0].col = 5;
        assert!(BinFile::from_document(doc).is_err());
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("missing-{}.pfm", uuid::Uuid::new_v4()));
        assert!(matches!(BinFile::open(&path), Err(BinError::Io { .. })));
    }
}

//! In-memory bin database.

use std::collections::HashMap;

use crate::data::{BinDatabase, BinError, BinHeader};
use crate::domain::{BinCell, GridCoord, Sounding};

#[derive(Debug, Clone)]
pub struct MemoryBins {
    header: BinHeader,
    bins: HashMap<GridCoord, (BinCell, Vec<Sounding>)>,
}

impl MemoryBins {
    pub fn new(header: BinHeader) -> Self {
        Self {
            header,
            bins: HashMap::new(),
        }
    }

    /// Store a bin with data. Replaces any previous bin at `coord`.
    pub fn insert(&mut self, coord: GridCoord, standard_dev: f32, soundings: Vec<Sounding>) {
        let cell = BinCell {
            has_data: true,
            standard_dev,
        };
        self.bins.insert(coord, (cell, soundings));
    }

    /// Store a bin whose summary record says it has no data.
    pub fn insert_empty(&mut self, coord: GridCoord, soundings: Vec<Sounding>) {
        self.bins.insert(coord, (BinCell::default(), soundings));
    }
}

impl BinDatabase for MemoryBins {
    fn header(&self) -> &BinHeader {
        &self.header
    }

    fn read_bin(&self, coord: GridCoord) -> Result<BinCell, BinError> {
        self.header.check_bounds(coord)?;
        Ok(self.bins.get(&coord).map(|(cell, _)| *cell).unwrap_or_default())
    }

    fn read_soundings(&self, coord: GridCoord) -> Result<Vec<Sounding>, BinError> {
        self.header.check_bounds(coord)?;
        Ok(self
            .bins
            .get(&coord)
            .map(|(_, soundings)| soundings.clone())
            .unwrap_or_default())
    }
}

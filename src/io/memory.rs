//! In-memory grid.

use crate::domain::{GridCell, GridCoord, GridHeader};
use crate::io::{GridError, GridStore, cell_index};

#[derive(Debug, Clone)]
pub struct MemoryGrid {
    header: GridHeader,
    cells: Vec<GridCell>,
    writes: usize,
}

impl MemoryGrid {
    pub fn new(header: GridHeader) -> Result<Self, GridError> {
        let len = usize::try_from(header.cell_count()).map_err(|_| GridError::TooLarge {
            height: header.height,
            width: header.width,
        })?;
        Ok(Self {
            header,
            cells: vec![GridCell::null(); len],
            writes: 0,
        })
    }

    /// Number of successful `write` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

}

impl GridStore for MemoryGrid {
    fn header(&self) -> &GridHeader {
        &self.header
    }

    fn read(&mut self, coord: GridCoord) -> Result<GridCell, GridError> {
        let idx = cell_index(&self.header, coord)? as usize;
        Ok(self.cells[idx])
    }

    fn write(&mut self, coord: GridCoord, cell: &GridCell) -> Result<(), GridError> {
        let idx = cell_index(&self.header, coord)? as usize;
        self.cells[idx] = *cell;
        self.writes += 1;
        Ok(())
    }

    fn update_header(&mut self, header: &GridHeader) -> Result<(), GridError> {
        if header.width != self.header.width || header.height != self.header.height {
            return Err(GridError::DimensionsChanged);
        }
        self.header = header.clone();
        Ok(())
    }
}

/// A small geographic grid header for tests.
#[cfg(test)]
pub(crate) fn test_header(height: u32, width: u32) -> GridHeader {
    use chrono::TimeZone;

    use crate::domain::{GeoBounds, GridType, NULL_Z_VALUE, ZUnits};

    GridHeader {
        creation_software: "bin2grid tests".to_string(),
        creation_time: chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        z_units: ZUnits::Meters,
        grid_type: GridType::Misp,
        bounds: GeoBounds {
            wlon: -80.0,
            slat: 30.0,
            elon: -80.0 + 0.01 * f64::from(width - 1),
            nlat: 30.0 + 0.01 * f64::from(height - 1),
        },
        width,
        height,
        lat_grid_size_degrees: 0.01,
        lon_grid_size_degrees: 0.01,
        min_z: -NULL_Z_VALUE,
        max_z: NULL_Z_VALUE,
        z_scale: 100.0,
        min_observed_z: 0.0,
        max_observed_z: 0.0,
        max_number_of_points: crate::domain::MAX_NUMBER_OF_POINTS,
        uncertainty_name: "Standard Deviation".to_string(),
        min_uncertainty: 0.0,
        max_uncertainty: NULL_Z_VALUE,
        uncertainty_scale: 100.0,
        min_horizontal_uncertainty: 0.0,
        max_horizontal_uncertainty: crate::domain::MAX_HORIZONTAL_UNCERTAINTY,
        horizontal_uncertainty_scale: 100.0,
        min_vertical_uncertainty: 0.0,
        max_vertical_uncertainty: crate::domain::MAX_VERTICAL_UNCERTAINTY,
        vertical_uncertainty_scale: 100.0,
    }
}

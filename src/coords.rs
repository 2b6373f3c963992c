//! Geographic <-> grid-unit coordinate mapping.
//!
//! The interpolation engine works in zero-based units of the cell size: `x`
//! runs from `0.0` at the west edge to `cols` at the east edge, `y` from `0.0`
//! at the south edge to `rows` at the north edge.
//!
//! The engine also grids on *corner posts*: a value is associated with the
//! lower-left corner of a cell rather than its centre. Grid headers place
//! their origin at the centre of the south-west bin, so a cell's geographic
//! position maps onto an integer post by subtracting the origin, dividing by
//! the cell size and rounding to the nearest integer. Rounding can shift a
//! point by up to half a cell; output compatibility depends on it.

use crate::domain::{GridCoord, GridHeader};

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    origin: GeoPoint,
    lon_size: f64,
    lat_size: f64,
}

impl CoordinateMapper {
    pub fn new(origin: GeoPoint, lon_size: f64, lat_size: f64) -> Self {
        Self {
            origin,
            lon_size,
            lat_size,
        }
    }

    pub fn from_header(header: &GridHeader) -> Self {
        Self::new(
            GeoPoint {
                lon: header.bounds.wlon,
                lat: header.bounds.slat,
            },
            header.lon_grid_size_degrees,
            header.lat_grid_size_degrees,
        )
    }

    /// Geographic position of a cell from its row/col.
    pub fn to_geographic(&self, coord: GridCoord) -> GeoPoint {
        GeoPoint {
            lon: self.origin.lon + f64::from(coord.col) * self.lon_size,
            lat: self.origin.lat + f64::from(coord.row) * self.lat_size,
        }
    }

    /// Corner-post grid-unit position `(x, y)` of a geographic point.
    pub fn to_grid_units(&self, point: GeoPoint) -> (f64, f64) {
        (
            ((point.lon - self.origin.lon) / self.lon_size).round(),
            ((point.lat - self.origin.lat) / self.lat_size).round(),
        )
    }
}

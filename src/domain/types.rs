//! Shared domain types.
//!
//! These types are intentionally small and copyable so they can be:
//!
//! - read one bin / one grid cell at a time during the conversion passes
//! - (de)serialized by the bin database and grid file collaborators
//! - compared directly in tests

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for "no data": used for depth and total uncertainty.
///
/// A measured depth or uncertainty of exactly `0.0` is stored as this value.
pub const NULL_Z_VALUE: f32 = 10_000_000.0;

/// Upper bound on the point count a single grid cell can record.
pub const MAX_NUMBER_OF_POINTS: u32 = 16_777_215;

/// Horizontal uncertainty range stored when uncertainty is enabled.
pub const MAX_HORIZONTAL_UNCERTAINTY: f32 = 20_000.0;
/// Vertical uncertainty range stored when uncertainty is enabled.
pub const MAX_VERTICAL_UNCERTAINTY: f32 = 10_000.0;

/// Zero-based `(row, col)` address of a bin or grid cell.
///
/// Row 0 is the southern-most row, col 0 the western-most column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub row: u32,
    pub col: u32,
}

impl GridCoord {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Per-sounding validity flags, as recorded by the bin database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundingFlags {
    pub invalid: bool,
    pub deleted: bool,
    pub reference: bool,
    /// The sounding was digitized from a hand-drawn contour.
    pub hand_drawn: bool,
}

impl SoundingFlags {
    /// True when the sounding must not contribute to the bin statistics.
    pub fn is_rejected(self) -> bool {
        self.invalid || self.deleted || self.reference
    }
}

/// One raw depth observation inside a bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sounding {
    pub depth: f64,
    #[serde(default)]
    pub horizontal_error: f64,
    #[serde(default)]
    pub vertical_error: f64,
    #[serde(default)]
    pub flags: SoundingFlags,
}

/// Summary record for one bin of the source database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BinCell {
    pub has_data: bool,
    pub standard_dev: f32,
}

/// Cell status in the output grid.
///
/// Lifecycle: every cell starts `Null`. Aggregation may turn it into `Real` or
/// `DigitizedContour`; the fill pass may turn a cell that is still `Null` into
/// `Interpolated`. Nothing ever moves a cell back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellStatus {
    #[default]
    Null,
    Real,
    DigitizedContour,
    Interpolated,
}

impl CellStatus {
    /// Cells that carry an observed (non-interpolated) value.
    pub fn is_observed(self) -> bool {
        matches!(self, CellStatus::Real | CellStatus::DigitizedContour)
    }

    pub fn to_byte(self) -> u8 {
        match self {
            CellStatus::Null => 0,
            CellStatus::Real => 1,
            CellStatus::DigitizedContour => 2,
            CellStatus::Interpolated => 3,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(CellStatus::Null),
            1 => Some(CellStatus::Real),
            2 => Some(CellStatus::DigitizedContour),
            3 => Some(CellStatus::Interpolated),
            _ => None,
        }
    }
}

/// One record of the output grid.
///
/// The status is private: a `GridCell` can only become `Interpolated` through
/// [`NullCell::interpolate`], and a `NullCell` can only be obtained from a cell
/// whose status is `Null`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridCell {
    status: CellStatus,
    pub z: f32,
    pub uncertainty: f32,
    pub horizontal_uncertainty: f32,
    pub vertical_uncertainty: f32,
    pub number_of_points: u32,
}

impl GridCell {
    /// An empty cell, as created by the grid file.
    pub fn null() -> Self {
        Self::default()
    }

    /// A cell built from observed soundings.
    ///
    /// `drawn` selects `DigitizedContour` over `Real`.
    pub fn observed(drawn: bool) -> Self {
        Self {
            status: if drawn {
                CellStatus::DigitizedContour
            } else {
                CellStatus::Real
            },
            ..Self::default()
        }
    }

    /// Rebuild a cell from its stored fields (grid file decoding).
    pub(crate) fn from_stored(
        status: CellStatus,
        z: f32,
        uncertainty: f32,
        horizontal_uncertainty: f32,
        vertical_uncertainty: f32,
        number_of_points: u32,
    ) -> Self {
        Self {
            status,
            z,
            uncertainty,
            horizontal_uncertainty,
            vertical_uncertainty,
            number_of_points,
        }
    }

    pub fn status(&self) -> CellStatus {
        self.status
    }

    /// Claim this cell for the fill pass. Returns `None` unless it is still `Null`.
    pub fn into_null(self) -> Option<NullCell> {
        (self.status == CellStatus::Null).then_some(NullCell(self))
    }
}

/// A grid cell known to have status `Null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullCell(GridCell);

impl NullCell {
    /// The only way to produce an `Interpolated` cell.
    pub fn interpolate(self, z: f32) -> GridCell {
        GridCell {
            status: CellStatus::Interpolated,
            z,
            ..self.0
        }
    }
}

/// Which gridding method the fill pass uses (or none).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    None,
    Misp,
    Gmt,
}

impl GridType {
    /// Parse the `--grid_type` value by its first recognised letter.
    ///
    /// `n` wins over `m`, which wins over `g`, matching case-insensitively
    /// anywhere in the string. `NONE` and `misp` work as spelled out; `GMT`
    /// contains an `m` and therefore selects MISP, so GMT is requested as `g`.
    pub fn from_flag(value: &str) -> Option<Self> {
        let lower = value.to_ascii_lowercase();
        if lower.contains('n') {
            Some(GridType::None)
        } else if lower.contains('m') {
            Some(GridType::Misp)
        } else if lower.contains('g') {
            Some(GridType::Gmt)
        } else {
            None
        }
    }

    /// True when the fill pass should run.
    pub fn fills(self) -> bool {
        self != GridType::None
    }
}

/// Units of the z values stored in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZUnits {
    Meters,
}

/// Geographic bounding rectangle (degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub wlon: f64,
    pub slat: f64,
    pub elon: f64,
    pub nlat: f64,
}

/// Output grid header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridHeader {
    pub creation_software: String,
    pub creation_time: DateTime<Utc>,
    pub z_units: ZUnits,
    pub grid_type: GridType,
    pub bounds: GeoBounds,
    pub width: u32,
    pub height: u32,
    pub lat_grid_size_degrees: f64,
    pub lon_grid_size_degrees: f64,

    pub min_z: f32,
    pub max_z: f32,
    pub z_scale: f32,
    pub min_observed_z: f32,
    pub max_observed_z: f32,

    pub max_number_of_points: u32,
    pub uncertainty_name: String,
    pub min_uncertainty: f32,
    pub max_uncertainty: f32,
    pub uncertainty_scale: f32,
    pub min_horizontal_uncertainty: f32,
    pub max_horizontal_uncertainty: f32,
    pub horizontal_uncertainty_scale: f32,
    pub min_vertical_uncertainty: f32,
    pub max_vertical_uncertainty: f32,
    pub vertical_uncertainty_scale: f32,
}

impl GridHeader {
    /// Total number of cells in the grid.
    pub fn cell_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// True when `z` is inside the legal depth range.
    pub fn z_in_range(&self, z: f32) -> bool {
        z >= self.min_z && z <= self.max_z
    }

    /// Sentinel for "a value was produced but it is outside `[min_z, max_z]`".
    pub fn out_of_range_z(&self) -> f32 {
        self.max_z + 1.0
    }

    /// True when horizontal/vertical uncertainty are stored in this grid.
    pub fn stores_hv_uncertainty(&self) -> bool {
        self.horizontal_uncertainty_scale != 0.0 || self.vertical_uncertainty_scale != 0.0
    }
}

/// A full run's configuration, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    /// Store horizontal/vertical uncertainty.
    pub uncertainty: bool,
    /// Maximum total uncertainty as a percentage of depth.
    pub uncertainty_bound_percent: u32,
    pub grid_type: GridType,
}

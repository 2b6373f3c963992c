//! The conversion pipeline shared by the binary and the tests.
//!
//! bin database -> grid header -> aggregation pass -> header update -> (reopen) -> fill pass
//!
//! Every failure aborts the run immediately. A grid file that was already
//! created is left on disk as far as it got.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::info;

use crate::data::{BinDatabase, BinFile, BinHeader, ensure_geographic};
use crate::domain::{
    ConvertConfig, GeoBounds, GridHeader, MAX_HORIZONTAL_UNCERTAINTY, MAX_NUMBER_OF_POINTS, MAX_VERTICAL_UNCERTAINTY,
    NULL_Z_VALUE, ZUnits,
};
use crate::error::AppError;
use crate::fill::{FillOutcome, PlaneEngine, SurfaceEngine, fill_gaps};
use crate::io::{GridAccess, GridFile, GridStore};
use crate::reduce::{AggregationOutcome, CapPolicy, aggregate_grid};
use crate::report::{StatusCounts, count_statuses};

/// All outputs of a single conversion run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub output_path: PathBuf,
    pub header: GridHeader,
    pub aggregation: AggregationOutcome,
    pub fill: Option<FillOutcome>,
    pub statuses: StatusCounts,
}

/// Convert the bin file named in `config` using the reference engine.
pub fn run_conversion(config: &ConvertConfig, show_progress: bool) -> Result<RunOutput, AppError> {
    let db = BinFile::open(&config.source_path)?;
    run_conversion_with(&db, config, &mut PlaneEngine::new(), show_progress)
}

/// Convert an already open bin database with the given engine.
pub fn run_conversion_with<D, E>(
    db: &D,
    config: &ConvertConfig,
    engine: &mut E,
    show_progress: bool,
) -> Result<RunOutput, AppError>
where
    D: BinDatabase + ?Sized,
    E: SurfaceEngine + ?Sized,
{
    ensure_geographic(db.header())?;

    info!(
        "Rejecting any uncertainty values greater than {} percent of depth",
        config.uncertainty_bound_percent
    );

    // 1) Create the grid and aggregate every bin into it.
    let mut header = build_header(db.header(), config, Utc::now());
    let mut grid = GridFile::create(&config.output_path, &header)?;
    let policy = CapPolicy::new(config, &header);
    let aggregation = aggregate_grid(db, &mut grid, &policy, show_progress)?;

    // 2) Persist the observed depth range.
    aggregation.observed.apply_to(&mut header);
    grid.update_header(&header)?;
    grid.close()?;

    // 3) Fill the remaining gaps if requested.
    let fill = if config.grid_type.fills() {
        let mut grid = GridFile::open(&config.output_path, GridAccess::Update).map_err(|e| {
            AppError::io(format!(
                "The file {} is not a grid file or there was an error reading the file: {e}",
                config.output_path.display()
            ))
        })?;
        let hint = usize::try_from(aggregation.cells_written).unwrap_or(0);
        let outcome = fill_gaps(&mut grid, engine, hint)?;
        grid.close()?;
        Some(outcome)
    } else {
        None
    };

    let mut grid = GridFile::open(&config.output_path, GridAccess::ReadOnly)?;
    let statuses = count_statuses(&mut grid)?;
    grid.close()?;

    Ok(RunOutput {
        output_path: config.output_path.clone(),
        header,
        aggregation,
        fill,
        statuses,
    })
}

/// Build the output grid header from the bin database header.
///
/// Grid posts sit at bin centres, so the bounds are the bin grid's outer
/// edges pulled in by half a bin on every side.
pub fn build_header(bins: &BinHeader, config: &ConvertConfig, created: DateTime<Utc>) -> GridHeader {
    let half_x = bins.x_bin_size_degrees / 2.0;
    let half_y = bins.y_bin_size_degrees / 2.0;

    let (h_range, h_scale, v_range, v_scale) = if config.uncertainty {
        (
            MAX_HORIZONTAL_UNCERTAINTY,
            bins.horizontal_error_scale,
            MAX_VERTICAL_UNCERTAINTY,
            bins.vertical_error_scale,
        )
    } else {
        (0.0, 0.0, 0.0, 0.0)
    };

    GridHeader {
        creation_software: crate::app::VERSION.to_string(),
        creation_time: created,
        z_units: ZUnits::Meters,
        grid_type: config.grid_type,
        bounds: GeoBounds {
            wlon: bins.min_x + half_x,
            slat: bins.min_y + half_y,
            elon: bins.max_x - half_x,
            nlat: bins.max_y - half_y,
        },
        width: bins.bin_width,
        height: bins.bin_height,
        lat_grid_size_degrees: bins.y_bin_size_degrees,
        lon_grid_size_degrees: bins.x_bin_size_degrees,
        min_z: -NULL_Z_VALUE,
        max_z: NULL_Z_VALUE,
        z_scale: bins.depth_scale,
        min_observed_z: 0.0,
        max_observed_z: 0.0,
        max_number_of_points: MAX_NUMBER_OF_POINTS,
        uncertainty_name: "Standard Deviation".to_string(),
        min_uncertainty: 0.0,
        max_uncertainty: NULL_Z_VALUE,
        uncertainty_scale: bins.depth_scale,
        min_horizontal_uncertainty: 0.0,
        max_horizontal_uncertainty: h_range,
        horizontal_uncertainty_scale: h_scale,
        min_vertical_uncertainty: 0.0,
        max_vertical_uncertainty: v_range,
        vertical_uncertainty_scale: v_scale,
    }
}

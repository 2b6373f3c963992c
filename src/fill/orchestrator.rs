//! Gap fill: interpolate the cells the aggregation pass left empty.
//!
//! Workflow:
//! observed cells -> corner-post grid units -> engine -> rows -> still-`Null` cells
//!
//! Cells that already hold an observed value are never written. A filled value
//! outside the header's `[min_z, max_z]` is stored as `max_z + 1`, which means
//! "out of range", not "no data".

use log::{info, warn};

use crate::coords::CoordinateMapper;
use crate::domain::GridCoord;
use crate::error::{AppError, EXIT_EMPTY};
use crate::fill::engine::{EngineError, EngineParams, SurfaceEngine, SurfacePoint};
use crate::io::GridStore;

/// What the fill pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOutcome {
    pub points_loaded: usize,
    pub rows_retrieved: u32,
    pub cells_filled: u64,
    pub cells_out_of_range: u64,
}

/// Collect every observed cell as an engine point in grid units.
///
/// `capacity_hint` is the expected number of observed cells.
pub fn collect_points<G: GridStore + ?Sized>(
    grid: &mut G,
    capacity_hint: usize,
) -> Result<Vec<SurfacePoint>, AppError> {
    let header = grid.header().clone();
    let mapper = CoordinateMapper::from_header(&header);
    let mut points = Vec::with_capacity(capacity_hint);

    for row in 0..header.height {
        for col in 0..header.width {
            let coord = GridCoord::new(row, col);
            let cell = grid.read(coord)?;
            if !cell.status().is_observed() {
                continue;
            }
            let (x, y) = mapper.to_grid_units(mapper.to_geographic(coord));
            points.push(SurfacePoint {
                x,
                y,
                z: f64::from(cell.z),
            });
        }
    }
    Ok(points)
}

/// Run the fill pass over an open grid.
pub fn fill_gaps<G, E>(grid: &mut G, engine: &mut E, capacity_hint: usize) -> Result<FillOutcome, AppError>
where
    G: GridStore + ?Sized,
    E: SurfaceEngine + ?Sized,
{
    let header = grid.header().clone();
    let points = collect_points(grid, capacity_hint)?;
    if points.is_empty() {
        return Err(AppError::new(EXIT_EMPTY, "No data points found for gridding!"));
    }

    let params = EngineParams::for_grid(header.width, header.height);
    engine.init(&params)?;
    let points_loaded = points.len();
    for p in points {
        engine.load(p)?;
    }

    info!("Computing surface from {points_loaded} points");
    engine.run()?;

    info!("Retrieving surface");
    let mut outcome = FillOutcome {
        points_loaded,
        ..FillOutcome::default()
    };
    let needed = header.width as usize;
    let out_of_range = header.out_of_range_z();

    for row in 0..header.height {
        let Some(values) = engine.next_row() else {
            warn!(
                "engine stopped after {row} of {} rows; remaining empty cells stay empty",
                header.height
            );
            break;
        };
        if values.len() < needed {
            return Err(EngineError::ShortRow {
                row,
                len: values.len(),
                needed,
            }
            .into());
        }
        outcome.rows_retrieved += 1;

        for (col, &value) in values.iter().take(needed).enumerate() {
            let coord = GridCoord::new(row, col as u32);
            let Some(empty) = grid.read(coord)?.into_null() else {
                continue;
            };

            let z = if header.z_in_range(value) {
                value
            } else {
                outcome.cells_out_of_range += 1;
                out_of_range
            };
            grid.write(coord, &empty.interpolate(z))?;
            outcome.cells_filled += 1;
        }
    }

    Ok(outcome)
}

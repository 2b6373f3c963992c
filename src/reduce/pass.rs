//! The aggregation pass: every bin, row-major, into the output grid.

use std::io::Write;

use log::debug;

use crate::data::BinDatabase;
use crate::domain::GridCoord;
use crate::error::AppError;
use crate::io::GridStore;
use crate::reduce::aggregate::aggregate_bin;
use crate::reduce::cap::CapPolicy;
use crate::reduce::range::ObservedRange;

/// What the aggregation pass produced.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregationOutcome {
    pub observed: ObservedRange,
    pub cells_written: u64,
}

/// Percentage of rows completed, reported only when it changes.
#[derive(Debug, Clone)]
pub struct RowProgress {
    total_rows: u32,
    last: Option<u32>,
}

impl RowProgress {
    pub fn new(total_rows: u32) -> Self {
        Self {
            total_rows,
            last: None,
        }
    }

    /// Record that `rows_done` rows are complete. Returns the new percentage
    /// if it differs from the last one reported.
    pub fn advance(&mut self, rows_done: u32) -> Option<u32> {
        if self.total_rows == 0 {
            return None;
        }
        let percent = (u64::from(rows_done) * 100 / u64::from(self.total_rows)) as u32;
        if self.last == Some(percent) {
            return None;
        }
        self.last = Some(percent);
        Some(percent)
    }
}

/// Reduce every bin of `db` into `grid`.
///
/// Cells whose bin yields nothing are not written and stay `Null`. The
/// observed depth range is folded here and returned; the caller stores it in
/// the header. The first failing read or write aborts the pass.
pub fn aggregate_grid<D, G>(
    db: &D,
    grid: &mut G,
    policy: &CapPolicy,
    show_progress: bool,
) -> Result<AggregationOutcome, AppError>
where
    D: BinDatabase + ?Sized,
    G: GridStore + ?Sized,
{
    let rows = db.header().bin_height;
    let cols = db.header().bin_width;
    let mut outcome = AggregationOutcome::default();
    let mut progress = RowProgress::new(rows);

    for row in 0..rows {
        for col in 0..cols {
            let coord = GridCoord::new(row, col);
            let Some(agg) = aggregate_bin(db, coord, policy.uncertainty)? else {
                continue;
            };

            let cell = policy.apply(&agg);
            outcome.observed.include(cell.z, grid.header());
            grid.write(coord, &cell)?;
            outcome.cells_written += 1;
        }

        if let Some(percent) = progress.advance(row + 1) {
            if show_progress {
                eprint!("Processing - {percent:03}%\r");
                let _ = std::io::stderr().flush();
            }
        }
    }
    if show_progress {
        eprintln!();
    }

    debug!(
        "aggregation wrote {} of {} cells",
        outcome.cells_written,
        u64::from(rows) * u64::from(cols)
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BinHeader, MemoryBins};
    use crate::domain::{
        CellStatus, MAX_HORIZONTAL_UNCERTAINTY, MAX_NUMBER_OF_POINTS, NULL_Z_VALUE, Sounding, SoundingFlags,
    };
    use crate::io::MemoryGrid;
    use crate::io::memory::test_header;

    fn bins(height: u32, width: u32) -> MemoryBins {
        MemoryBins::new(BinHeader {
            min_x: -80.005,
            min_y: 29.995,
            max_x: -80.005 + 0.01 * f64::from(width),
            max_y: 29.995 + 0.01 * f64::from(height),
            x_bin_size_degrees: 0.01,
            y_bin_size_degrees: 0.01,
            bin_width: width,
            bin_height: height,
            projected: false,
            depth_scale: 100.0,
            horizontal_error_scale: 100.0,
            vertical_error_scale: 100.0,
        })
    }

    fn s(depth: f64) -> Sounding {
        Sounding {
            depth,
            horizontal_error: 1.0,
            vertical_error: 0.5,
            flags: SoundingFlags::default(),
        }
    }

    fn policy() -> CapPolicy {
        CapPolicy {
            uncertainty: true,
            bound_percent: 50,
            max_horizontal_uncertainty: MAX_HORIZONTAL_UNCERTAINTY,
            max_number_of_points: MAX_NUMBER_OF_POINTS,
        }
    }

    #[test]
    fn writes_only_bins_with_surviving_soundings() {
        let mut db = bins(2, 3);
        db.insert(GridCoord::new(0, 0), 1.0, vec![s(10.0), s(12.0), s(14.0)]);
        db.insert(GridCoord::new(1, 2), 0.5, vec![s(30.0)]);
        let mut deleted = s(99.0);
        deleted.flags.deleted = true;
        db.insert(GridCoord::new(1, 0), 0.5, vec![deleted]);

        let mut grid = MemoryGrid::new(test_header(2, 3)).unwrap();
        let outcome = aggregate_grid(&db, &mut grid, &policy(), false).unwrap();

        assert_eq!(outcome.cells_written, 2);
        assert_eq!(grid.write_count(), 2);
        assert_eq!(outcome.observed.min(), Some(12.0));
        assert_eq!(outcome.observed.max(), Some(30.0));

        let cell = grid.read(GridCoord::new(0, 0)).unwrap();
        assert_eq!(cell.status(), CellStatus::Real);
        assert_eq!(cell.z, 12.0);
        assert_eq!(cell.uncertainty, 2.0);
        assert_eq!(grid.read(GridCoord::new(1, 0)).unwrap().status(), CellStatus::Null);
    }

    #[test]
    fn zero_depth_bins_are_written_but_not_observed() {
        let mut db = bins(1, 2);
        db.insert(GridCoord::new(0, 0), 0.5, vec![s(-1.0), s(1.0)]);
        db.insert(GridCoord::new(0, 1), 0.5, vec![s(4.0)]);

        let mut grid = MemoryGrid::new(test_header(1, 2)).unwrap();
        let outcome = aggregate_grid(&db, &mut grid, &policy(), false).unwrap();

        let cell = grid.read(GridCoord::new(0, 0)).unwrap();
        assert_eq!(cell.status(), CellStatus::Real);
        assert_eq!(cell.z, NULL_Z_VALUE);
        assert_eq!(outcome.observed.min(), Some(4.0));
        assert_eq!(outcome.observed.max(), Some(4.0));
    }

    #[test]
    fn progress_reports_changes_only() {
        let mut p = RowProgress::new(300);
        assert_eq!(p.advance(1), Some(0));
        assert_eq!(p.advance(2), None);
        assert_eq!(p.advance(3), Some(1));
        assert_eq!(p.advance(300), Some(100));
        assert_eq!(RowProgress::new(0).advance(0), None);
    }
}

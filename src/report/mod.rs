//! Reporting utilities: cell status counts and the end-of-run summary.

use crate::app::pipeline::RunOutput;
use crate::domain::{CellStatus, GridCoord};
use crate::error::AppError;
use crate::io::GridStore;

/// Number of grid cells in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub null: u64,
    pub real: u64,
    pub digitized_contour: u64,
    pub interpolated: u64,
}

impl StatusCounts {
    pub fn add(&mut self, status: CellStatus) {
        match status {
            CellStatus::Null => self.null += 1,
            CellStatus::Real => self.real += 1,
            CellStatus::DigitizedContour => self.digitized_contour += 1,
            CellStatus::Interpolated => self.interpolated += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.null + self.real + self.digitized_contour + self.interpolated
    }
}

/// Count cell statuses over a whole grid.
pub fn count_statuses<G: GridStore + ?Sized>(grid: &mut G) -> Result<StatusCounts, AppError> {
    let (height, width) = (grid.header().height, grid.header().width);
    let mut counts = StatusCounts::default();
    for row in 0..height {
        for col in 0..width {
            counts.add(grid.read(GridCoord::new(row, col))?.status());
        }
    }
    Ok(counts)
}

/// Format the run summary, one line per item.
pub fn format_run_summary(run: &RunOutput) -> Vec<String> {
    let mut lines = Vec::new();
    let h = &run.header;
    lines.push(format!("Output: {}", run.output_path.display()));
    lines.push(format!("Grid: {} rows x {} cols ({:?})", h.height, h.width, h.grid_type));

    if run.aggregation.observed.is_empty() {
        lines.push("Observed depth: none".to_string());
    } else {
        lines.push(format!(
            "Observed depth: [{:.3}, {:.3}]",
            h.min_observed_z, h.max_observed_z
        ));
    }

    let s = &run.statuses;
    lines.push(format!(
        "Cells: real={} contour={} interpolated={} null={} (total {})",
        s.real,
        s.digitized_contour,
        s.interpolated,
        s.null,
        s.total()
    ));

    if let Some(fill) = &run.fill {
        lines.push(format!(
            "Fill: {} points, {} rows, {} cells filled ({} out of range)",
            fill.points_loaded, fill.rows_retrieved, fill.cells_filled, fill.cells_out_of_range
        ));
    }
    lines
}

//! Sentinel and clamping rules applied to a bin aggregate.
//!
//! Rules, in order:
//!
//! 1. horizontal uncertainty at or above the stored maximum is clamped to `max - 1`
//! 2. total uncertainty above `bound_percent` of the depth becomes `NULL_Z_VALUE`
//! 3. total uncertainty of exactly `0.0` becomes `NULL_Z_VALUE`
//! 4. depth of exactly `0.0` becomes `NULL_Z_VALUE`
//!
//! None of these are errors; they are expected data conditions.

use crate::domain::{ConvertConfig, GridCell, GridHeader, NULL_Z_VALUE};
use crate::reduce::aggregate::BinAggregate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapPolicy {
    /// Store horizontal/vertical uncertainty.
    pub uncertainty: bool,
    /// Maximum total uncertainty as a percentage of depth.
    pub bound_percent: u32,
    pub max_horizontal_uncertainty: f32,
    pub max_number_of_points: u32,
}

impl CapPolicy {
    pub fn new(config: &ConvertConfig, header: &GridHeader) -> Self {
        Self {
            uncertainty: config.uncertainty,
            bound_percent: config.uncertainty_bound_percent,
            max_horizontal_uncertainty: header.max_horizontal_uncertainty,
            max_number_of_points: header.max_number_of_points,
        }
    }

    /// Finalize an aggregate into the grid record that gets written.
    pub fn apply(&self, agg: &BinAggregate) -> GridCell {
        let mut cell = GridCell::observed(agg.drawn);

        if self.uncertainty {
            cell.vertical_uncertainty = agg.mean_vertical_error as f32;

            let horizontal = agg.mean_horizontal_error as f32;
            cell.horizontal_uncertainty = if horizontal >= self.max_horizontal_uncertainty {
                self.max_horizontal_uncertainty - 1.0
            } else {
                horizontal
            };
        }

        cell.number_of_points = agg.count.min(self.max_number_of_points);
        cell.z = agg.mean_depth as f32;
        cell.uncertainty = agg.total_uncertainty as f32;

        let bound = cell.z * (self.bound_percent as f32 / 100.0);
        if cell.uncertainty > bound {
            cell.uncertainty = NULL_Z_VALUE;
        }
        if cell.uncertainty == 0.0 {
            cell.uncertainty = NULL_Z_VALUE;
        }
        if cell.z == 0.0 {
            cell.z = NULL_Z_VALUE;
        }

        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellStatus, MAX_HORIZONTAL_UNCERTAINTY, MAX_NUMBER_OF_POINTS};

    fn policy(bound_percent: u32) -> CapPolicy {
        CapPolicy {
            uncertainty: true,
            bound_percent,
            max_horizontal_uncertainty: MAX_HORIZONTAL_UNCERTAINTY,
            max_number_of_points: MAX_NUMBER_OF_POINTS,
        }
    }

    fn aggregate(depth: f64, total: f64) -> BinAggregate {
        BinAggregate {
            mean_depth: depth,
            mean_horizontal_error: 2.0,
            mean_vertical_error: 0.2,
            total_uncertainty: total,
            count: 3,
            drawn: false,
        }
    }

    #[test]
    fn within_bound_is_kept() {
        let cell = policy(50).apply(&aggregate(12.0, 2.0));
        assert_eq!(cell.status(), CellStatus::Real);
        assert_eq!(cell.z, 12.0);
        assert_eq!(cell.uncertainty, 2.0);
        assert_eq!(cell.vertical_uncertainty, 0.2);
        assert_eq!(cell.horizontal_uncertainty, 2.0);
        assert_eq!(cell.number_of_points, 3);
    }

    #[test]
    fn exceeding_bound_becomes_null_not_clamped() {
        // 50% of 12 m is 6 m.
        let cell = policy(50).apply(&aggregate(12.0, 6.5));
        assert_eq!(cell.uncertainty, NULL_Z_VALUE);
        let cell = policy(50).apply(&aggregate(12.0, 6.0));
        assert_eq!(cell.uncertainty, 6.0);
        // Heights above the datum have a negative bound.
        let cell = policy(50).apply(&aggregate(-3.0, 0.5));
        assert_eq!(cell.uncertainty, NULL_Z_VALUE);
    }

    #[test]
    fn zero_uncertainty_and_depth_become_null() {
        let cell = policy(50).apply(&aggregate(12.0, 0.0));
        assert_eq!(cell.uncertainty, NULL_Z_VALUE);

        let cell = policy(50).apply(&aggregate(0.0, 0.0));
        assert_eq!(cell.z, NULL_Z_VALUE);
        assert_eq!(cell.uncertainty, NULL_Z_VALUE);
    }

    #[test]
    fn horizontal_uncertainty_stays_below_maximum() {
        let mut agg = aggregate(12.0, 2.0);
        for h in [19_998.5, 20_000.0, 45_000.0] {
            agg.mean_horizontal_error = h;
            let cell = policy(50).apply(&agg);
            assert!(cell.horizontal_uncertainty < MAX_HORIZONTAL_UNCERTAINTY);
        }
        agg.mean_horizontal_error = 20_000.0;
        assert_eq!(policy(50).apply(&agg).horizontal_uncertainty, 19_999.0);
    }

    #[test]
    fn disabled_uncertainty_leaves_hv_empty() {
        let mut p = policy(50);
        p.uncertainty = false;
        let mut agg = aggregate(12.0, 2.0);
        agg.mean_horizontal_error = 30_000.0;
        let cell = p.apply(&agg);
        assert_eq!(cell.horizontal_uncertainty, 0.0);
        assert_eq!(cell.vertical_uncertainty, 0.0);
        assert_eq!(cell.uncertainty, 2.0);
    }

    #[test]
    fn drawn_aggregate_is_digitized_contour() {
        let mut agg = aggregate(12.0, 2.0);
        agg.drawn = true;
        assert_eq!(policy(50).apply(&agg).status(), CellStatus::DigitizedContour);
    }

    #[test]
    fn point_count_is_capped() {
        let mut p = policy(50);
        p.max_number_of_points = 2;
        assert_eq!(p.apply(&aggregate(12.0, 2.0)).number_of_points, 2);
    }
}

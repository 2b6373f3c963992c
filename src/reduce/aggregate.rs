//! Per-bin statistical reduction.
//!
//! Every sounding that is not flagged invalid, deleted or reference contributes
//! to the bin's mean depth and (when uncertainty is enabled) to its mean
//! horizontal and vertical error. A single hand-drawn contributor marks the
//! whole bin as a digitized contour.

use crate::data::{BinDatabase, BinError};
use crate::domain::{BinCell, GridCoord, Sounding};

/// The total uncertainty stored for a bin is this multiple of the bin's
/// standard deviation.
pub const STD_DEV_MULTIPLIER: f64 = 2.0;

/// Reduced statistics of one bin, before any capping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinAggregate {
    pub mean_depth: f64,
    pub mean_horizontal_error: f64,
    pub mean_vertical_error: f64,
    pub total_uncertainty: f64,
    pub count: u32,
    pub drawn: bool,
}

/// Read one bin and reduce it.
///
/// Returns `Ok(None)` when the bin has no data or no sounding survives the
/// validity filter; the grid cell then stays `Null`.
pub fn aggregate_bin<D: BinDatabase + ?Sized>(
    db: &D,
    coord: GridCoord,
    uncertainty: bool,
) -> Result<Option<BinAggregate>, BinError> {
    let cell = db.read_bin(coord)?;
    if !cell.has_data {
        return Ok(None);
    }
    let soundings = db.read_soundings(coord)?;
    Ok(reduce_soundings(cell, &soundings, uncertainty))
}

/// Reduce the soundings of one bin.
pub fn reduce_soundings(cell: BinCell, soundings: &[Sounding], uncertainty: bool) -> Option<BinAggregate> {
    if !cell.has_data {
        return None;
    }

    let mut sum = 0.0;
    let mut h_sum = 0.0;
    let mut v_sum = 0.0;
    let mut count = 0u32;
    let mut drawn = false;

    for s in soundings.iter().filter(|s| !s.flags.is_rejected()) {
        if s.flags.hand_drawn {
            drawn = true;
        }
        if uncertainty {
            h_sum += s.horizontal_error;
            v_sum += s.vertical_error;
        }
        sum += s.depth;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let n = f64::from(count);
    Some(BinAggregate {
        mean_depth: sum / n,
        mean_horizontal_error: h_sum / n,
        mean_vertical_error: v_sum / n,
        total_uncertainty: f64::from(cell.standard_dev) * STD_DEV_MULTIPLIER,
        count,
        drawn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BinHeader, MemoryBins};
    use crate::domain::SoundingFlags;

    pub(crate) fn sounding(depth: f64, h: f64, v: f64) -> Sounding {
        Sounding {
            depth,
            horizontal_error: h,
            vertical_error: v,
            flags: SoundingFlags::default(),
        }
    }

    fn flagged(depth: f64, flags: SoundingFlags) -> Sounding {
        Sounding {
            flags,
            ..sounding(depth, 100.0, 100.0)
        }
    }

    fn with_data(standard_dev: f32) -> BinCell {
        BinCell {
            has_data: true,
            standard_dev,
        }
    }

    #[test]
    fn means_over_three_soundings() {
        let soundings = [
            sounding(10.0, 1.0, 0.1),
            sounding(12.0, 2.0, 0.2),
            sounding(14.0, 3.0, 0.3),
        ];
        let agg = reduce_soundings(with_data(1.0), &soundings, true).unwrap();
        assert!((agg.mean_depth - 12.0).abs() < 1e-12);
        assert!((agg.mean_horizontal_error - 2.0).abs() < 1e-12);
        assert!((agg.mean_vertical_error - 0.2).abs() < 1e-12);
        assert_eq!(agg.total_uncertainty, 2.0);
        assert_eq!(agg.count, 3);
        assert!(!agg.drawn);
    }

    #[test]
    fn rejected_soundings_do_not_contribute() {
        let soundings = [
            sounding(10.0, 1.0, 0.1),
            flagged(
                500.0,
                SoundingFlags {
                    invalid: true,
                    ..Default::default()
                },
            ),
            flagged(
                500.0,
                SoundingFlags {
                    deleted: true,
                    ..Default::default()
                },
            ),
            flagged(
                500.0,
                SoundingFlags {
                    reference: true,
                    hand_drawn: true,
                    ..Default::default()
                },
            ),
            sounding(20.0, 3.0, 0.3),
        ];
        let agg = reduce_soundings(with_data(0.5), &soundings, true).unwrap();
        assert_eq!(agg.count, 2);
        assert!((agg.mean_depth - 15.0).abs() < 1e-12);
        assert!((agg.mean_horizontal_error - 2.0).abs() < 1e-12);
        // The rejected reference sounding's hand-drawn flag is ignored.
        assert!(!agg.drawn);
    }

    #[test]
    fn hand_drawn_contributor_marks_bin() {
        let soundings = [
            sounding(10.0, 1.0, 0.1),
            flagged(
                12.0,
                SoundingFlags {
                    hand_drawn: true,
                    ..Default::default()
                },
            ),
        ];
        let agg = reduce_soundings(with_data(0.5), &soundings, true).unwrap();
        assert!(agg.drawn);
    }

    #[test]
    fn disabled_uncertainty_still_counts() {
        let soundings = [sounding(10.0, 1.0, 0.1), sounding(14.0, 3.0, 0.3)];
        let agg = reduce_soundings(with_data(0.5), &soundings, false).unwrap();
        assert_eq!(agg.count, 2);
        assert_eq!(agg.mean_horizontal_error, 0.0);
        assert_eq!(agg.mean_vertical_error, 0.0);
        assert!((agg.mean_depth - 12.0).abs() < 1e-12);
    }

    #[test]
    fn nothing_survives_or_no_data() {
        let deleted = flagged(
            10.0,
            SoundingFlags {
                deleted: true,
                ..Default::default()
            },
        );
        assert!(reduce_soundings(with_data(0.5), &[deleted], true).is_none());
        assert!(reduce_soundings(with_data(0.5), &[], true).is_none());
        assert!(reduce_soundings(BinCell::default(), &[sounding(10.0, 0.0, 0.0)], true).is_none());
    }

    #[test]
    fn aggregate_bin_reads_through_database() {
        let header = BinHeader {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 2.0,
            max_y: 2.0,
            x_bin_size_degrees: 1.0,
            y_bin_size_degrees: 1.0,
            bin_width: 2,
            bin_height: 2,
            projected: false,
            depth_scale: 100.0,
            horizontal_error_scale: 100.0,
            vertical_error_scale: 100.0,
        };
        let mut db = MemoryBins::new(header);
        db.insert(GridCoord::new(0, 1), 0.25, vec![sounding(8.0, 0.0, 0.0)]);
        db.insert_empty(GridCoord::new(1, 1), vec![sounding(9.0, 0.0, 0.0)]);

        let agg = aggregate_bin(&db, GridCoord::new(0, 1), true).unwrap().unwrap();
        assert_eq!(agg.mean_depth, 8.0);
        assert_eq!(agg.total_uncertainty, 0.5);

        // The has-data flag gates reading soundings at all.
        assert!(aggregate_bin(&db, GridCoord::new(1, 1), true).unwrap().is_none());
        assert!(aggregate_bin(&db, GridCoord::new(0, 0), true).unwrap().is_none());
        assert!(aggregate_bin(&db, GridCoord::new(5, 0), true).is_err());
    }
}

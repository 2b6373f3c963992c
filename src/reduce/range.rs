//! Running observed depth range.

use crate::domain::{GridHeader, NULL_Z_VALUE};

/// Min/max over the depths written during aggregation.
///
/// Sentinel and out-of-range depths are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObservedRange {
    bounds: Option<(f32, f32)>,
}

impl ObservedRange {
    pub fn include(&mut self, z: f32, header: &GridHeader) {
        if z == NULL_Z_VALUE || !header.z_in_range(z) {
            return;
        }
        self.bounds = Some(match self.bounds {
            Some((min, max)) => (min.min(z), max.max(z)),
            None => (z, z),
        });
    }

    pub fn min(&self) -> Option<f32> {
        self.bounds.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<f32> {
        self.bounds.map(|(_, max)| max)
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Store the range in the header. An empty range leaves the header as it is.
    pub fn apply_to(&self, header: &mut GridHeader) {
        if let Some((min, max)) = self.bounds {
            header.min_observed_z = min;
            header.max_observed_z = max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory::test_header;

    #[test]
    fn tracks_extremes_and_skips_sentinels() {
        let mut header = test_header(1, 1);
        header.min_z = -100.0;
        header.max_z = 9999.0;

        let mut range = ObservedRange::default();
        assert!(range.is_empty());
        for z in [12.0, NULL_Z_VALUE, -5.5, 10_000.0, 48.0, -101.0] {
            range.include(z, &header);
        }
        assert_eq!(range.min(), Some(-5.5));
        assert_eq!(range.max(), Some(48.0));

        range.apply_to(&mut header);
        assert_eq!(header.min_observed_z, -5.5);
        assert_eq!(header.max_observed_z, 48.0);
    }

    #[test]
    fn empty_range_leaves_header_alone() {
        let mut header = test_header(1, 1);
        header.min_observed_z = 1.0;
        header.max_observed_z = 2.0;
        ObservedRange::default().apply_to(&mut header);
        assert_eq!(header.min_observed_z, 1.0);
        assert_eq!(header.max_observed_z, 2.0);
    }
}

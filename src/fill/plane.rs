//! Reference surface engine: distance-weighted local planes.
//!
//! For every node of the `[min_x, max_x] x [min_y, max_y]` lattice:
//!
//! - the `error_factor` nearest points within `search_radius` are gathered
//! - a point closer than `delta` is taken as-is
//! - with three or more neighbours a plane is fitted by weighted least squares
//!   (weights `1 / d^weight`) and evaluated at the node
//! - otherwise, or if the neighbourhood is degenerate, the inverse-distance mean is used
//! - a node with no neighbour in range takes the value of the nearest point
//!
//! Estimates are bounded by the neighbours' values and by `[min_value, max_value]`.
//! Rows come back south to north, one value per lattice column.

use std::collections::HashMap;

use crate::fill::engine::{EngineError, EngineParams, SurfaceEngine, SurfacePoint};
use crate::math::fit_plane;

#[derive(Debug, Default)]
pub struct PlaneEngine {
    params: Option<EngineParams>,
    points: Vec<SurfacePoint>,
    surface: Vec<f32>,
    nx: usize,
    ny: usize,
    cursor: usize,
}

impl PlaneEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SurfaceEngine for PlaneEngine {
    fn init(&mut self, params: &EngineParams) -> Result<(), EngineError> {
        params.validate()?;
        let b = &params.bounds;
        self.nx = ((b.max_x - b.min_x) / params.x_interval).round() as usize + 1;
        self.ny = ((b.max_y - b.min_y) / params.y_interval).round() as usize + 1;
        self.params = Some(*params);
        self.points.clear();
        self.surface.clear();
        self.cursor = 0;
        Ok(())
    }

    fn load(&mut self, point: SurfacePoint) -> Result<(), EngineError> {
        if self.params.is_none() {
            return Err(EngineError::NotInitialized);
        }
        self.points.push(point);
        Ok(())
    }

    fn run(&mut self) -> Result<(), EngineError> {
        let params = self.params.ok_or(EngineError::NotInitialized)?;
        if self.points.is_empty() {
            return Err(EngineError::NoPoints);
        }

        let index = BucketIndex::new(&self.points, &params);

        let mut surface = Vec::with_capacity(self.nx * self.ny);
        for j in 0..self.ny {
            let y = params.bounds.min_y + j as f64 * params.y_interval;
            for i in 0..self.nx {
                let x = params.bounds.min_x + i as f64 * params.x_interval;
                let z = estimate(&index, &self.points, &params, x, y).ok_or(EngineError::NoPoints)?;
                surface.push(z.clamp(params.min_value, params.max_value) as f32);
            }
        }

        self.surface = surface;
        self.points = Vec::new();
        self.cursor = 0;
        Ok(())
    }

    fn next_row(&mut self) -> Option<Vec<f32>> {
        if self.cursor >= self.ny || self.surface.is_empty() {
            return None;
        }
        let start = self.cursor * self.nx;
        self.cursor += 1;
        Some(self.surface[start..start + self.nx].to_vec())
    }
}

/// Square buckets of side `search_radius` over the loaded points.
struct BucketIndex {
    cell: f64,
    origin: (f64, f64),
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl BucketIndex {
    fn new(points: &[SurfacePoint], params: &EngineParams) -> Self {
        let cell = params.search_radius;
        let origin = (params.bounds.min_x, params.bounds.min_y);
        let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (idx, p) in points.iter().enumerate() {
            let key = (
                ((p.x - origin.0) / cell).floor() as i64,
                ((p.y - origin.1) / cell).floor() as i64,
            );
            buckets.entry(key).or_default().push(idx);
        }
        Self { cell, origin, buckets }
    }

    fn key(&self, x: f64, y: f64) -> (i64, i64) {
        (
            ((x - self.origin.0) / self.cell).floor() as i64,
            ((y - self.origin.1) / self.cell).floor() as i64,
        )
    }

    /// Point indices in the buckets exactly `ring` steps away from `(x, y)`'s bucket.
    fn ring(&self, x: f64, y: f64, ring: i64, out: &mut Vec<usize>) {
        let (cx, cy) = self.key(x, y);
        for by in (cy - ring)..=(cy + ring) {
            for bx in (cx - ring)..=(cx + ring) {
                if (bx - cx).abs() != ring && (by - cy).abs() != ring {
                    continue;
                }
                if let Some(ids) = self.buckets.get(&(bx, by)) {
                    out.extend_from_slice(ids);
                }
            }
        }
    }
}

fn estimate(index: &BucketIndex, points: &[SurfacePoint], params: &EngineParams, x: f64, y: f64) -> Option<f64> {
    let dist = |p: &SurfacePoint| ((p.x - x).powi(2) + (p.y - y).powi(2)).sqrt();

    let mut candidates = Vec::new();
    index.ring(x, y, 0, &mut candidates);
    index.ring(x, y, 1, &mut candidates);

    let mut near: Vec<(f64, &SurfacePoint)> = candidates
        .iter()
        .map(|&i| (dist(&points[i]), &points[i]))
        .filter(|(d, _)| *d <= params.search_radius)
        .collect();

    if near.is_empty() {
        return nearest_point(points, x, y);
    }

    near.sort_by(|a, b| a.0.total_cmp(&b.0));
    near.truncate(params.error_factor as usize);

    if near[0].0 <= params.delta {
        return Some(near[0].1.z);
    }

    let lo = near.iter().map(|(_, p)| p.z).fold(f64::INFINITY, f64::min);
    let hi = near.iter().map(|(_, p)| p.z).fold(f64::NEG_INFINITY, f64::max);

    let samples: Vec<(f64, f64, f64, f64)> = near
        .iter()
        .map(|(d, p)| (p.x - x, p.y - y, p.z, d.powi(-params.weight)))
        .collect();

    let plane = fit_plane(&samples).map(|[a, _, _]| a).filter(|a| a.is_finite());
    let value = plane.unwrap_or_else(|| {
        let (wz, w) = samples
            .iter()
            .fold((0.0, 0.0), |(wz, w), &(_, _, z, wi)| (wz + wi * z, w + wi));
        wz / w
    });

    Some(value.clamp(lo, hi))
}

fn nearest_point(points: &[SurfacePoint], x: f64, y: f64) -> Option<f64> {
    points
        .iter()
        .min_by(|a, b| {
            let da = (a.x - x).powi(2) + (a.y - y).powi(2);
            let db = (b.x - x).powi(2) + (b.y - y).powi(2);
            da.total_cmp(&db)
        })
        .map(|p| p.z)
}

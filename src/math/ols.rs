//! Weighted least squares solver.
//!
//! The reference surface engine repeatedly solves tiny regression problems of
//! the form:
//!
//! ```text
//! minimize Σ w_i (z_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - Rows are scaled by `sqrt(w_i)` and an ordinary least squares problem is solved.
//! - SVD handles tall design matrices and degenerate neighbourhoods (collinear
//!   points); `None` is returned rather than a wild solution.

use nalgebra::{DMatrix, DVector};

/// Solve a weighted least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned, or if `w` does not
/// match the number of rows.
pub fn solve_weighted_least_squares(x: &DMatrix<f64>, z: &DVector<f64>, w: &[f64]) -> Option<DVector<f64>> {
    if w.len() != x.nrows() || z.len() != x.nrows() {
        return None;
    }

    let mut xs = x.clone();
    let mut zs = z.clone();
    for (i, &wi) in w.iter().enumerate() {
        if !(wi.is_finite() && wi >= 0.0) {
            return None;
        }
        let s = wi.sqrt();
        xs.row_mut(i).scale_mut(s);
        zs[i] *= s;
    }

    let svd = xs.svd(true, true);
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(&zs, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }
    None
}

/// Fit `z = a + b·dx + c·dy` to weighted samples `(dx, dy, z, w)`.
///
/// Needs at least three samples. Returns `[a, b, c]`.
pub fn fit_plane(samples: &[(f64, f64, f64, f64)]) -> Option<[f64; 3]> {
    if samples.len() < 3 {
        return None;
    }
    let n = samples.len();
    let mut x = DMatrix::zeros(n, 3);
    let mut z = DVector::zeros(n);
    let mut w = Vec::with_capacity(n);
    for (i, &(dx, dy, zi, wi)) in samples.iter().enumerate() {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = dx;
        x[(i, 2)] = dy;
        z[i] = zi;
        w.push(wi);
    }

    // A rank-deficient neighbourhood (all points on a line) has no unique plane.
    let rank = x.clone().svd(false, false).rank(1e-9);
    if rank < 3 {
        return None;
    }

    let beta = solve_weighted_least_squares(&x, &z, &w)?;
    Some([beta[0], beta[1], beta[2]])
}

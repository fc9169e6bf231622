//! Weighted least squares solver.
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2
//! ```
//!
//! Rows are scaled by `sqrt(w_i)` and the resulting ordinary least squares
//! problem is solved with SVD, which also handles tall design matrices.
//! The power-law fit uses this for its log-space starting point.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a weighted least squares problem.
///
/// `weights` must have one non-negative entry per row of `x`.
pub fn solve_weighted_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    weights: &[f64],
) -> Option<DVector<f64>> {
    if weights.len() != x.nrows() || y.len() != x.nrows() {
        return None;
    }
    if weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
        return None;
    }

    let mut xw = x.clone();
    let mut yw = y.clone();
    for (i, w) in weights.iter().enumerate() {
        let s = w.sqrt();
        for j in 0..xw.ncols() {
            xw[(i, j)] *= s;
        }
        yw[i] *= s;
    }

    solve_least_squares(&xw, &yw)
}

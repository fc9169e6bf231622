//! Fixed-index power-law fit.
//!
//! Given:
//! - abscissae `x_i > 0` (days since explosion)
//! - observations `y_i > 0`
//! - optional uncertainties `σ_i`
//! - a fixed index `m`
//!
//! we find the intercept `b` of `y = 10^(m·log10(x) + b)` that minimizes
//!
//! ```text
//! S(b) = Σ w_i (y_i - y(x_i; b))^2,   w_i = 1/σ_i^2 (or 1 without σ)
//! ```
//!
//! Residuals are in linear `y`, so the problem is nonlinear in `b`. We start
//! from the closed-form log-space solution and refine with a one-parameter
//! Levenberg–Marquardt loop.

use nalgebra::{DMatrix, DVector};

use crate::domain::PowerLawFit;
use crate::error::AppError;
use crate::math::solve_weighted_least_squares;
use crate::models::{d_intercept, log_space_target, predict};

/// Index used when the caller has no better prior (fallback accretion, t^-5/3).
pub const DEFAULT_INDEX: f64 = -5.0 / 3.0;

const MAX_ITERS: usize = 200;
const X_TOL: f64 = 1e-12;
const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MAX: f64 = 1e16;

/// Fit the intercept of a power law with fixed `index`.
///
/// With `y_err`, residuals are weighted by `1/σ^2` and the covariance is
/// absolute. Without, the covariance is scaled by the reduced chi-square
/// (infinite when only one point is available).
pub fn fit_pow(x: &[f64], y: &[f64], y_err: Option<&[f64]>, index: f64) -> Result<PowerLawFit, AppError> {
    validate_inputs(x, y, y_err, index)?;

    let n = x.len();
    let weights: Vec<f64> = match y_err {
        Some(sigma) => sigma.iter().map(|s| 1.0 / (s * s)).collect(),
        None => vec![1.0; n],
    };

    let mut b = initial_intercept(x, y, y_err, index)?;
    let mut cost = weighted_sse(x, y, &weights, b, index);
    if !cost.is_finite() {
        return Err(AppError::numeric(format!(
            "Power-law fit failed: non-finite residuals at the starting intercept b={b}."
        )));
    }

    let mut lambda = LAMBDA_INIT;
    let mut converged = false;
    let mut iterations = 0usize;

    while iterations < MAX_ITERS {
        iterations += 1;

        let (grad, hess) = normal_equation(x, y, &weights, b, index);
        if !(hess.is_finite() && hess > 0.0 && grad.is_finite()) {
            return Err(AppError::numeric(
                "Power-law fit failed: singular or non-finite normal equations.",
            ));
        }

        let step = grad / (hess * (1.0 + lambda));
        if step.abs() <= X_TOL * (b.abs() + X_TOL) {
            converged = true;
            break;
        }

        let trial = b + step;
        let trial_cost = weighted_sse(x, y, &weights, trial, index);
        if trial_cost.is_finite() && trial_cost <= cost {
            b = trial;
            cost = trial_cost;
            lambda = (lambda / 10.0).max(1e-12);
        } else {
            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                break;
            }
        }
    }

    if !converged {
        return Err(AppError::numeric(format!(
            "Power-law fit did not converge after {iterations} iterations (b={b}, chi2={cost})."
        )));
    }

    let (_, hess) = normal_equation(x, y, &weights, b, index);
    let mut covariance = 1.0 / hess;
    if y_err.is_none() {
        covariance = if n > 1 {
            covariance * cost / (n - 1) as f64
        } else {
            f64::INFINITY
        };
    }

    log::debug!("power-law fit: n={n} m={index} b={b} chi2={cost} iters={iterations}");

    Ok(PowerLawFit {
        index,
        intercept: b,
        covariance,
        chi2: cost,
        n,
        weighted: y_err.is_some(),
        iterations,
    })
}

fn validate_inputs(x: &[f64], y: &[f64], y_err: Option<&[f64]>, index: f64) -> Result<(), AppError> {
    if x.is_empty() {
        return Err(AppError::numeric("Power-law fit needs at least one point."));
    }
    if x.len() != y.len() {
        return Err(AppError::numeric(format!(
            "Power-law fit: x has {} points but y has {}.",
            x.len(),
            y.len()
        )));
    }
    if !index.is_finite() {
        return Err(AppError::numeric(format!("Power-law index must be finite, got {index}.")));
    }
    if let Some((i, (xi, yi))) = x
        .iter()
        .zip(y)
        .enumerate()
        .find(|(_, (xi, yi))| !(xi.is_finite() && yi.is_finite() && **xi > 0.0 && **yi > 0.0))
    {
        return Err(AppError::numeric(format!(
            "Power-law fit needs finite positive x and y (point {i}: x={xi}, y={yi})."
        )));
    }
    if let Some(sigma) = y_err {
        if sigma.len() != x.len() {
            return Err(AppError::numeric(format!(
                "Power-law fit: {} uncertainties for {} points.",
                sigma.len(),
                x.len()
            )));
        }
        if let Some((i, s)) = sigma.iter().enumerate().find(|(_, s)| !(s.is_finite() && **s > 0.0)) {
            return Err(AppError::numeric(format!(
                "Power-law fit needs finite positive uncertainties (point {i}: sigma={s})."
            )));
        }
    }
    Ok(())
}

/// Weighted log-space solution of `log10(y) - m·log10(x) = b`.
///
/// A linear-space sigma maps to `σ / (y·ln10)` in `log10(y)`.
fn initial_intercept(x: &[f64], y: &[f64], y_err: Option<&[f64]>, index: f64) -> Result<f64, AppError> {
    let n = x.len();
    let design = DMatrix::from_element(n, 1, 1.0);
    let target = DVector::from_iterator(n, x.iter().zip(y).map(|(&xi, &yi)| log_space_target(xi, yi, index)));
    let weights: Vec<f64> = match y_err {
        Some(sigma) => y
            .iter()
            .zip(sigma)
            .map(|(yi, s)| {
                let log_sigma = s / (yi * std::f64::consts::LN_10);
                1.0 / (log_sigma * log_sigma)
            })
            .collect(),
        None => vec![1.0; n],
    };

    let beta = solve_weighted_least_squares(&design, &target, &weights).ok_or_else(|| {
        AppError::numeric("Power-law fit failed: log-space starting point is ill-conditioned.")
    })?;
    Ok(beta[0])
}

fn weighted_sse(x: &[f64], y: &[f64], w: &[f64], b: f64, index: f64) -> f64 {
    x.iter()
        .zip(y)
        .zip(w)
        .map(|((&xi, &yi), &wi)| {
            let r = yi - predict(xi, b, index);
            wi * r * r
        })
        .sum()
}

/// Gradient term `Σ w J r` and Gauss–Newton curvature `Σ w J^2`.
fn normal_equation(x: &[f64], y: &[f64], w: &[f64], b: f64, index: f64) -> (f64, f64) {
    let mut grad = 0.0;
    let mut hess = 0.0;
    for ((&xi, &yi), &wi) in x.iter().zip(y).zip(w) {
        let j = d_intercept(xi, b, index);
        let r = yi - predict(xi, b, index);
        grad += wi * j * r;
        hess += wi * j * j;
    }
    (grad, hess)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    fn synthetic(b0: f64, m: f64, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| predict(x, b0, m)).collect()
    }

    #[test]
    fn recovers_exact_intercept() {
        let xs = [1.5, 2.0, 3.0, 5.0, 8.0, 13.0];
        let (b0, m) = (44.3, DEFAULT_INDEX);
        let ys = synthetic(b0, m, &xs);

        let fit = fit_pow(&xs, &ys, None, m).unwrap();
        assert!((fit.intercept - b0).abs() < 1e-9, "b={}", fit.intercept);
        assert!(!fit.weighted);
    }

    #[test]
    fn recovers_intercept_with_uncertainties() {
        let xs = [2.0, 4.0, 6.0, 10.0, 18.0];
        let (b0, m) = (4.9, -0.5);
        let ys = synthetic(b0, m, &xs);
        let sigma: Vec<f64> = ys.iter().map(|y| 0.05 * y).collect();

        let fit = fit_pow(&xs, &ys, Some(&sigma), m).unwrap();
        assert!((fit.intercept - b0).abs() < 1e-9);
        assert!(fit.weighted);
        assert!(fit.covariance > 0.0 && fit.covariance.is_finite());
        assert!(fit.chi2 < 1e-12);
    }

    #[test]
    fn noisy_data_recovers_intercept_within_error() {
        let xs: Vec<f64> = (1..=30).map(|i| 0.5 * i as f64).collect();
        let (b0, m) = (3.0, -5.0 / 3.0);
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 1.0).unwrap();

        let truth = synthetic(b0, m, &xs);
        let sigma: Vec<f64> = truth.iter().map(|y| 0.02 * y).collect();
        let ys: Vec<f64> = truth
            .iter()
            .zip(&sigma)
            .map(|(y, s)| y + s * noise.sample(&mut rng))
            .collect();

        let fit = fit_pow(&xs, &ys, Some(&sigma), m).unwrap();
        assert!(
            (fit.intercept - b0).abs() < 5.0 * fit.intercept_err(),
            "b={} ± {}",
            fit.intercept,
            fit.intercept_err()
        );
    }

    #[test]
    fn single_unweighted_point_has_infinite_covariance() {
        let fit = fit_pow(&[2.0], &[10.0], None, -1.0).unwrap();
        assert!((predict(2.0, fit.intercept, -1.0) - 10.0).abs() < 1e-9);
        assert!(fit.covariance.is_infinite());
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert_eq!(fit_pow(&[0.0, 1.0], &[1.0, 2.0], None, -1.0).unwrap_err().exit_code(), 4);
        assert!(fit_pow(&[1.0, 2.0], &[-1.0, 2.0], None, -1.0).is_err());
        assert!(fit_pow(&[1.0, 2.0], &[1.0, 2.0], Some(&[0.1, 0.0]), -1.0).is_err());
        assert!(fit_pow(&[], &[], None, -1.0).is_err());
        assert!(fit_pow(&[1.0, 2.0], &[1.0], None, -1.0).is_err());
    }
}

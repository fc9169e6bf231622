//! Power-law model in log-intercept form.
//!
//! ```text
//! y(x) = 10^(m·log10(x) + b)
//! ```
//!
//! `m` is fixed by the caller (e.g. `-5/3` for fallback accretion); only the
//! intercept `b` is fitted. The fitter needs two primitives:
//! - predict `y(x)` for given `b`, `m`
//! - the derivative `∂y/∂b` for the Jacobian

use std::f64::consts::LN_10;

/// Predict `y(x)` for intercept `b` and index `m`.
pub fn predict(x: f64, intercept: f64, index: f64) -> f64 {
    10f64.powf(index * x.log10() + intercept)
}

/// Derivative of `y(x)` with respect to the intercept: `ln(10) · y(x)`.
pub fn d_intercept(x: f64, intercept: f64, index: f64) -> f64 {
    LN_10 * predict(x, intercept, index)
}

/// Target of the intercept-only log-space regression `log10(y) - m·log10(x) = b`.
pub fn log_space_target(x: f64, y: f64, index: f64) -> f64 {
    y.log10() - index * x.log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_matches_closed_form() {
        // b = 2, m = -1 => y = 100 / x
        assert!((predict(10.0, 2.0, -1.0) - 10.0).abs() < 1e-12);
        assert!((predict(1.0, 2.0, -1.0) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn derivative_is_consistent_with_finite_difference() {
        let (x, b, m) = (3.0, 1.2, -5.0 / 3.0);
        let h = 1e-6;
        let fd = (predict(x, b + h, m) - predict(x, b - h, m)) / (2.0 * h);
        let an = d_intercept(x, b, m);
        assert!((fd - an).abs() / an < 1e-6);
    }

    #[test]
    fn log_space_target_recovers_intercept() {
        let (b, m) = (0.7, 0.5);
        for &x in &[0.5, 2.0, 9.0] {
            let y = predict(x, b, m);
            assert!((log_space_target(x, y, m) - b).abs() < 1e-12);
        }
    }
}

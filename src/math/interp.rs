//! Piecewise-linear interpolation onto a new abscissa.
//!
//! The model grid is sampled at its own time offsets, so every model column is
//! resampled at the observation times before comparison. Behavior outside the
//! grid is chosen explicitly with `Extrapolation`.

use crate::domain::Extrapolation;
use crate::error::AppError;

/// Interpolation output plus how many targets fell outside `[xp[0], xp[last]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolated {
    pub values: Vec<f64>,
    pub outside: usize,
}

/// Check that `xp` is finite and strictly increasing and matches `fp` in length.
pub fn validate_grid(xp: &[f64], fp: &[f64]) -> Result<(), AppError> {
    if xp.len() != fp.len() {
        return Err(AppError::input(format!(
            "Grid length mismatch: {} abscissae vs {} values.",
            xp.len(),
            fp.len()
        )));
    }
    if xp.len() < 2 {
        return Err(AppError::input("Interpolation grid needs at least 2 points."));
    }
    if xp.iter().chain(fp).any(|v| !v.is_finite()) {
        return Err(AppError::input("Interpolation grid contains non-finite values."));
    }
    if let Some(w) = xp.windows(2).find(|w| w[1] <= w[0]) {
        return Err(AppError::input(format!(
            "Interpolation grid must be strictly increasing (found {} then {}).",
            w[0], w[1]
        )));
    }
    Ok(())
}

/// Interpolate `fp(xp)` at each `x`.
pub fn interp(
    x: &[f64],
    xp: &[f64],
    fp: &[f64],
    mode: Extrapolation,
) -> Result<Interpolated, AppError> {
    validate_grid(xp, fp)?;

    let last = xp.len() - 1;
    let mut values = Vec::with_capacity(x.len());
    let mut outside = 0usize;

    for &xi in x {
        if !xi.is_finite() {
            return Err(AppError::numeric(format!("Cannot interpolate at non-finite x={xi}.")));
        }

        let below = xi < xp[0];
        let above = xi > xp[last];
        if below || above {
            outside += 1;
            let value = match mode {
                Extrapolation::Error => {
                    return Err(AppError::numeric(format!(
                        "x={xi} lies outside the model grid [{}, {}].",
                        xp[0], xp[last]
                    )));
                }
                Extrapolation::Clamp if below => fp[0],
                Extrapolation::Clamp => fp[last],
                Extrapolation::Linear if below => segment(xi, xp[0], xp[1], fp[0], fp[1]),
                Extrapolation::Linear => segment(xi, xp[last - 1], xp[last], fp[last - 1], fp[last]),
            };
            values.push(value);
            continue;
        }

        // First index with xp[idx] >= xi; xi is inside so idx is in 0..=last.
        let idx = xp.partition_point(|&v| v < xi);
        let value = if idx == 0 {
            fp[0]
        } else {
            segment(xi, xp[idx - 1], xp[idx], fp[idx - 1], fp[idx])
        };
        values.push(value);
    }

    Ok(Interpolated { values, outside })
}

fn segment(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XP: [f64; 3] = [1.0, 2.0, 4.0];
    const FP: [f64; 3] = [10.0, 20.0, 40.0];

    #[test]
    fn interior_points_are_linear() {
        let out = interp(&[1.0, 1.5, 3.0, 4.0], &XP, &FP, Extrapolation::Error).unwrap();
        assert_eq!(out.values, vec![10.0, 15.0, 30.0, 40.0]);
        assert_eq!(out.outside, 0);
    }

    #[test]
    fn clamp_holds_end_values() {
        let out = interp(&[0.0, 5.0], &XP, &FP, Extrapolation::Clamp).unwrap();
        assert_eq!(out.values, vec![10.0, 40.0]);
        assert_eq!(out.outside, 2);
    }

    #[test]
    fn linear_extends_end_segments() {
        let out = interp(&[0.0, 5.0], &XP, &FP, Extrapolation::Linear).unwrap();
        assert!((out.values[0] - 0.0).abs() < 1e-12);
        assert!((out.values[1] - 50.0).abs() < 1e-12);
    }

    #[test]
    fn error_mode_rejects_out_of_range() {
        let err = interp(&[0.5], &XP, &FP, Extrapolation::Error).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn unsorted_grid_is_rejected() {
        let err = interp(&[1.0], &[1.0, 1.0, 2.0], &FP, Extrapolation::Clamp).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

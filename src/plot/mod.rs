//! Figures: the three-panel comparison, the light curve, and terminal previews.

use std::path::Path;

use crate::error::AppError;

pub mod ascii;
pub mod compare;
pub mod lightcurve;
pub mod style;

pub use ascii::{AsciiAxes, render_ascii};
pub use compare::{ComparisonFigure, render_comparison};
pub use lightcurve::render_light_curve;
pub use style::PlotStyle;

/// True when `path` has an `.svg` extension (any case).
pub fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Reject outputs this build cannot render.
///
/// Without the `ttf` feature plotters has no font engine for raster output,
/// so only SVG carries axis labels.
pub fn check_output_format(path: &Path) -> Result<(), AppError> {
    if is_svg(path) || cfg!(feature = "ttf") {
        return Ok(());
    }
    Err(AppError::output(format!(
        "Cannot write '{}': PNG output needs the `ttf` feature; use a .svg path.",
        path.display()
    )))
}

/// Min/max of the finite values, each padded outward by `frac` of the span.
///
/// A zero span is widened by 0.5 on each side.
pub fn pad_range(values: impl Iterator<Item = f64>, frac: f64) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return None;
    }
    let span = hi - lo;
    if span > 0.0 {
        Some((lo - frac * span, hi + frac * span))
    } else {
        Some((lo - 0.5, hi + 0.5))
    }
}

/// Bounds of the positive finite values for a log axis, padded by `pad_dex`
/// decades on each side.
pub fn log_bounds(values: impl Iterator<Item = f64>, pad_dex: f64) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(f64::log10)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return None;
    }
    Some((10f64.powf(lo - pad_dex), 10f64.powf(hi + pad_dex)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_extension_is_case_insensitive() {
        assert!(is_svg(Path::new("out/fig.SVG")));
        assert!(is_svg(Path::new("fig.svg")));
        assert!(!is_svg(Path::new("fig.png")));
        assert!(!is_svg(Path::new("svg")));
    }

    #[test]
    fn svg_is_always_a_valid_output() {
        assert!(check_output_format(Path::new("fig.svg")).is_ok());
    }

    #[cfg(not(feature = "ttf"))]
    #[test]
    fn png_needs_the_ttf_feature() {
        let err = check_output_format(Path::new("fig.png")).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(err.message().contains("ttf"));
    }

    #[cfg(feature = "ttf")]
    #[test]
    fn png_is_accepted_with_ttf() {
        assert!(check_output_format(Path::new("fig.png")).is_ok());
    }

    #[test]
    fn pad_range_widens_degenerate_span() {
        assert_eq!(pad_range([2.0, 2.0].into_iter(), 0.1), Some((1.5, 2.5)));
        let (lo, hi) = pad_range([0.0, 10.0, f64::NAN].into_iter(), 0.1).unwrap();
        assert!((lo + 1.0).abs() < 1e-12 && (hi - 11.0).abs() < 1e-12);
        assert_eq!(pad_range(std::iter::empty(), 0.1), None);
    }

    #[test]
    fn log_bounds_skip_non_positive_values() {
        let (lo, hi) = log_bounds([0.0, -3.0, 1e2, 1e4].into_iter(), 1.0).unwrap();
        assert!((lo - 10.0).abs() < 1e-9);
        assert!((hi - 1e5).abs() < 1e-4);
        assert_eq!(log_bounds([0.0, -1.0].into_iter(), 0.1), None);
    }
}

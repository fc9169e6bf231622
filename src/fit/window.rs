//! Windowed power-law fits on an observed series.
//!
//! A window picks one quantity and a strict `dt` range, e.g. the temperature
//! between day 1 and day 19. A sample inside the window with non-positive
//! `dt` or value cannot sit on a power law and fails the fit.

use crate::domain::{FitWindow, PowerLawFit, Series};
use crate::error::AppError;
use crate::fit::powerlaw::fit_pow;
use crate::models::predict;

/// Arrays handed to the fitter after windowing.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub sigma: Vec<f64>,
}

/// Collect the samples of `series` that fall inside `window`.
pub fn select_window(series: &Series, window: &FitWindow) -> Result<WindowedData, AppError> {
    if series.quantity != window.quantity {
        return Err(AppError::input(format!(
            "Fit window is for {} but the series holds {}.",
            window.quantity.display_name(),
            series.quantity.display_name()
        )));
    }
    if let (Some(lo), Some(hi)) = (window.t_min, window.t_max) {
        if hi <= lo {
            return Err(AppError::input(format!("Empty fit window: t_min={lo} >= t_max={hi}.")));
        }
    }

    let mut data = WindowedData {
        x: Vec::new(),
        y: Vec::new(),
        sigma: Vec::new(),
    };
    for s in series.samples.iter().filter(|s| window.contains(s.dt)) {
        if s.dt <= 0.0 || s.value <= 0.0 {
            return Err(AppError::numeric(format!(
                "Cannot fit a power law to {} at dt={}: dt and value must be positive (value={}). \
                 Narrow the fit window to exclude it.",
                series.quantity.display_name(),
                s.dt,
                s.value
            )));
        }
        data.x.push(s.dt);
        data.y.push(s.value);
        data.sigma.push(s.sigma());
    }

    if data.x.is_empty() {
        return Err(AppError::empty(format!(
            "No {} samples inside the fit window ({:?}, {:?}).",
            series.quantity.display_name(),
            window.t_min,
            window.t_max
        )));
    }

    Ok(data)
}

/// Select the window and fit the power law.
pub fn fit_window(series: &Series, window: &FitWindow) -> Result<PowerLawFit, AppError> {
    let data = select_window(series, window)?;
    let sigma = window.weighted.then_some(data.sigma.as_slice());
    log::info!(
        "fitting {} samples of {} with index {:.4} ({})",
        data.x.len(),
        series.quantity.display_name(),
        window.index,
        if window.weighted { "weighted" } else { "unweighted" }
    );
    fit_pow(&data.x, &data.y, sigma, window.index)
}

/// Evaluate a fitted power law on `n` log-spaced points across `[x_min, x_max]`.
pub fn sample_fit(fit: &PowerLawFit, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    let (lo, hi) = (x_min.log10(), x_max.log10());
    (0..n)
        .map(|i| {
            let x = 10f64.powf(lo + (hi - lo) * i as f64 / (n as f64 - 1.0));
            (x, predict(x, fit.intercept, fit.index))
        })
        .collect()
}

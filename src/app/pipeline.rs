//! Shared load/interpolate/fit logic behind the subcommands.
//!
//! The handlers in `app` only print and render; everything computed lives here
//! so it can be tested without spawning processes.

use std::path::{Path, PathBuf};

use crate::domain::{Extrapolation, FitWindow, ModelGrid, ModelOnGrid, Observations, PowerLawFit, Quantity};
use crate::error::AppError;
use crate::fit::fit_window;
use crate::math::interp;

/// Resolved input files.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    pub lum: PathBuf,
    pub rad: PathBuf,
    pub temp: PathBuf,
}

impl DataPaths {
    pub fn load_observations(&self) -> Result<Observations, AppError> {
        crate::io::load_observations(&self.lum, &self.rad, &self.temp)
    }
}

impl From<[PathBuf; 3]> for DataPaths {
    fn from([lum, rad, temp]: [PathBuf; 3]) -> Self {
        Self { lum, rad, temp }
    }
}

/// Resample every model column at the observation times.
pub fn interpolate_model(obs: &Observations, grid: &ModelGrid, mode: Extrapolation) -> Result<ModelOnGrid, AppError> {
    let dt = obs.dts();
    let column = |q: Quantity| interp(&dt, &grid.dt, grid.column(q), mode);
    let lum = column(Quantity::Luminosity)?;
    let rad = column(Quantity::Radius)?;
    let temp = column(Quantity::Temperature)?;

    // The columns share one abscissa, so their outside counts agree.
    let outside = lum.outside;
    if outside > 0 {
        log::warn!(
            "{outside} of {} epoch(s) lie outside the model grid [{}, {}] days; {:?} extrapolation applied",
            dt.len(),
            grid.dt.first().copied().unwrap_or(f64::NAN),
            grid.dt.last().copied().unwrap_or(f64::NAN),
            mode
        );
    }

    Ok(ModelOnGrid {
        dt,
        luminosity: lum.values,
        radius: rad.values,
        temperature: temp.values,
        outside,
    })
}

/// Everything the comparison figure and its summary need.
#[derive(Debug, Clone)]
pub struct ComparisonRun {
    pub observations: Observations,
    pub model: ModelOnGrid,
    pub fit: Option<(FitWindow, PowerLawFit)>,
}

/// Load observations and the model, interpolate, and optionally fit one quantity.
pub fn run_comparison(
    paths: &DataPaths,
    model_path: &Path,
    mode: Extrapolation,
    window: Option<FitWindow>,
) -> Result<ComparisonRun, AppError> {
    let observations = paths.load_observations()?;
    let grid = crate::io::load_model_grid(model_path)?;
    compare_loaded(observations, &grid, mode, window)
}

/// `run_comparison` on already loaded inputs.
pub fn compare_loaded(
    observations: Observations,
    grid: &ModelGrid,
    mode: Extrapolation,
    window: Option<FitWindow>,
) -> Result<ComparisonRun, AppError> {
    let model = interpolate_model(&observations, grid, mode)?;
    let fit = match window {
        Some(window) => {
            let fit = fit_window(observations.series(window.quantity), &window)?;
            Some((window, fit))
        }
        None => None,
    };
    Ok(ComparisonRun {
        observations,
        model,
        fit,
    })
}

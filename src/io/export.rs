//! Fit result export.
//!
//! The JSON holds the fit parameters together with the window that produced
//! them, so a figure can be regenerated or compared later.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FitWindow, PowerLawFit};
use crate::error::AppError;

/// A saved power-law fit (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub window: FitWindow,
    pub fit: PowerLawFit,
    pub intercept_err: f64,
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, window: &FitWindow, fit: &PowerLawFit) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    let out = FitFile {
        tool: "physevol".to_string(),
        window: *window,
        fit: fit.clone(),
        intercept_err: fit.intercept_err(),
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::output(format!("Failed to write fit JSON: {e}")))?;

    log::info!("wrote fit to {}", path.display());
    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Failed to parse fit JSON '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quantity;

    #[test]
    fn fit_json_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.json");
        let window = FitWindow {
            quantity: Quantity::Luminosity,
            t_min: Some(1.0),
            t_max: None,
            index: -5.0 / 3.0,
            weighted: false,
        };
        let fit = PowerLawFit {
            index: -5.0 / 3.0,
            intercept: 44.1,
            covariance: 0.0004,
            chi2: 1.5,
            n: 12,
            weighted: false,
            iterations: 3,
        };

        write_fit_json(&path, &window, &fit).unwrap();
        let back = read_fit_json(&path).unwrap();
        assert_eq!(back.window, window);
        assert_eq!(back.fit.n, 12);
        assert!((back.intercept_err - 0.02).abs() < 1e-12);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"quantity\": \"luminosity\""));
    }
}

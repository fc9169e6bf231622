//! CSV ingest for the observed series and the model grid.
//!
//! Series files carry one epoch per row:
//!
//! ```text
//! dt,value,lower,upper
//! 0.5,2.1e44,3.0e43,2.5e43
//! ```
//!
//! The model grid carries `dt,lum,rad,temp`. Both formats allow `#` comment
//! lines. Any malformed row aborts the load; these are small hand-curated files
//! and a silently skipped epoch would shift the printed table.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::{ModelGrid, Observations, Quantity, Sample, Series};
use crate::error::AppError;
use crate::math::validate_grid;

/// Time offsets of aligned series may differ by this relative amount.
const DT_REL_TOL: f64 = 1e-9;

#[derive(Debug, Deserialize)]
struct SeriesRow {
    dt: f64,
    value: f64,
    lower: f64,
    upper: f64,
}

#[derive(Debug, Deserialize)]
struct ModelRow {
    dt: f64,
    lum: f64,
    rad: f64,
    temp: f64,
}

/// Load one quantity's series.
pub fn load_series(path: &Path, quantity: Quantity) -> Result<Series, AppError> {
    let rows: Vec<SeriesRow> = read_rows(path, &["dt", "value", "lower", "upper"])?;

    let mut samples = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let sample = Sample {
            dt: row.dt,
            value: row.value,
            lower: row.lower,
            upper: row.upper,
        };
        if ![sample.dt, sample.value, sample.lower, sample.upper]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(AppError::input(format!(
                "{}: row {} has non-finite values.",
                path.display(),
                idx + 1
            )));
        }
        if sample.lower < 0.0 || sample.upper < 0.0 {
            return Err(AppError::input(format!(
                "{}: row {} has a negative uncertainty (lower={}, upper={}).",
                path.display(),
                idx + 1,
                sample.lower,
                sample.upper
            )));
        }
        samples.push(sample);
    }

    if samples.is_empty() {
        return Err(AppError::empty(format!("{}: no samples.", path.display())));
    }

    log::debug!(
        "loaded {} {} samples from {}",
        samples.len(),
        quantity.display_name(),
        path.display()
    );

    Ok(Series { quantity, samples })
}

/// Load luminosity, radius and temperature and check they share a time grid.
pub fn load_observations(lum: &Path, rad: &Path, temp: &Path) -> Result<Observations, AppError> {
    let observations = Observations {
        luminosity: load_series(lum, Quantity::Luminosity)?,
        radius: load_series(rad, Quantity::Radius)?,
        temperature: load_series(temp, Quantity::Temperature)?,
    };
    check_aligned(&observations)?;
    Ok(observations)
}

/// Verify the three series have equal length and matching `dt`.
pub fn check_aligned(obs: &Observations) -> Result<(), AppError> {
    let reference = &obs.luminosity;
    for other in [&obs.radius, &obs.temperature] {
        if other.len() != reference.len() {
            return Err(AppError::input(format!(
                "Series are not aligned: {} has {} epochs, {} has {}.",
                reference.quantity.display_name(),
                reference.len(),
                other.quantity.display_name(),
                other.len()
            )));
        }
        for (i, (a, b)) in reference.samples.iter().zip(&other.samples).enumerate() {
            let tol = DT_REL_TOL * a.dt.abs().max(1.0);
            if (a.dt - b.dt).abs() > tol {
                return Err(AppError::input(format!(
                    "Series are not aligned at epoch {}: {} dt={} vs {} dt={}.",
                    i + 1,
                    reference.quantity.display_name(),
                    a.dt,
                    other.quantity.display_name(),
                    b.dt
                )));
            }
        }
    }
    Ok(())
}

/// Load the model grid (strictly increasing `dt`).
pub fn load_model_grid(path: &Path) -> Result<ModelGrid, AppError> {
    let rows: Vec<ModelRow> = read_rows(path, &["dt", "lum", "rad", "temp"])?;

    let mut grid = ModelGrid {
        dt: Vec::with_capacity(rows.len()),
        luminosity: Vec::with_capacity(rows.len()),
        radius: Vec::with_capacity(rows.len()),
        temperature: Vec::with_capacity(rows.len()),
    };
    for row in rows {
        grid.dt.push(row.dt);
        grid.luminosity.push(row.lum);
        grid.radius.push(row.rad);
        grid.temperature.push(row.temp);
    }

    for quantity in Quantity::ALL {
        validate_grid(&grid.dt, grid.column(quantity))
            .map_err(|e| AppError::input(format!("{}: {e}", path.display())))?;
    }

    log::debug!("loaded model grid with {} points from {}", grid.dt.len(), path.display());
    Ok(grid)
}

fn read_rows<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open '{}': {e}", path.display())))?;

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read headers of '{}': {e}", path.display())))?
        .clone();
    ensure_columns(path, &headers, required)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result
            .map_err(|e| AppError::input(format!("{}: CSV parse error: {e}", path.display())))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: T = record.deserialize(Some(&headers)).map_err(|e| {
            AppError::input(format!("{}: line {line}: {e}", path.display()))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn ensure_columns(path: &Path, headers: &StringRecord, required: &[&str]) -> Result<(), AppError> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !headers.iter().any(|h| h.trim_start_matches('\u{feff}') == *name))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::input(format!(
            "{}: missing column(s) {} (expected header {}).",
            path.display(),
            missing.join(", "),
            required.join(",")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_series_with_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "lum.csv",
            "dt,value,lower,upper\n# early\n0.5, 2e44, 1e43, 2e43\n1.0,1e44,1e43,1e43\n",
        );
        let series = load_series(&path, Quantity::Luminosity).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.samples[0].dt, 0.5);
        assert_eq!(series.samples[0].upper, 2e43);
    }

    #[test]
    fn missing_column_and_negative_error_are_input_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "a.csv", "dt,value,lower\n1,2,3\n");
        let err = load_series(&path, Quantity::Radius).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("upper"));

        let path = write_file(&dir, "b.csv", "dt,value,lower,upper\n1,2,-3,1\n");
        assert_eq!(load_series(&path, Quantity::Radius).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn misaligned_series_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let lum = write_file(&dir, "l.csv", "dt,value,lower,upper\n1,1,0,0\n2,1,0,0\n");
        let rad = write_file(&dir, "r.csv", "dt,value,lower,upper\n1,1,0,0\n2,1,0,0\n");
        let temp = write_file(&dir, "t.csv", "dt,value,lower,upper\n1,1,0,0\n3,1,0,0\n");
        let err = load_observations(&lum, &rad, &temp).unwrap_err();
        assert!(err.message().contains("epoch 2"));

        let obs = load_observations(&lum, &rad, &rad).unwrap();
        assert_eq!(obs.len(), 2);
    }

    #[test]
    fn model_grid_must_increase() {
        let dir = tempfile::tempdir().unwrap();
        let ok = write_file(&dir, "m.csv", "dt,lum,rad,temp\n0.1,1,2,3\n1,4,5,6\n");
        let grid = load_model_grid(&ok).unwrap();
        assert_eq!(grid.temperature, vec![3.0, 6.0]);

        let bad = write_file(&dir, "n.csv", "dt,lum,rad,temp\n1,1,2,3\n0.1,4,5,6\n");
        assert_eq!(load_model_grid(&bad).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = load_series(Path::new("/nonexistent/lum.csv"), Quantity::Luminosity).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

//! Photometry table ingest and light-curve preparation.
//!
//! The table is whitespace-delimited, without header, in fixed column order:
//!
//! ```text
//! instrument mjd filter mag emag
//! P48+ZTF 58370.1634 g 19.53 0.08
//! P48+ZTF 58371.1634 r 99.0 99.0
//! ```
//!
//! A magnitude of 99 (or NaN) marks a non-detection. Light-curve time is
//! measured from the first detection in file order.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;

use crate::domain::{Band, BandSeries, LightCurve, LightCurvePoint, PhotometryRecord};
use crate::error::AppError;

const N_COLUMNS: usize = 5;

/// Read every row of a photometry file (detections and non-detections).
pub fn load_photometry(path: &Path) -> Result<Vec<PhotometryRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open photometry '{}': {e}", path.display())))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(file);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            AppError::input(format!("{}: photometry parse error: {e}", path.display()))
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        // Runs of spaces produce empty fields; tabs stay inside one field.
        let fields: Vec<&str> = record.iter().flat_map(str::split_whitespace).collect();
        if fields.is_empty() {
            continue;
        }
        let row = parse_fields(&fields)
            .map_err(|msg| AppError::input(format!("{}: line {line}: {msg}", path.display())))?;
        records.push(row);
    }

    log::debug!("loaded {} photometry rows from {}", records.len(), path.display());
    Ok(records)
}

fn parse_fields(fields: &[&str]) -> Result<PhotometryRecord, String> {
    if fields.len() != N_COLUMNS {
        return Err(format!(
            "expected {N_COLUMNS} columns (instrument mjd filter mag emag), found {}",
            fields.len()
        ));
    }
    let number = |name: &str, text: &str| -> Result<f64, String> {
        text.parse::<f64>()
            .map_err(|e| format!("invalid {name} '{text}': {e}"))
    };

    Ok(PhotometryRecord {
        instrument: fields[0].to_string(),
        mjd: number("mjd", fields[1])?,
        band: Band::parse(fields[2]),
        mag: number("mag", fields[3])?,
        emag: number("emag", fields[4])?,
    })
}

/// MJD of the first detection in file order.
pub fn zero_point(records: &[PhotometryRecord]) -> Option<f64> {
    records.iter().find(|r| r.is_detection()).map(|r| r.mjd)
}

/// Drop non-detections, shift time to the first detection and group by band.
pub fn build_light_curve(records: &[PhotometryRecord]) -> Result<LightCurve, AppError> {
    let zp = zero_point(records)
        .ok_or_else(|| AppError::empty("Photometry has no detections (every magnitude is 99 or NaN)."))?;

    let mut by_band: BTreeMap<Band, Vec<LightCurvePoint>> = BTreeMap::new();
    for r in records.iter().filter(|r| r.is_detection()) {
        by_band.entry(r.band.clone()).or_default().push(LightCurvePoint {
            dt: r.mjd - zp,
            mag: r.mag,
            emag: r.emag,
        });
    }

    let skipped = records.len() - by_band.values().map(Vec::len).sum::<usize>();
    log::info!("light curve zero point: MJD {zp} ({skipped} non-detection(s) dropped)");

    Ok(LightCurve {
        zero_point_mjd: zp,
        bands: by_band
            .into_iter()
            .map(|(band, points)| BandSeries { band, points })
            .collect(),
    })
}

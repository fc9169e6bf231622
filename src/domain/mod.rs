//! Domain types used throughout the pipeline.
//!
//! - time series of physical quantities (`Sample`, `Series`, `Observations`)
//! - the model grid and its interpolation (`ModelGrid`, `ModelOnGrid`)
//! - photometry (`PhotometryRecord`, `Band`, `LightCurve`)
//! - fit inputs/outputs (`FitWindow`, `PowerLawFit`)

pub mod types;

pub use types::*;

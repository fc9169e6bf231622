//! Shared domain types.
//!
//! Everything here is plain data: the loaders in `io` produce these types,
//! the numeric code in `math`/`fit` consumes them, and `report`/`plot` render them.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Solar bolometric luminosity times 10^10, in erg/s.
pub const LUM_UNIT_1E10_LSUN: f64 = 3.839e43;

/// One astronomical unit in cm.
pub const AU_CM: f64 = 1.496e13;

/// Kelvin per kilokelvin.
pub const KK: f64 = 1e3;

/// A physical quantity tracked over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    #[value(name = "lum")]
    Luminosity,
    #[value(name = "rad")]
    Radius,
    #[value(name = "temp")]
    Temperature,
}

impl Quantity {
    pub const ALL: [Quantity; 3] = [Quantity::Luminosity, Quantity::Radius, Quantity::Temperature];

    /// Unit of the values as stored on disk.
    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Luminosity => "erg/s",
            Quantity::Radius => "cm",
            Quantity::Temperature => "K",
        }
    }

    /// Divisor that converts stored values to table display units.
    pub fn display_scale(self) -> f64 {
        match self {
            Quantity::Luminosity => LUM_UNIT_1E10_LSUN,
            Quantity::Radius => AU_CM,
            Quantity::Temperature => KK,
        }
    }

    /// Axis label used on plots.
    pub fn axis_label(self) -> &'static str {
        match self {
            Quantity::Luminosity => "L_bol (erg/s)",
            Quantity::Radius => "R_ph (cm)",
            Quantity::Temperature => "T_eff (K)",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Quantity::Luminosity => "luminosity",
            Quantity::Radius => "radius",
            Quantity::Temperature => "temperature",
        }
    }
}

/// One measurement epoch: time offset (days), value and asymmetric uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub dt: f64,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Sample {
    /// Symmetric sigma used for weighting fits.
    pub fn sigma(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }
}

/// An ordered series of samples for a single quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub quantity: Quantity,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn dts(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.dt).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }
}

/// Luminosity, radius and temperature series sharing a time grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    pub luminosity: Series,
    pub radius: Series,
    pub temperature: Series,
}

impl Observations {
    pub fn series(&self, quantity: Quantity) -> &Series {
        match quantity {
            Quantity::Luminosity => &self.luminosity,
            Quantity::Radius => &self.radius,
            Quantity::Temperature => &self.temperature,
        }
    }

    /// Shared time offsets (taken from the luminosity series).
    pub fn dts(&self) -> Vec<f64> {
        self.luminosity.dts()
    }

    pub fn len(&self) -> usize {
        self.luminosity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.luminosity.is_empty()
    }
}

/// Model predictions on the model's own time grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGrid {
    pub dt: Vec<f64>,
    pub luminosity: Vec<f64>,
    pub radius: Vec<f64>,
    pub temperature: Vec<f64>,
}

impl ModelGrid {
    pub fn column(&self, quantity: Quantity) -> &[f64] {
        match quantity {
            Quantity::Luminosity => &self.luminosity,
            Quantity::Radius => &self.radius,
            Quantity::Temperature => &self.temperature,
        }
    }
}

/// Model values interpolated onto observation time offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOnGrid {
    pub dt: Vec<f64>,
    pub luminosity: Vec<f64>,
    pub radius: Vec<f64>,
    pub temperature: Vec<f64>,
    /// Number of observation epochs that fell outside the model grid.
    pub outside: usize,
}

/// What to do when an observation time lies outside the model grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Extrapolation {
    /// Hold the first/last grid value.
    Clamp,
    /// Extend the first/last grid segment.
    Linear,
    /// Fail the run.
    Error,
}

/// Magnitudes at or above this value are non-detections.
pub const NON_DETECTION_MAG: f64 = 99.0;

/// A photometric filter band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Band {
    U,
    G,
    R,
    I,
    Z,
    Other(String),
}

impl Band {
    pub fn parse(name: &str) -> Band {
        match name {
            "u" => Band::U,
            "g" => Band::G,
            "r" => Band::R,
            "i" => Band::I,
            "z" => Band::Z,
            other => Band::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Band::U => "u",
            Band::G => "g",
            Band::R => "r",
            Band::I => "i",
            Band::Z => "z",
            Band::Other(name) => name,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the photometry table.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotometryRecord {
    pub instrument: String,
    pub mjd: f64,
    pub band: Band,
    pub mag: f64,
    pub emag: f64,
}

impl PhotometryRecord {
    pub fn is_detection(&self) -> bool {
        !self.mag.is_nan() && self.mag < NON_DETECTION_MAG
    }
}

/// A detection placed on the relative time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LightCurvePoint {
    pub dt: f64,
    pub mag: f64,
    pub emag: f64,
}

/// Detections of one band, relative to the light curve zero point.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSeries {
    pub band: Band,
    pub points: Vec<LightCurvePoint>,
}

/// Light curve ready for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct LightCurve {
    /// MJD of the first detection in file order.
    pub zero_point_mjd: f64,
    pub bands: Vec<BandSeries>,
}

/// Selection of samples for a power-law fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitWindow {
    pub quantity: Quantity,
    /// Exclusive lower bound on `dt`.
    pub t_min: Option<f64>,
    /// Exclusive upper bound on `dt`.
    pub t_max: Option<f64>,
    /// Fixed power-law index.
    pub index: f64,
    /// Weight residuals by the sample uncertainties.
    pub weighted: bool,
}

impl FitWindow {
    pub fn contains(&self, dt: f64) -> bool {
        self.t_min.is_none_or(|lo| dt > lo) && self.t_max.is_none_or(|hi| dt < hi)
    }
}

/// Result of a fixed-index power-law fit `y = 10^(index·log10(x) + intercept)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerLawFit {
    pub index: f64,
    pub intercept: f64,
    /// Variance of the intercept.
    pub covariance: f64,
    pub chi2: f64,
    pub n: usize,
    pub weighted: bool,
    pub iterations: usize,
}

impl PowerLawFit {
    pub fn intercept_err(&self) -> f64 {
        self.covariance.sqrt()
    }
}

//! Command-line parsing.
//!
//! Argument parsing and command dispatch stay separate from the numerics and
//! plotting code; `app` turns these structs into calls.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::domain::{Extrapolation, FitWindow, Quantity};
use crate::math::DEFAULT_SIG;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "physevol",
    version,
    about = "Tables and figures for the physical evolution of a transient"
)]
pub struct Cli {
    /// Directory holding the default input files.
    #[arg(long, global = true, env = "PHYSEVOL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the LaTeX table of luminosity, radius and temperature.
    Table(TableArgs),
    /// Plot observations against the model (three log-log panels).
    Compare(CompareArgs),
    /// Fit a fixed-index power law to one quantity and print the result.
    Fit(FitArgs),
    /// Plot the filtered multi-band light curve.
    Lc(LcArgs),
}

/// The three observation series files.
#[derive(Debug, Args, Clone, Default)]
pub struct SeriesArgs {
    /// Luminosity CSV (`dt,value,lower,upper`) [default: <data-dir>/lum.csv].
    #[arg(long, value_name = "CSV")]
    pub lum: Option<PathBuf>,

    /// Radius CSV [default: <data-dir>/rad.csv].
    #[arg(long, value_name = "CSV")]
    pub rad: Option<PathBuf>,

    /// Temperature CSV [default: <data-dir>/temp.csv].
    #[arg(long, value_name = "CSV")]
    pub temp: Option<PathBuf>,
}

impl SeriesArgs {
    /// Explicit paths, falling back to the data directory defaults.
    pub fn resolve(&self, data_dir: &Path) -> [PathBuf; 3] {
        let pick = |path: &Option<PathBuf>, name: &str| path.clone().unwrap_or_else(|| data_dir.join(name));
        [
            pick(&self.lum, "lum.csv"),
            pick(&self.rad, "rad.csv"),
            pick(&self.temp, "temp.csv"),
        ]
    }
}

/// Fit window bounds and power-law options.
#[derive(Debug, Args, Clone)]
pub struct WindowArgs {
    /// Exclusive lower bound on dt (days).
    #[arg(long, allow_hyphen_values = true)]
    pub fit_min: Option<f64>,

    /// Exclusive upper bound on dt (days).
    #[arg(long, allow_hyphen_values = true)]
    pub fit_max: Option<f64>,

    /// Fixed power-law index; accepts fractions like -5/3.
    #[arg(long, value_parser = parse_index, default_value = "-5/3", allow_hyphen_values = true)]
    pub index: f64,

    /// Ignore the uncertainties and fit unweighted.
    #[arg(long)]
    pub unweighted: bool,
}

impl WindowArgs {
    pub fn window(&self, quantity: Quantity) -> FitWindow {
        FitWindow {
            quantity,
            t_min: self.fit_min,
            t_max: self.fit_max,
            index: self.index,
            weighted: !self.unweighted,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Output file.
    #[arg(long, default_value = "physevol_tab.txt")]
    pub out: PathBuf,

    /// Table caption (defaults to the AT2018gep caption).
    #[arg(long)]
    pub caption: Option<String>,

    /// LaTeX label.
    #[arg(long)]
    pub label: Option<String>,

    /// Significant figures for the luminosity, radius and temperature centers
    /// (the dt column keeps 2).
    #[arg(long, default_value_t = DEFAULT_SIG)]
    pub sig: u32,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Model grid CSV (`dt,lum,rad,temp`) [default: <data-dir>/model.csv].
    #[arg(long, value_name = "CSV")]
    pub model: Option<PathBuf>,

    /// Output figure (.svg; .png needs the `ttf` feature).
    #[arg(long, default_value = "physevol_compare.svg")]
    pub out: PathBuf,

    /// Behavior for epochs outside the model grid.
    #[arg(long, value_enum, default_value_t = Extrapolation::Clamp)]
    pub extrapolate: Extrapolation,

    /// Overlay a power-law fit on this quantity's panel.
    #[arg(long, value_enum)]
    pub fit_quantity: Option<Quantity>,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Print an ASCII preview of the luminosity panel.
    #[arg(long)]
    pub preview: bool,

    /// Preview width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Preview height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Quantity to fit.
    #[arg(short = 'q', long, value_enum)]
    pub quantity: Quantity,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Write the fit result to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct LcArgs {
    /// Photometry table [default: <data-dir>/phot.dat].
    #[arg(long, value_name = "FILE")]
    pub phot: Option<PathBuf>,

    /// Output figure (.svg; .png needs the `ttf` feature).
    #[arg(long, default_value = "physevol_lc.svg")]
    pub out: PathBuf,

    /// Print an ASCII preview of the light curve.
    #[arg(long)]
    pub preview: bool,

    /// Preview width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Preview height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Parse a power-law index written as a decimal or a fraction (`-5/3`).
pub fn parse_index(text: &str) -> Result<f64, String> {
    let text = text.trim();
    let value = match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|_| format!("bad numerator in '{text}'"))?;
            let den: f64 = den.trim().parse().map_err(|_| format!("bad denominator in '{text}'"))?;
            if den == 0.0 {
                return Err(format!("zero denominator in '{text}'"));
            }
            num / den
        }
        None => text.parse().map_err(|_| format!("not a number: '{text}'"))?,
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("index must be finite: '{text}'"))
    }
}

//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - loads the data files
//! - runs interpolation and fits
//! - prints reports and previews
//! - writes the table and figures

use std::path::Path;

use clap::Parser;
use env_logger::Env;

use crate::cli::{Cli, CompareArgs, FitArgs, LcArgs, TableArgs};
use crate::error::AppError;
use crate::plot::{AsciiAxes, ComparisonFigure, PlotStyle};
use crate::report::TableOptions;

pub mod pipeline;

use pipeline::DataPaths;

/// Points per fitted curve when overlaying a power law.
const FIT_CURVE_POINTS: usize = 200;

/// Entry point for the `physevol` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    // Fails only when a logger is already installed.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.as_path();

    match cli.command {
        crate::cli::Command::Table(args) => handle_table(args, data_dir),
        crate::cli::Command::Compare(args) => handle_compare(args, data_dir),
        crate::cli::Command::Fit(args) => handle_fit(args, data_dir),
        crate::cli::Command::Lc(args) => handle_lc(args, data_dir),
    }
}

fn handle_table(args: TableArgs, data_dir: &Path) -> Result<(), AppError> {
    let paths = DataPaths::from(args.series.resolve(data_dir));
    let obs = paths.load_observations()?;

    let defaults = TableOptions::default();
    let opts = TableOptions {
        caption: args.caption.unwrap_or(defaults.caption),
        label: args.label.unwrap_or(defaults.label),
        sig: args.sig,
    };
    crate::report::write_table(&args.out, &obs, &opts)?;
    println!("Wrote {} row(s) to {}", obs.len(), args.out.display());
    Ok(())
}

fn handle_compare(args: CompareArgs, data_dir: &Path) -> Result<(), AppError> {
    let paths = DataPaths::from(args.series.resolve(data_dir));
    let model_path = args.model.clone().unwrap_or_else(|| data_dir.join("model.csv"));
    let window = args.fit_quantity.map(|q| args.window.window(q));

    let run = pipeline::run_comparison(&paths, &model_path, args.extrapolate, window)?;

    println!("{}", crate::report::format_comparison_summary(&run.observations, &run.model));
    if let Some((window, fit)) = &run.fit {
        println!("{}", crate::report::format_fit_report(window, fit));
    }

    let (t0, t1) = crate::plot::compare::TIME_BOUNDS;
    let overlay = run
        .fit
        .as_ref()
        .map(|(window, fit)| (window.quantity, crate::fit::sample_fit(fit, t0, t1, FIT_CURVE_POINTS)));

    let style = PlotStyle::default();
    let figure = ComparisonFigure {
        observations: &run.observations,
        model: &run.model,
        overlay,
        style: &style,
    };
    crate::plot::render_comparison(&args.out, &figure)?;

    if args.preview {
        let points: Vec<(f64, f64, char)> = run
            .observations
            .luminosity
            .samples
            .iter()
            .map(|s| (s.dt, s.value, 'o'))
            .collect();
        let curve: Vec<(f64, f64)> = run
            .model
            .dt
            .iter()
            .copied()
            .zip(run.model.luminosity.iter().copied())
            .collect();
        let plot = crate::plot::render_ascii(
            "L_bol (erg/s) vs dt (days)",
            &points,
            Some(&curve),
            AsciiAxes::log_log(),
            args.width,
            args.height,
        );
        println!("{plot}");
    }

    println!("Wrote {}", args.out.display());
    Ok(())
}

fn handle_fit(args: FitArgs, data_dir: &Path) -> Result<(), AppError> {
    let paths = DataPaths::from(args.series.resolve(data_dir));
    let obs = paths.load_observations()?;

    let window = args.window.window(args.quantity);
    let fit = crate::fit::fit_window(obs.series(args.quantity), &window)?;
    println!("{}", crate::report::format_fit_report(&window, &fit));

    if let Some(path) = &args.export {
        crate::io::write_fit_json(path, &window, &fit)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn handle_lc(args: LcArgs, data_dir: &Path) -> Result<(), AppError> {
    let phot = args.phot.clone().unwrap_or_else(|| data_dir.join("phot.dat"));
    let records = crate::io::load_photometry(&phot)?;
    let lc = crate::io::build_light_curve(&records)?;

    crate::plot::render_light_curve(&args.out, &lc, &PlotStyle::default())?;

    if args.preview {
        // Each band is marked with the first letter of its name.
        let points: Vec<(f64, f64, char)> = lc
            .bands
            .iter()
            .flat_map(|series| {
                let mark = series.band.name().chars().next().unwrap_or('o');
                series.points.iter().map(move |p| (p.dt, p.mag, mark))
            })
            .collect();
        let title = crate::plot::lightcurve::zero_point_label(lc.zero_point_mjd);
        let plot = crate::plot::render_ascii(&title, &points, None, AsciiAxes::magnitudes(), args.width, args.height);
        println!("{plot}");
    }

    println!("Wrote {}", args.out.display());
    Ok(())
}

//! Reporting: the LaTeX table and terminal summaries.

use crate::domain::{FitWindow, ModelOnGrid, Observations, PowerLawFit};

pub mod latex;

pub use latex::*;

/// Format a fit summary for the terminal.
pub fn format_fit_report(window: &FitWindow, fit: &PowerLawFit) -> String {
    let mut out = String::new();

    out.push_str("=== physevol - power-law fit ===\n");
    out.push_str(&format!("Quantity: {} ({})\n", window.quantity.display_name(), window.quantity.unit()));
    out.push_str(&format!(
        "Window: {} < dt < {} days\n",
        fmt_bound(window.t_min, "-inf"),
        fmt_bound(window.t_max, "+inf"),
    ));
    out.push_str(&format!(
        "Points: n={} | {}\n",
        fit.n,
        if fit.weighted { "weighted (absolute sigma)" } else { "unweighted" }
    ));
    out.push_str(&format!("Index (fixed): {:.6}\n", fit.index));
    out.push_str(&format!(
        "Intercept: {:.6} +/- {:.6}\n",
        fit.intercept,
        fit.intercept_err()
    ));
    out.push_str(&format!("chi2: {:.4} | iterations: {}\n", fit.chi2, fit.iterations));
    out.push_str(&format!(
        "Model: y = 10^({:.4} * log10(dt) + {:.4})\n",
        fit.index, fit.intercept
    ));

    out
}

/// Format a short observation-vs-model summary for the comparison run.
pub fn format_comparison_summary(obs: &Observations, model: &ModelOnGrid) -> String {
    let dts = obs.dts();
    let (t_min, t_max) = dts
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| (lo.min(t), hi.max(t)));

    let mut out = String::new();
    out.push_str(&format!(
        "Epochs: n={} | dt=[{t_min:.3}, {t_max:.3}] days\n",
        obs.len()
    ));
    if model.outside > 0 {
        out.push_str(&format!("Epochs outside model grid: {}\n", model.outside));
    }

    // Median luminosity ratio is a quick sanity check of the model normalization.
    let mut ratios: Vec<f64> = obs
        .luminosity
        .samples
        .iter()
        .zip(&model.luminosity)
        .map(|(s, m)| s.value / m)
        .filter(|r| r.is_finite())
        .collect();
    ratios.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if let Some(median) = ratios.get(ratios.len() / 2) {
        out.push_str(&format!("Median L_obs / L_model: {median:.3}\n"));
    }

    out
}

fn fmt_bound(bound: Option<f64>, open: &str) -> String {
    bound.map(|v| format!("{v}")).unwrap_or_else(|| open.to_string())
}

//! LaTeX table of the physical evolution.
//!
//! Each row is one epoch; luminosity, radius and temperature cells print the
//! center to two significant figures and the asymmetric uncertainties to the
//! same number of decimals: `$1.2^{+0.3}_{-0.1}$`.

use std::fs;
use std::path::Path;

use crate::domain::{Observations, Quantity, Sample};
use crate::error::AppError;
use crate::math::{DEFAULT_SIG, SigFig, ndec, round_to};

pub const DEFAULT_CAPTION: &str = "Physical evolution of AT2018gep from blackbody fits. \
Uncertainties represent the 16-to-84 percentile range from a Monte Carlo simulation with 600 trials.";

pub const DEFAULT_LABEL: &str = "tab:physevol";

const HEADER: &str = r"$\Delta t$ & $L (10^{10} L_\odot)$ & $R$ (AU) & $T$ (kK) \\";

/// Text options for the table block.
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub caption: String,
    pub label: String,
    pub sig: u32,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            caption: DEFAULT_CAPTION.to_string(),
            label: DEFAULT_LABEL.to_string(),
            sig: DEFAULT_SIG,
        }
    }
}

/// One formatted cell: `$center^{+upper}_{-lower}$`.
pub fn format_cell(center: f64, upper: f64, lower: f64, sig: u32) -> Result<String, AppError> {
    let center = SigFig::new(center, sig)?.to_string();
    let dec = ndec(&center);
    Ok(format!(
        "${center}^{{+{:.dec$}}}_{{-{:.dec$}}}$",
        round_to(upper, dec),
        round_to(lower, dec),
    ))
}

/// Scale a sample to display units and format it as a cell.
fn sample_cell(sample: &Sample, quantity: Quantity, sig: u32) -> Result<String, AppError> {
    let scale = quantity.display_scale();
    format_cell(sample.value / scale, sample.upper / scale, sample.lower / scale, sig).map_err(|e| {
        AppError::new(
            e.exit_code(),
            format!("{} at dt={}: {e}", quantity.display_name(), sample.dt),
        )
    })
}

/// Format the table rows (one per epoch).
///
/// `sig` applies to the quantity cells; the time column always uses
/// `DEFAULT_SIG`.
pub fn format_rows(obs: &Observations, sig: u32) -> Result<Vec<String>, AppError> {
    let mut rows = Vec::with_capacity(obs.len());
    for i in 0..obs.len() {
        let dt = SigFig::new(obs.luminosity.samples[i].dt, DEFAULT_SIG)?;
        let cells: Vec<String> = Quantity::ALL
            .iter()
            .map(|&q| sample_cell(&obs.series(q).samples[i], q, sig))
            .collect::<Result<_, _>>()?;
        rows.push(format!("${dt}$ & {} \\\\", cells.join(" & ")));
    }
    Ok(rows)
}

/// Format the full `table`/`tabular` block.
pub fn format_table(obs: &Observations, opts: &TableOptions) -> Result<String, AppError> {
    let rows = format_rows(obs, opts.sig)?;

    let mut out = String::new();
    out.push_str("\\begin{table}[]\n");
    out.push_str("\\centering\n");
    out.push_str(&format!("\\caption{{{}}}\n", opts.caption));
    out.push_str("\\begin{tabular}{lrrr}\n");
    out.push_str("\\hline\n");
    out.push_str(HEADER);
    out.push('\n');
    out.push_str("\\hline\n");
    for row in rows {
        out.push_str(&row);
        out.push('\n');
    }
    out.push_str("\\hline\n");
    out.push_str("\\end{tabular}\n");
    out.push_str(&format!("\\label{{{}}}\n", opts.label));
    out.push_str("\\end{table}\n");
    Ok(out)
}

/// Format and write the table to `path`.
pub fn write_table(path: &Path, obs: &Observations, opts: &TableOptions) -> Result<(), AppError> {
    let text = format_table(obs, opts)?;
    fs::write(path, text)
        .map_err(|e| AppError::output(format!("Failed to write table '{}': {e}", path.display())))?;
    log::info!("wrote {} table rows to {}", obs.len(), path.display());
    Ok(())
}

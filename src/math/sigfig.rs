//! Significant-figure rounding for table output.
//!
//! A table cell prints a central value with a fixed number of significant
//! figures and its uncertainties with the same number of decimals, e.g.
//! `1.2^{+0.3}_{-0.1}`. The helpers here produce both halves:
//!
//! - `round_sig` / `SigFig` round the center and remember how many decimals
//!   it needs when printed
//! - `ndec` reads the decimals back from the printed text
//! - `round_to` rounds an uncertainty to that many decimals

use std::fmt;

use crate::error::AppError;

/// Default number of significant figures in tables.
pub const DEFAULT_SIG: u32 = 2;

/// Decimal exponent of the leading digit (`floor(log10(|x|))`).
fn leading_exponent(x: f64) -> i32 {
    x.abs().log10().floor() as i32
}

/// Round `x` to `digits` decimals; negative `digits` rounds to tens, hundreds, ...
fn round_decimals(x: f64, digits: i32) -> f64 {
    if digits >= 0 {
        let factor = 10f64.powi(digits);
        (x * factor).round() / factor
    } else {
        let factor = 10f64.powi(-digits);
        (x / factor).round() * factor
    }
}

/// Round `x` to `sig` significant figures.
///
/// Negative values are rounded by magnitude and the sign is reapplied.
/// Zero and non-finite values have no leading digit and are rejected.
pub fn round_sig(x: f64, sig: u32) -> Result<f64, AppError> {
    if x == 0.0 || !x.is_finite() {
        return Err(AppError::numeric(format!(
            "Cannot round {x} to significant figures (value must be finite and non-zero)."
        )));
    }
    if sig == 0 {
        return Err(AppError::numeric("Significant figures must be >= 1."));
    }

    let digits = sig as i32 - 1 - leading_exponent(x);
    let magnitude = round_decimals(x.abs(), digits);
    Ok(if x < 0.0 { -magnitude } else { magnitude })
}

/// Round `x` to `decimals` digits after the decimal point.
pub fn round_to(x: f64, decimals: usize) -> f64 {
    round_decimals(x, decimals as i32)
}

/// Count digits after the decimal point in a textual number.
///
/// `"1.20"` has 2, `"5"` has 0. An exponent suffix (`"1.5e-3"`) is not part
/// of the fraction.
pub fn ndec(text: &str) -> usize {
    let mantissa = text
        .trim()
        .split(['e', 'E'])
        .next()
        .unwrap_or_default();
    match mantissa.split_once('.') {
        Some((_, frac)) => frac.len(),
        None => 0,
    }
}

/// A value rounded to significant figures, printed with exactly that precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigFig {
    pub value: f64,
    pub decimals: usize,
}

impl SigFig {
    pub fn new(x: f64, sig: u32) -> Result<Self, AppError> {
        let value = round_sig(x, sig)?;
        // Rounding can carry into a new leading digit (9.96 -> 10), so the
        // decimal count comes from the rounded value.
        let decimals = (sig as i32 - 1 - leading_exponent(value)).max(0) as usize;
        Ok(Self { value, decimals })
    }
}

impl fmt::Display for SigFig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", self.decimals, self.value)
    }
}

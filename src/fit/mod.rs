//! Curve fitting.
//!
//! - `powerlaw`: fixed-index power-law fit (intercept + covariance)
//! - `window`: pick a quantity and time window from the observations and fit it

pub mod powerlaw;
pub mod window;

pub use powerlaw::*;
pub use window::*;

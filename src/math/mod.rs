//! Numeric helpers: significant figures, interpolation, weighted least squares.

pub mod interp;
pub mod ols;
pub mod sigfig;

pub use interp::*;
pub use ols::*;
pub use sigfig::*;

//! Model curves evaluated by the fitter and the plots.

pub mod powerlaw;

pub use powerlaw::*;

//! Input/output helpers.
//!
//! - observed series + model grid CSV ingest (`series`)
//! - photometry table ingest and light-curve preparation (`photometry`)
//! - fit JSON export (`export`)

pub mod export;
pub mod photometry;
pub mod series;

pub use export::*;
pub use photometry::*;
pub use series::*;

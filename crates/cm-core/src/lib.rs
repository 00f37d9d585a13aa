//! cm-core: stable foundation for the compartmental simulation workspace.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - grid (validated, strictly increasing output grids)
//! - params (named scalar parameter sets)
//! - error (shared error types)

pub mod error;
pub mod grid;
pub mod numeric;
pub mod params;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use grid::TimeGrid;
pub use numeric::*;
pub use params::ParamSet;

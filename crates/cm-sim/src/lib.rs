//! Trajectory integration for compartmental ODE systems.
//!
//! Provides:
//! - `OdeModel` trait for pluggable right-hand sides (optionally piecewise in time)
//! - Adaptive explicit steppers (Dormand-Prince 5(4), step-doubling RK4)
//! - A driver that lands exactly on every requested output point and treats
//!   phase-switch times as mandatory breakpoints
//! - `Trajectory` output with integrator statistics

pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;
pub mod trajectory;

// Internal modules
mod breakpoints;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{DormandPrince45, Integrator, Rk4, StepEstimate};
pub use model::{ClosureModel, OdeModel};
pub use sim::{IntegratorType, SimOptions, integrate, integrate_with};
pub use trajectory::{SimStats, Trajectory};

//! cm-app: configuration-driven runs on top of the model catalog.
//!
//! A front end (CLI, notebook, plotting script) hands over a `RunConfig`
//! parsed from YAML or JSON, gets a `ModelRun` back from `execute`, and
//! converts it to a `RunSeries` for rendering. `run_sweep` repeats a run
//! across values of one parameter on the rayon pool.

pub mod config;
pub mod error;
pub mod run_service;
pub mod series;
pub mod sweep;

pub use config::{GridConfig, IntegratorKind, RunConfig, SolverConfig};
pub use error::{AppError, AppResult};
pub use run_service::{execute, execute_file};
pub use series::{NamedSeries, RunSeries};
pub use sweep::{SweepPoint, SweepRequest, SweepResult, run_sweep};

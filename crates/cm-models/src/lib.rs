//! cm-models: catalog of compartmental models.
//!
//! Provides:
//! - Epidemic and information-diffusion ODEs (SIR, SIRS, two-phase SIUAR)
//! - Closed-form evaluators sharing the same record shape (two-level
//!   decoherence with von Neumann entropy, coherence decay, radiative
//!   altitude temperature profile)
//! - `ModelCatalog`: name -> `ModelEntry` lookup with defaults for
//!   parameters, initial state and output grid
//!
//! # Example
//!
//! ```no_run
//! use cm_models::{ModelCatalog, RunOverrides};
//! use cm_sim::SimOptions;
//!
//! let catalog = ModelCatalog::builtin();
//! let entry = catalog.get("sir").unwrap();
//! let run = entry.run(&RunOverrides::default(), &SimOptions::default()).unwrap();
//! println!("peak infected: {:?}", run.series("I").unwrap().iter().cloned().fold(0.0, f64::max));
//! ```

pub mod catalog;
pub mod decoherence;
pub mod error;
pub mod radiative;
pub mod run;
pub mod sir;
pub mod sirs;
pub mod siuar;

mod common;

// Re-exports for ergonomics
pub use catalog::{BoundOde, Dynamics, ModelCatalog, ModelEntry, OdeBinder, builtin_models};
pub use decoherence::{DecoherenceParams, von_neumann_entropy};
pub use error::{ModelError, ModelResult};
pub use radiative::{RadiativeParams, STEFAN_BOLTZMANN, SurfaceProfile};
pub use run::{ModelRun, RunOverrides};
pub use sir::{Sir, SirParams};
pub use sirs::{Sirs, SirsParams};
pub use siuar::{Phase, Siuar, SiuarParams};

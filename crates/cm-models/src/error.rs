//! Model catalog errors.

use cm_core::CoreError;
use cm_sim::{SimError, Trajectory};
use thiserror::Error;

/// Result type for catalog operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone)]
pub enum ModelError {
    /// No catalog entry matches the requested name or alias.
    #[error("Unknown model: {name}")]
    UnknownModel { name: String },

    /// Bad parameter override, initial state or grid.
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    /// Integration failed after validation (divergence).
    #[error(transparent)]
    Simulation(SimError),
}

impl ModelError {
    pub fn invalid(what: impl Into<String>) -> Self {
        ModelError::InvalidInput { what: what.into() }
    }

    pub fn partial_trajectory(&self) -> Option<&Trajectory> {
        match self {
            ModelError::Simulation(e) => e.partial_trajectory(),
            _ => None,
        }
    }
}

impl From<CoreError> for ModelError {
    fn from(e: CoreError) -> Self {
        ModelError::InvalidInput {
            what: e.to_string(),
        }
    }
}

impl From<SimError> for ModelError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::InvalidInput { what } => ModelError::InvalidInput { what },
            divergence => ModelError::Simulation(divergence),
        }
    }
}

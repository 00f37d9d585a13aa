//! Error types for trajectory integration.

use cm_core::{CoreError, Real};
use thiserror::Error;

use crate::trajectory::Trajectory;

/// Errors encountered during integration.
#[derive(Error, Debug, Clone)]
pub enum SimError {
    /// Malformed grid, wrong state/derivative length, bad options.
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    /// Step size collapsed (or the state blew up) before the next output
    /// point could be reached. `partial` holds every output row computed so far.
    #[error("Integration diverged at t={t} (dt={dt:e}): {reason}")]
    IntegrationDivergence {
        t: Real,
        dt: Real,
        reason: String,
        partial: Box<Trajectory>,
    },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn invalid(what: impl Into<String>) -> Self {
        SimError::InvalidInput { what: what.into() }
    }

    /// Valid trajectory prefix carried by a divergence, if any.
    pub fn partial_trajectory(&self) -> Option<&Trajectory> {
        match self {
            SimError::IntegrationDivergence { partial, .. } => Some(partial),
            SimError::InvalidInput { .. } => None,
        }
    }
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        SimError::InvalidInput {
            what: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_error_becomes_invalid_input() {
        let err: SimError = CoreError::invalid("time grid must be strictly increasing").into();
        assert!(matches!(err, SimError::InvalidInput { .. }));
        assert!(err.to_string().contains("strictly increasing"));
        assert!(err.partial_trajectory().is_none());
    }
}

//! Error types for the cm-app service layer.

use std::path::PathBuf;

use cm_core::CoreError;
use cm_models::ModelError;

/// Wraps catalog, configuration and I/O failures behind one type for front
/// ends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        AppError::InvalidInput(e.to_string())
    }
}

impl AppError {
    /// Trajectory prefix computed before an integration diverged.
    pub fn partial_trajectory(&self) -> Option<&cm_sim::Trajectory> {
        match self {
            AppError::Model(e) => e.partial_trajectory(),
            _ => None,
        }
    }

    pub fn is_unknown_model(&self) -> bool {
        matches!(self, AppError::Model(ModelError::UnknownModel { .. }))
    }

    /// True for malformed configuration at any layer.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AppError::InvalidInput(_)
                | AppError::Yaml(_)
                | AppError::Json(_)
                | AppError::Model(ModelError::InvalidInput { .. })
        )
    }
}

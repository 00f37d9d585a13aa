use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: String, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Unknown parameter: {name}")]
    UnknownParam { name: String },

    #[error("Missing parameter: {name}")]
    MissingParam { name: String },
}

impl CoreError {
    pub fn invalid(what: impl Into<String>) -> Self {
        CoreError::InvalidArg { what: what.into() }
    }
}

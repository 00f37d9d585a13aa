use crate::CoreError;

/// Floating point type used throughout the workspace
pub type Real = f64;

/// Absolute/relative tolerance pair: the local error target of the adaptive
/// integrators.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    /// Default local error target for trajectory integration.
    pub const fn integration() -> Self {
        Self {
            abs: 1e-8,
            rel: 1e-6,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.abs.is_finite() || self.abs <= 0.0 {
            return Err(CoreError::invalid("absolute tolerance must be finite and > 0"));
        }
        if !self.rel.is_finite() || self.rel < 0.0 {
            return Err(CoreError::invalid("relative tolerance must be finite and >= 0"));
        }
        Ok(())
    }
}

pub fn ensure_finite(v: Real, what: &str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite {
            what: what.to_string(),
            value: v,
        })
    }
}

/// Check every component of a vector, naming the first offending index.
pub fn ensure_all_finite(values: &[Real], what: &str) -> Result<(), CoreError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(CoreError::NonFinite {
            what: format!("{what}[{i}]"),
            value: values[i],
        }),
        None => Ok(()),
    }
}

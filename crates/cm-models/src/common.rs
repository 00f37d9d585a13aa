//! Parameter readers shared by the model definitions.

use cm_core::{CoreError, CoreResult, ParamSet, Real};

/// Strictly positive, finite parameter (population sizes, scales).
pub(crate) fn positive(params: &ParamSet, name: &str) -> CoreResult<Real> {
    let v = params.get(name)?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::invalid(format!("parameter {name} must be positive, got {v}")))
    }
}

/// Non-negative, finite parameter (rates).
pub(crate) fn rate(params: &ParamSet, name: &str) -> CoreResult<Real> {
    let v = params.get(name)?;
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(CoreError::invalid(format!("rate {name} must be non-negative, got {v}")))
    }
}

/// Any finite parameter (times, angles, temperatures).
pub(crate) fn finite(params: &ParamSet, name: &str) -> CoreResult<Real> {
    let v = params.get(name)?;
    cm_core::ensure_finite(v, name)
}

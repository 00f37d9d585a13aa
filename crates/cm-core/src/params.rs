//! Named scalar parameter sets.

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::numeric::Real;

/// Immutable-by-convention mapping from parameter name to value.
///
/// Keys are case-sensitive (`N` and `n` are different parameters).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ParamSet {
    values: BTreeMap<String, Real>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: Real) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Real) -> Option<Real> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> CoreResult<Real> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| CoreError::MissingParam {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Real)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Apply `overrides` on top of `self`.
    ///
    /// Every override key must already exist in `self`; the receiver acts as
    /// the schema of recognized keys.
    pub fn merged(&self, overrides: &ParamSet) -> CoreResult<ParamSet> {
        let mut merged = self.clone();
        for (name, value) in overrides.iter() {
            if !self.contains(name) {
                return Err(CoreError::UnknownParam {
                    name: name.to_string(),
                });
            }
            if !value.is_finite() {
                return Err(CoreError::NonFinite {
                    what: format!("parameter {name}"),
                    value,
                });
            }
            merged.insert(name, value);
        }
        Ok(merged)
    }
}

impl<K: Into<String>> FromIterator<(K, Real)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, Real)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sir_defaults() -> ParamSet {
        ParamSet::new()
            .with("N", 1000.0)
            .with("beta", 1.8)
            .with("gamma", 0.2)
    }

    #[test]
    fn get_missing_parameter() {
        let err = sir_defaults().get("xi").unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingParam {
                name: "xi".to_string()
            }
        );
    }

    #[test]
    fn merged_overrides_known_keys() {
        let overrides = ParamSet::new().with("beta", 0.25);
        let merged = sir_defaults().merged(&overrides).unwrap();
        assert_eq!(merged.get("beta").unwrap(), 0.25);
        assert_eq!(merged.get("gamma").unwrap(), 0.2);
    }

    #[test]
    fn merged_rejects_unknown_key() {
        let overrides = ParamSet::new().with("t_A", 7.0);
        let err = sir_defaults().merged(&overrides).unwrap_err();
        assert!(matches!(err, CoreError::UnknownParam { .. }));
    }

    #[test]
    fn merged_rejects_nan_value() {
        let overrides = ParamSet::new().with("beta", Real::NAN);
        assert!(sir_defaults().merged(&overrides).is_err());
    }

    #[test]
    fn collect_from_pairs() {
        let params: ParamSet = [("beta", 2.5), ("gamma", 0.5)].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("gamma").unwrap(), 0.5);
    }
}

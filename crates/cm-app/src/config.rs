//! Run configuration as read from YAML or JSON.
//!
//! ```yaml
//! model: siuar
//! params: { beta: 2.5, gamma: 0.5, t_A: 7 }
//! time_grid: { t_start: 0, t_end: 21, num_points: 21 }
//! initial_state: [998, 1, 0, 1, 0]
//! solver: { rtol: 1.0e-6, atol: 1.0e-8, integrator: dormand_prince45 }
//! ```

use std::path::Path;

use cm_core::{CoreResult, ParamSet, Real, TimeGrid, Tolerances};
use cm_models::RunOverrides;
use cm_sim::{IntegratorType, SimOptions};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Catalog name or alias.
    pub model: String,
    /// Overrides on top of the model's default parameters.
    #[serde(default)]
    pub params: ParamSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_grid: Option<GridConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<Vec<Real>>,
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Either explicit output times or an evenly spaced range (endpoints
/// included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridConfig {
    Points(Vec<Real>),
    Range {
        t_start: Real,
        t_end: Real,
        num_points: usize,
    },
}

impl GridConfig {
    pub fn to_grid(&self) -> CoreResult<TimeGrid> {
        match self {
            GridConfig::Points(points) => TimeGrid::new(points.clone()),
            GridConfig::Range {
                t_start,
                t_end,
                num_points,
            } => TimeGrid::linspace(*t_start, *t_end, *num_points),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    #[default]
    DormandPrince45,
    Rk4,
}

impl From<IntegratorKind> for IntegratorType {
    fn from(kind: IntegratorKind) -> Self {
        match kind {
            IntegratorKind::DormandPrince45 => IntegratorType::DormandPrince45,
            IntegratorKind::Rk4 => IntegratorType::Rk4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub rtol: Real,
    pub atol: Real,
    pub integrator: IntegratorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_dt: Option<Real>,
    pub min_dt: Real,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_dt: Option<Real>,
    pub max_steps: usize,
    /// Extra mandatory landing times on top of the model's own switch times.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breakpoints: Vec<Real>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let opts = SimOptions::default();
        Self {
            rtol: opts.tolerances.rel,
            atol: opts.tolerances.abs,
            integrator: IntegratorKind::default(),
            initial_dt: opts.initial_dt,
            min_dt: opts.min_dt,
            max_dt: opts.max_dt,
            max_steps: opts.max_steps,
            breakpoints: opts.breakpoints,
        }
    }
}

impl SolverConfig {
    pub fn to_options(&self) -> SimOptions {
        SimOptions {
            tolerances: Tolerances {
                abs: self.atol,
                rel: self.rtol,
            },
            integrator: self.integrator.into(),
            initial_dt: self.initial_dt,
            min_dt: self.min_dt,
            max_dt: self.max_dt,
            max_steps: self.max_steps,
            breakpoints: self.breakpoints.clone(),
            ..SimOptions::default()
        }
    }
}

impl RunConfig {
    /// Run `model` with all defaults.
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            params: ParamSet::new(),
            time_grid: None,
            initial_state: None,
            solver: SolverConfig::default(),
        }
    }

    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from disk; `.json` files are parsed as JSON, anything else as
    /// YAML.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn to_yaml_string(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn overrides(&self) -> AppResult<RunOverrides> {
        let time_grid = self.time_grid.as_ref().map(GridConfig::to_grid).transpose()?;
        Ok(RunOverrides {
            params: self.params.clone(),
            time_grid,
            initial_state: self.initial_state.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_example() {
        let yaml = r#"
model: siuar
params: { beta: 2.5, gamma: 0.5, t_A: 7 }
time_grid: { t_start: 0, t_end: 21, num_points: 21 }
initial_state: [998, 1, 0, 1, 0]
solver: { rtol: 1.0e-6, atol: 1.0e-8, integrator: dormand_prince45 }
"#;
        let cfg = RunConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.model, "siuar");
        assert_eq!(cfg.params.get("t_A").unwrap(), 7.0);
        assert_eq!(
            cfg.time_grid,
            Some(GridConfig::Range {
                t_start: 0.0,
                t_end: 21.0,
                num_points: 21
            })
        );
        assert_eq!(cfg.solver.integrator, IntegratorKind::DormandPrince45);
        assert_eq!(cfg.solver.max_steps, SimOptions::default().max_steps);
    }

    #[test]
    fn explicit_time_points() {
        let cfg = RunConfig::from_yaml_str("model: sir\ntime_grid: [0, 1.5, 4]\n").unwrap();
        let grid = cfg.overrides().unwrap().time_grid.unwrap();
        assert_eq!(grid.as_slice(), &[0.0, 1.5, 4.0]);
    }

    #[test]
    fn minimal_json() {
        let cfg = RunConfig::from_json_str(r#"{"model": "sirs", "solver": {"integrator": "rk4"}}"#)
            .unwrap();
        assert_eq!(cfg.solver.integrator, IntegratorKind::Rk4);
        assert!(matches!(cfg.solver.to_options().integrator, IntegratorType::Rk4));
        assert_eq!(cfg.solver.rtol, 1e-6);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(RunConfig::from_yaml_str("model: sir\nsovler: {}\n").is_err());
        assert!(RunConfig::from_yaml_str("model: sir\nsolver: { tol: 1 }\n").is_err());
    }

    #[test]
    fn bad_grid_surfaces_as_invalid_input() {
        let cfg = RunConfig::from_yaml_str("model: sir\ntime_grid: [5, 3]\n").unwrap();
        assert!(matches!(cfg.overrides(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn yaml_round_trip_keeps_overrides() {
        let mut cfg = RunConfig::for_model("sir");
        cfg.params.insert("beta", 1.1);
        let back = RunConfig::from_yaml_str(&cfg.to_yaml_string().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }
}

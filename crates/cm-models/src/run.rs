//! Resolving a catalog entry plus caller overrides into a trajectory.

use cm_core::{ParamSet, Real, TimeGrid};
use cm_sim::{OdeModel, SimOptions, Trajectory, integrate_with};
use tracing::debug;

use crate::catalog::{Dynamics, ModelEntry};
use crate::error::{ModelError, ModelResult};

/// Per-run deviations from a model's defaults.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// Merged over the default parameters; unknown keys are rejected.
    pub params: ParamSet,
    pub time_grid: Option<TimeGrid>,
    /// Only meaningful for integrated models.
    pub initial_state: Option<Vec<Real>>,
}

/// Output of one model run, labeled for presentation.
#[derive(Debug, Clone)]
pub struct ModelRun {
    pub model: &'static str,
    pub display_name: &'static str,
    pub state_names: &'static [&'static str],
    pub params: ParamSet,
    pub trajectory: Trajectory,
    /// Phase-switch times strictly inside the grid.
    pub markers: Vec<Real>,
}

impl ModelRun {
    pub fn series(&self, state: &str) -> Option<Vec<Real>> {
        let index = self.state_names.iter().position(|n| *n == state)?;
        self.trajectory.series(index)
    }

    pub fn times(&self) -> &[Real] {
        &self.trajectory.t
    }
}

impl ModelEntry {
    pub fn run(&self, overrides: &RunOverrides, opts: &SimOptions) -> ModelResult<ModelRun> {
        let params = (self.default_params)().merged(&overrides.params)?;
        let grid = match &overrides.time_grid {
            Some(grid) => grid.clone(),
            None => (self.default_time_grid)()?,
        };

        let (trajectory, markers) = match self.dynamics {
            Dynamics::Ode(bind) => {
                let model = bind(&params)?;
                let x0 = match &overrides.initial_state {
                    Some(x0) => x0.clone(),
                    None => (self.default_initial_state)(&params)?,
                };
                if x0.len() != self.state_names.len() {
                    return Err(ModelError::invalid(format!(
                        "initial state for '{}' has {} components, expected {} ({})",
                        self.name,
                        x0.len(),
                        self.state_names.len(),
                        self.state_names.join(", ")
                    )));
                }
                let mut markers: Vec<Real> = OdeModel::switch_times(&*model, &params)?
                    .into_iter()
                    .filter(|&t| grid.strictly_contains(t))
                    .collect();
                markers.sort_by(Real::total_cmp);
                markers.dedup();
                let trajectory = integrate_with(&*model, &x0, grid.as_slice(), &params, opts)?;
                (trajectory, markers)
            }
            Dynamics::ClosedForm(evaluate) => {
                if overrides.initial_state.is_some() {
                    return Err(ModelError::invalid(format!(
                        "model '{}' is evaluated in closed form and takes no initial state",
                        self.name
                    )));
                }
                let rows = evaluate(&grid, &params)?;
                let trajectory = Trajectory::from_rows(grid.as_slice().to_vec(), rows)?;
                (trajectory, Vec::new())
            }
        };

        debug!(
            model = self.name,
            points = trajectory.len(),
            accepted = trajectory.stats.accepted_steps,
            rejected = trajectory.stats.rejected_steps,
            "model run complete"
        );

        Ok(ModelRun {
            model: self.name,
            display_name: self.display_name,
            state_names: self.state_names,
            params,
            trajectory,
            markers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModelCatalog;

    fn run(name: &str, overrides: RunOverrides) -> ModelResult<ModelRun> {
        ModelCatalog::builtin()
            .get(name)?
            .run(&overrides, &SimOptions::default())
    }

    #[test]
    fn default_sir_run_echoes_grid() {
        let out = run("sir", RunOverrides::default()).unwrap();
        assert_eq!(out.times().len(), 160);
        assert_eq!(out.series("S").unwrap()[0], 999.0);
        assert!(out.markers.is_empty());
    }

    #[test]
    fn siuar_reports_switch_marker() {
        let out = run("siuar", RunOverrides::default()).unwrap();
        assert_eq!(out.markers, vec![7.0]);
        assert_eq!(out.trajectory.stats.breakpoints_crossed, 1);
    }

    #[test]
    fn marker_outside_grid_is_dropped() {
        let overrides = RunOverrides {
            params: ParamSet::new().with("t_A", 50.0),
            ..RunOverrides::default()
        };
        assert!(run("siuar", overrides).unwrap().markers.is_empty());
    }

    #[test]
    fn unknown_parameter_is_invalid_input() {
        let overrides = RunOverrides {
            params: ParamSet::new().with("delta", 0.1),
            ..RunOverrides::default()
        };
        let err = run("sir", overrides).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput { ref what } if what.contains("delta")));
    }

    #[test]
    fn wrong_initial_state_length() {
        let overrides = RunOverrides {
            initial_state: Some(vec![999.0, 1.0]),
            ..RunOverrides::default()
        };
        assert!(matches!(
            run("sirs", overrides),
            Err(ModelError::InvalidInput { .. })
        ));
    }

    #[test]
    fn closed_form_rejects_initial_state() {
        let overrides = RunOverrides {
            initial_state: Some(vec![0.5]),
            ..RunOverrides::default()
        };
        assert!(run("coherence", overrides).is_err());
    }

    #[test]
    fn closed_form_on_custom_grid() {
        let overrides = RunOverrides {
            time_grid: Some(TimeGrid::new(vec![0.0, 1.0]).unwrap()),
            ..RunOverrides::default()
        };
        let out = run("coherence", overrides).unwrap();
        let rho = out.series("rho01").unwrap();
        assert!((rho[0] - 0.5).abs() < 1e-12);
        assert!((rho[1] - 0.1839).abs() < 1e-4);
    }
}

//! Catalog lookups and end-to-end runs through `ModelEntry::run`.

use cm_core::{ParamSet, TimeGrid};
use cm_models::{Dynamics, ModelCatalog, ModelEntry, ModelError, RunOverrides, sir};
use cm_sim::SimOptions;

#[test]
fn sir_without_infection_stays_put() {
    let catalog = ModelCatalog::builtin();
    let overrides = RunOverrides {
        initial_state: Some(vec![1000.0, 0.0, 0.0]),
        ..RunOverrides::default()
    };
    let run = catalog
        .get("sir")
        .unwrap()
        .run(&overrides, &SimOptions::default())
        .unwrap();
    for row in &run.trajectory.x {
        assert_eq!(row, &vec![1000.0, 0.0, 0.0]);
    }
}

#[test]
fn unregistered_model_fails() {
    let err = ModelCatalog::builtin().get("seirs").unwrap_err();
    assert!(matches!(err, ModelError::UnknownModel { .. }));
}

#[test]
fn every_builtin_runs_with_defaults() {
    let catalog = ModelCatalog::builtin();
    for entry in catalog.iter() {
        let run = entry
            .run(&RunOverrides::default(), &SimOptions::default())
            .unwrap_or_else(|e| panic!("{}: {e}", entry.name));
        let grid = (entry.default_time_grid)().unwrap();
        assert_eq!(run.trajectory.t, grid.as_slice());
        assert_eq!(run.trajectory.dimension(), entry.state_names.len());
        for name in entry.state_names {
            assert!(run.series(name).is_some());
        }
    }
}

#[test]
fn decoherence_entropy_starts_pure() {
    let run = ModelCatalog::builtin()
        .get("decoherence")
        .unwrap()
        .run(&RunOverrides::default(), &SimOptions::default())
        .unwrap();
    let entropy = run.series("entropy").unwrap();
    assert!(entropy[0] < 1e-9);
    assert!(entropy[entropy.len() - 1] > 0.9);
}

#[test]
fn caller_registered_model_is_runnable() {
    fn params() -> ParamSet {
        ParamSet::new()
            .with("N", 10.0)
            .with("beta", 0.0)
            .with("gamma", 1.0)
    }
    fn initial(_: &ParamSet) -> cm_models::ModelResult<Vec<f64>> {
        Ok(vec![0.0, 10.0, 0.0])
    }
    fn grid() -> cm_core::CoreResult<TimeGrid> {
        TimeGrid::linspace(0.0, 1.0, 3)
    }

    let mut catalog = ModelCatalog::builtin();
    catalog
        .register(ModelEntry {
            name: "pure_recovery",
            display_name: "Recovery only",
            aliases: &[],
            state_names: &["S", "I", "R"],
            dynamics: Dynamics::Ode(sir::bind),
            default_params: params,
            default_initial_state: initial,
            default_time_grid: grid,
        })
        .unwrap();

    let run = catalog
        .get("PURE_RECOVERY")
        .unwrap()
        .run(&RunOverrides::default(), &SimOptions::default())
        .unwrap();
    let infected = run.series("I").unwrap();
    assert!((infected[2] - 10.0 * (-1.0_f64).exp()).abs() < 1e-5);
}

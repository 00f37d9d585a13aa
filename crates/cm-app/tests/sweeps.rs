//! Parameter sweeps over the rayon pool.

use cm_app::{RunConfig, SweepRequest, run_sweep};
use cm_models::ModelCatalog;

fn beta_sweep(values: Vec<f64>) -> SweepRequest {
    SweepRequest {
        base: RunConfig::for_model("sir"),
        parameter: "beta".into(),
        values,
    }
}

#[test]
fn points_keep_input_order() {
    let catalog = ModelCatalog::builtin();
    let values: Vec<f64> = (1..=12).map(|i| 0.15 * i as f64).collect();
    let result = run_sweep(&catalog, &beta_sweep(values.clone())).unwrap();

    assert_eq!(result.num_successful, values.len());
    assert_eq!(result.num_failed, 0);
    assert_eq!(result.successful_values(), values);
    for (point, expected) in result.points.iter().zip(&values) {
        let run = point.outcome.as_ref().unwrap();
        assert_eq!(run.params.get("beta").unwrap(), *expected);
    }
}

#[test]
fn stronger_transmission_raises_the_peak() {
    let catalog = ModelCatalog::builtin();
    let result = run_sweep(&catalog, &beta_sweep(vec![0.3, 0.9, 1.8])).unwrap();
    let peaks = result.reduce("I", |s| s.iter().cloned().fold(0.0, f64::max));
    assert_eq!(peaks.len(), 3);
    assert!(peaks[0].1 < peaks[1].1 && peaks[1].1 < peaks[2].1);
}

#[test]
fn failing_point_does_not_abort_the_sweep() {
    let catalog = ModelCatalog::builtin();
    let request = SweepRequest {
        base: RunConfig::for_model("sir"),
        parameter: "N".into(),
        values: vec![1000.0, -5.0, 500.0],
    };
    let result = run_sweep(&catalog, &request).unwrap();
    assert_eq!(result.num_successful, 2);
    assert_eq!(result.num_failed, 1);
    assert!(result.points[1].outcome.is_err());
    assert_eq!(result.successful_values(), vec![1000.0, 500.0]);
}

#[test]
fn unknown_sweep_parameter_is_rejected_up_front() {
    let catalog = ModelCatalog::builtin();
    let request = SweepRequest {
        base: RunConfig::for_model("sir"),
        parameter: "xi".into(),
        values: vec![0.1],
    };
    assert!(run_sweep(&catalog, &request).unwrap_err().is_invalid_input());
}

#[test]
fn empty_or_non_finite_values_are_rejected() {
    let catalog = ModelCatalog::builtin();
    assert!(run_sweep(&catalog, &beta_sweep(vec![])).is_err());
    assert!(run_sweep(&catalog, &beta_sweep(vec![0.5, f64::NAN])).is_err());
}

#[test]
fn unknown_model_sweep() {
    let catalog = ModelCatalog::builtin();
    let mut request = beta_sweep(vec![1.0]);
    request.base.model = "seir".into();
    assert!(run_sweep(&catalog, &request).unwrap_err().is_unknown_model());
}

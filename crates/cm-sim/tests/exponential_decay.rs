//! Accuracy and output-grid tests on dx/dt = -k x.

use cm_core::{ParamSet, Real};
use cm_sim::{ClosureModel, IntegratorType, SimOptions, integrate, integrate_with};
use proptest::prelude::*;

fn decay() -> ClosureModel<impl Fn(Real, &[Real], &ParamSet) -> Vec<Real>> {
    ClosureModel::new(1, |_t, x: &[Real], p: &ParamSet| {
        let k = p.get("k").unwrap_or(1.0);
        vec![-k * x[0]]
    })
}

#[test]
fn matches_closed_form_on_uneven_grid() {
    let times = [0.0, 0.1, 0.35, 1.0, 2.5, 4.0, 10.0];
    let params = ParamSet::new().with("k", 0.7);
    let traj = integrate(&decay(), &[2.0], &times, &params).expect("integration should succeed");

    assert_eq!(traj.len(), times.len());
    for (i, &t) in times.iter().enumerate() {
        let exact = 2.0 * (-0.7 * t).exp();
        let got = traj.x[i][0];
        assert!(
            (got - exact).abs() <= 1e-5 * exact.abs() + 1e-7,
            "t={t}: got {got}, expected {exact}"
        );
    }
}

#[test]
fn output_times_echo_the_grid_exactly() {
    let times: Vec<Real> = (0..37).map(|i| 0.3 * i as Real + 0.01 * (i * i) as Real).collect();
    let traj = integrate(&decay(), &[1.0], &times, &ParamSet::new()).unwrap();
    assert_eq!(traj.t, times);
    assert_eq!(traj.x[0], vec![1.0]);
}

#[test]
fn rk4_step_doubling_agrees_with_dormand_prince() {
    let times = [0.0, 1.0, 2.0, 3.0];
    let opts = SimOptions {
        integrator: IntegratorType::Rk4,
        ..SimOptions::default()
    };
    let rk4 = integrate_with(&decay(), &[1.0], &times, &ParamSet::new(), &opts).unwrap();
    let dp = integrate(&decay(), &[1.0], &times, &ParamSet::new()).unwrap();
    for (a, b) in rk4.x.iter().zip(&dp.x) {
        assert!((a[0] - b[0]).abs() < 1e-5);
    }
    assert!(rk4.stats.accepted_steps > 0);
}

#[test]
fn tighter_tolerance_is_more_accurate() {
    let times = [0.0, 5.0];
    let loose = SimOptions {
        tolerances: cm_core::Tolerances {
            abs: 1e-4,
            rel: 1e-3,
        },
        ..SimOptions::default()
    };
    let tight = SimOptions {
        tolerances: cm_core::Tolerances {
            abs: 1e-12,
            rel: 1e-10,
        },
        ..SimOptions::default()
    };
    let exact = (-5.0_f64).exp();
    let a = integrate_with(&decay(), &[1.0], &times, &ParamSet::new(), &loose).unwrap();
    let b = integrate_with(&decay(), &[1.0], &times, &ParamSet::new(), &tight).unwrap();
    let err_loose = (a.x[1][0] - exact).abs();
    let err_tight = (b.x[1][0] - exact).abs();
    assert!(err_tight < 1e-9);
    assert!(err_tight <= err_loose);
    assert!(b.stats.accepted_steps > a.stats.accepted_steps);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn decay_stays_close_to_exact(k in 0.01_f64..5.0, x0 in 0.1_f64..1e3) {
        let times = [0.0, 0.5, 1.0, 2.0];
        let params = ParamSet::new().with("k", k);
        let traj = integrate(&decay(), &[x0], &times, &params).unwrap();
        for (t, row) in traj.t.iter().zip(&traj.x) {
            let exact = x0 * (-k * t).exp();
            prop_assert!((row[0] - exact).abs() <= 1e-5 * exact + 1e-7);
        }
    }
}

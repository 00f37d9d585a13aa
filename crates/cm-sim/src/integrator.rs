//! Explicit Runge-Kutta steppers with local error estimates.

use cm_core::{ParamSet, Real};

use crate::error::SimResult;
use crate::model::{OdeModel, eval_rhs};

/// Result of one trial step: the candidate state and its local error estimate.
#[derive(Clone, Debug)]
pub struct StepEstimate {
    pub x: Vec<Real>,
    pub err: Vec<Real>,
}

/// Trait for time integrators.
pub trait Integrator {
    /// Order of the local error estimate; the step controller scales with
    /// `err^(-1 / (error_order + 1))`.
    fn error_order(&self) -> u32;

    /// Right-hand side evaluations spent per trial step.
    fn rhs_calls_per_step(&self) -> usize;

    /// Attempt one step of size `dt` from `(t, x)` without committing it.
    fn step<M: OdeModel + ?Sized>(
        &self,
        model: &M,
        params: &ParamSet,
        t: Real,
        x: &[Real],
        dt: Real,
    ) -> SimResult<StepEstimate>;
}

/// `x + dt * sum(c_i * k_i)`
fn combine(x: &[Real], dt: Real, terms: &[(Real, &[Real])]) -> Vec<Real> {
    let mut out = x.to_vec();
    for &(c, k) in terms {
        if c == 0.0 {
            continue;
        }
        for (o, ki) in out.iter_mut().zip(k) {
            *o += dt * c * ki;
        }
    }
    out
}

/// Dormand-Prince 5(4) embedded pair. Advances with the 5th-order solution.
#[derive(Clone, Debug, Default)]
pub struct DormandPrince45;

impl DormandPrince45 {
    const C2: Real = 1.0 / 5.0;
    const C3: Real = 3.0 / 10.0;
    const C4: Real = 4.0 / 5.0;
    const C5: Real = 8.0 / 9.0;

    const A21: Real = 1.0 / 5.0;
    const A31: Real = 3.0 / 40.0;
    const A32: Real = 9.0 / 40.0;
    const A41: Real = 44.0 / 45.0;
    const A42: Real = -56.0 / 15.0;
    const A43: Real = 32.0 / 9.0;
    const A51: Real = 19372.0 / 6561.0;
    const A52: Real = -25360.0 / 2187.0;
    const A53: Real = 64448.0 / 6561.0;
    const A54: Real = -212.0 / 729.0;
    const A61: Real = 9017.0 / 3168.0;
    const A62: Real = -355.0 / 33.0;
    const A63: Real = 46732.0 / 5247.0;
    const A64: Real = 49.0 / 176.0;
    const A65: Real = -5103.0 / 18656.0;

    // 5th-order weights
    const B1: Real = 35.0 / 384.0;
    const B3: Real = 500.0 / 1113.0;
    const B4: Real = 125.0 / 192.0;
    const B5: Real = -2187.0 / 6784.0;
    const B6: Real = 11.0 / 84.0;

    // 4th-order weights
    const BS1: Real = 5179.0 / 57600.0;
    const BS3: Real = 7571.0 / 16695.0;
    const BS4: Real = 393.0 / 640.0;
    const BS5: Real = -92097.0 / 339200.0;
    const BS6: Real = 187.0 / 2100.0;
    const BS7: Real = 1.0 / 40.0;
}

impl Integrator for DormandPrince45 {
    fn error_order(&self) -> u32 {
        4
    }

    fn rhs_calls_per_step(&self) -> usize {
        7
    }

    fn step<M: OdeModel + ?Sized>(
        &self,
        model: &M,
        params: &ParamSet,
        t: Real,
        x: &[Real],
        dt: Real,
    ) -> SimResult<StepEstimate> {
        let k1 = eval_rhs(model, t, x, params)?;

        let x2 = combine(x, dt, &[(Self::A21, &k1[..])]);
        let k2 = eval_rhs(model, t + Self::C2 * dt, &x2, params)?;

        let x3 = combine(x, dt, &[(Self::A31, &k1[..]), (Self::A32, &k2[..])]);
        let k3 = eval_rhs(model, t + Self::C3 * dt, &x3, params)?;

        let x4 = combine(
            x,
            dt,
            &[(Self::A41, &k1[..]), (Self::A42, &k2[..]), (Self::A43, &k3[..])],
        );
        let k4 = eval_rhs(model, t + Self::C4 * dt, &x4, params)?;

        let x5 = combine(
            x,
            dt,
            &[
                (Self::A51, &k1[..]),
                (Self::A52, &k2[..]),
                (Self::A53, &k3[..]),
                (Self::A54, &k4[..]),
            ],
        );
        let k5 = eval_rhs(model, t + Self::C5 * dt, &x5, params)?;

        let x6 = combine(
            x,
            dt,
            &[
                (Self::A61, &k1[..]),
                (Self::A62, &k2[..]),
                (Self::A63, &k3[..]),
                (Self::A64, &k4[..]),
                (Self::A65, &k5[..]),
            ],
        );
        let k6 = eval_rhs(model, t + dt, &x6, params)?;

        let x_new = combine(
            x,
            dt,
            &[
                (Self::B1, &k1[..]),
                (Self::B3, &k3[..]),
                (Self::B4, &k4[..]),
                (Self::B5, &k5[..]),
                (Self::B6, &k6[..]),
            ],
        );
        let k7 = eval_rhs(model, t + dt, &x_new, params)?;

        let e1 = Self::B1 - Self::BS1;
        let e3 = Self::B3 - Self::BS3;
        let e4 = Self::B4 - Self::BS4;
        let e5 = Self::B5 - Self::BS5;
        let e6 = Self::B6 - Self::BS6;
        let e7 = -Self::BS7;

        let err = (0..x.len())
            .map(|i| {
                dt * (e1 * k1[i] + e3 * k3[i] + e4 * k4[i] + e5 * k5[i] + e6 * k6[i] + e7 * k7[i])
            })
            .collect();

        Ok(StepEstimate { x: x_new, err })
    }
}

/// Classical RK4 with a step-doubling error estimate.
///
/// One full step and two half steps are taken; the half-step result is kept
/// and `(x_half - x_full) / 15` is the local error estimate.
#[derive(Clone, Debug, Default)]
pub struct Rk4;

impl Rk4 {
    fn single<M: OdeModel + ?Sized>(
        model: &M,
        params: &ParamSet,
        t: Real,
        x: &[Real],
        k1: &[Real],
        dt: Real,
    ) -> SimResult<Vec<Real>> {
        let x2 = combine(x, dt, &[(0.5, k1)]);
        let k2 = eval_rhs(model, t + 0.5 * dt, &x2, params)?;

        let x3 = combine(x, dt, &[(0.5, &k2[..])]);
        let k3 = eval_rhs(model, t + 0.5 * dt, &x3, params)?;

        let x4 = combine(x, dt, &[(1.0, &k3[..])]);
        let k4 = eval_rhs(model, t + dt, &x4, params)?;

        // x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        Ok(combine(
            x,
            dt / 6.0,
            &[(1.0, k1), (2.0, &k2[..]), (2.0, &k3[..]), (1.0, &k4[..])],
        ))
    }
}

impl Integrator for Rk4 {
    fn error_order(&self) -> u32 {
        4
    }

    fn rhs_calls_per_step(&self) -> usize {
        11
    }

    fn step<M: OdeModel + ?Sized>(
        &self,
        model: &M,
        params: &ParamSet,
        t: Real,
        x: &[Real],
        dt: Real,
    ) -> SimResult<StepEstimate> {
        let k1 = eval_rhs(model, t, x, params)?;
        let full = Self::single(model, params, t, x, &k1, dt)?;

        let half = 0.5 * dt;
        let mid = Self::single(model, params, t, x, &k1, half)?;
        let k_mid = eval_rhs(model, t + half, &mid, params)?;
        let x_new = Self::single(model, params, t + half, &mid, &k_mid, half)?;

        let err = x_new
            .iter()
            .zip(&full)
            .map(|(fine, coarse)| (fine - coarse) / 15.0)
            .collect();

        Ok(StepEstimate { x: x_new, err })
    }
}

//! Adaptive driver: integrates across a requested output grid.

use cm_core::{ParamSet, Real, TimeGrid, Tolerances, ensure_all_finite};
use tracing::{debug, trace, warn};

use crate::breakpoints::{Stop, build_schedule, landing_switch_times};
use crate::error::{SimError, SimResult};
use crate::integrator::{DormandPrince45, Integrator, Rk4};
use crate::model::{OdeModel, SegmentView, eval_rhs};
use crate::trajectory::{SimStats, Trajectory};

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// Dormand-Prince 5(4) embedded pair (default, 7 rhs calls per step).
    #[default]
    DormandPrince45,
    /// Classical RK4 with step doubling (11 rhs calls per step).
    Rk4,
}

/// Options for integration runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Local error target
    pub tolerances: Tolerances,
    /// Stepper (default: Dormand-Prince 5(4))
    pub integrator: IntegratorType,
    /// First trial step; estimated from the rhs when `None`
    pub initial_dt: Option<Real>,
    /// Smallest step allowed before declaring divergence
    pub min_dt: Real,
    /// Largest step allowed
    pub max_dt: Option<Real>,
    /// Maximum number of trial steps over the whole run (safety limit)
    pub max_steps: usize,
    /// Multiplier applied to the optimal step estimate
    pub safety_factor: Real,
    /// Lower bound on the per-step size ratio
    pub cutback_factor: Real,
    /// Upper bound on the per-step size ratio
    pub grow_factor: Real,
    /// Extra mandatory breakpoints on top of the model's switch times
    pub breakpoints: Vec<Real>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::integration(),
            integrator: IntegratorType::default(),
            initial_dt: None,
            min_dt: 1e-12,
            max_dt: None,
            max_steps: 100_000,
            safety_factor: 0.9,
            cutback_factor: 0.2,
            grow_factor: 5.0,
            breakpoints: Vec::new(),
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        self.tolerances.validate()?;
        if let Some(dt) = self.initial_dt {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(SimError::invalid("initial_dt must be finite and positive"));
            }
        }
        if !self.min_dt.is_finite() || self.min_dt <= 0.0 {
            return Err(SimError::invalid("min_dt must be finite and positive"));
        }
        if let Some(max_dt) = self.max_dt {
            if !(max_dt > self.min_dt) {
                return Err(SimError::invalid("max_dt must be greater than min_dt"));
            }
        }
        if self.max_steps == 0 {
            return Err(SimError::invalid("max_steps must be positive"));
        }
        if !(self.safety_factor > 0.0 && self.safety_factor <= 1.0) {
            return Err(SimError::invalid("safety_factor must be in (0, 1]"));
        }
        if !(self.cutback_factor > 0.0 && self.cutback_factor < 1.0) {
            return Err(SimError::invalid("cutback_factor must be in (0, 1)"));
        }
        if !(self.grow_factor > 1.0 && self.grow_factor.is_finite()) {
            return Err(SimError::invalid("grow_factor must be finite and > 1"));
        }
        Ok(())
    }
}

/// Integrate with default options.
pub fn integrate<M: OdeModel + ?Sized>(
    model: &M,
    initial_state: &[Real],
    times: &[Real],
    params: &ParamSet,
) -> SimResult<Trajectory> {
    integrate_with(model, initial_state, times, params, &SimOptions::default())
}

/// Integrate `model` from `initial_state` at `times[0]`, reporting the state
/// at every entry of `times`.
///
/// Switch times reported by the model (plus `opts.breakpoints`) that fall
/// after `times[0]` and no later than the last grid point become mandatory
/// landing points; no step ever straddles one, and a step ending on one is
/// evaluated with the pre-switch formula.
pub fn integrate_with<M: OdeModel + ?Sized>(
    model: &M,
    initial_state: &[Real],
    times: &[Real],
    params: &ParamSet,
    opts: &SimOptions,
) -> SimResult<Trajectory> {
    opts.validate()?;
    let grid = TimeGrid::new(times.to_vec())?;

    let dim = model.dimension();
    if initial_state.len() != dim {
        return Err(SimError::invalid(format!(
            "initial state has length {} but the model has {} state variables",
            initial_state.len(),
            dim
        )));
    }
    ensure_all_finite(initial_state, "initial state")?;

    let mut candidates = model.switch_times(params)?;
    candidates.extend_from_slice(&opts.breakpoints);
    let switches = landing_switch_times(&grid, &candidates)?;
    let schedule = build_schedule(&grid, &switches);

    match opts.integrator {
        IntegratorType::DormandPrince45 => drive(
            &DormandPrince45,
            model,
            initial_state,
            &grid,
            &schedule,
            params,
            opts,
        ),
        IntegratorType::Rk4 => drive(&Rk4, model, initial_state, &grid, &schedule, params, opts),
    }
}

/// Why a segment could not be completed.
enum Halt {
    Diverged { dt: Real, reason: String },
    Fatal(SimError),
}

impl From<SimError> for Halt {
    fn from(e: SimError) -> Self {
        Halt::Fatal(e)
    }
}

fn drive<I: Integrator, M: OdeModel + ?Sized>(
    integrator: &I,
    model: &M,
    initial_state: &[Real],
    grid: &TimeGrid,
    schedule: &[Stop],
    params: &ParamSet,
    opts: &SimOptions,
) -> SimResult<Trajectory> {
    let mut record = Trajectory::with_capacity(grid.len());
    record.push(grid.start(), initial_state.to_vec());

    let mut stats = SimStats::default();
    let mut t = grid.start();
    let mut x = initial_state.to_vec();
    let mut h: Option<Real> = opts.initial_dt;

    for stop in schedule {
        let view = SegmentView {
            inner: model,
            ceiling: stop.switch.then_some(stop.t),
        };

        let h_start = match h {
            Some(h) => h,
            None => {
                stats.rhs_evaluations += 2;
                initial_step(&view, params, t, &x, stop.t, integrator.error_order(), opts)?
            }
        };

        match advance(
            integrator,
            &view,
            params,
            opts,
            &mut t,
            &mut x,
            h_start,
            stop.t,
            &mut stats,
        ) {
            Ok(h_next) => h = Some(h_next),
            Err(Halt::Fatal(e)) => return Err(e),
            Err(Halt::Diverged { dt, reason }) => {
                warn!(
                    t,
                    dt,
                    reached = record.len(),
                    requested = grid.len(),
                    "integration diverged: {reason}"
                );
                record.stats = stats;
                return Err(SimError::IntegrationDivergence {
                    t,
                    dt,
                    reason,
                    partial: Box::new(record),
                });
            }
        }

        if stop.record {
            record.push(stop.t, x.clone());
        }
        if stop.switch && stop.t < grid.end() {
            stats.breakpoints_crossed += 1;
            debug!(t = stop.t, "crossed switch time; re-estimating step size");
            h = opts.initial_dt;
        }
    }

    debug!(
        accepted = stats.accepted_steps,
        rejected = stats.rejected_steps,
        rhs_evaluations = stats.rhs_evaluations,
        breakpoints = stats.breakpoints_crossed,
        "integration finished"
    );
    record.stats = stats;
    Ok(record)
}

/// RMS of the error scaled by `atol + rtol * max(|x|, |x_new|)`.
fn error_norm(err: &[Real], x: &[Real], x_new: &[Real], tol: Tolerances) -> Real {
    if err.is_empty() {
        return 0.0;
    }
    let sum: Real = err
        .iter()
        .zip(x.iter().zip(x_new))
        .map(|(e, (a, b))| {
            let sc = tol.abs + tol.rel * a.abs().max(b.abs());
            (e / sc) * (e / sc)
        })
        .sum();
    (sum / err.len() as Real).sqrt()
}

/// Starting step estimate from the local scale of the solution and its
/// derivative (Hairer, Norsett & Wanner, II.4).
fn initial_step<M: OdeModel + ?Sized>(
    model: &M,
    params: &ParamSet,
    t0: Real,
    x0: &[Real],
    t_end: Real,
    error_order: u32,
    opts: &SimOptions,
) -> SimResult<Real> {
    let tol = opts.tolerances;
    let span = t_end - t0;
    let scaled_norm = |v: &[Real]| -> Real {
        if v.is_empty() {
            return 0.0;
        }
        let sum: Real = v
            .iter()
            .zip(x0)
            .map(|(vi, xi)| {
                let sc = tol.abs + tol.rel * xi.abs();
                (vi / sc) * (vi / sc)
            })
            .sum();
        (sum / v.len() as Real).sqrt()
    };

    let f0 = eval_rhs(model, t0, x0, params)?;
    let d0 = scaled_norm(x0);
    let d1 = scaled_norm(&f0);
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    let h0 = h0.min(span);

    let x1: Vec<Real> = x0.iter().zip(&f0).map(|(x, f)| x + h0 * f).collect();
    let f1 = eval_rhs(model, t0 + h0, &x1, params)?;
    let diff: Vec<Real> = f1.iter().zip(&f0).map(|(a, b)| a - b).collect();
    let d2 = scaled_norm(&diff) / h0;

    let dmax = d1.max(d2);
    let h1 = if !dmax.is_finite() {
        h0
    } else if dmax <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / dmax).powf(1.0 / (error_order as Real + 1.0))
    };

    let mut h = (100.0 * h0).min(h1).min(span).max(opts.min_dt);
    if let Some(max_dt) = opts.max_dt {
        h = h.min(max_dt);
    }
    Ok(h)
}

/// Step from `*t` to exactly `t_end`, returning the suggested next step size.
#[allow(clippy::too_many_arguments)]
fn advance<I: Integrator, M: OdeModel + ?Sized>(
    integrator: &I,
    model: &M,
    params: &ParamSet,
    opts: &SimOptions,
    t: &mut Real,
    x: &mut Vec<Real>,
    h_start: Real,
    t_end: Real,
    stats: &mut SimStats,
) -> Result<Real, Halt> {
    let exponent = -1.0 / (integrator.error_order() as Real + 1.0);
    let mut h = h_start;

    while *t < t_end {
        if stats.accepted_steps + stats.rejected_steps >= opts.max_steps {
            return Err(Halt::Diverged {
                dt: h,
                reason: format!(
                    "max_steps={} exhausted before reaching t={t_end}",
                    opts.max_steps
                ),
            });
        }

        let remaining = t_end - *t;
        let min_dt = opts
            .min_dt
            .max(16.0 * Real::EPSILON * t.abs().max(t_end.abs()));
        let mut dt = h;
        if let Some(max_dt) = opts.max_dt {
            dt = dt.min(max_dt);
        }
        let landing = dt >= remaining;
        if landing {
            dt = remaining;
        } else if dt < min_dt {
            return Err(Halt::Diverged {
                dt,
                reason: format!("step size underflow before reaching t={t_end}"),
            });
        }

        let est = integrator.step(model, params, *t, x, dt)?;
        stats.rhs_evaluations += integrator.rhs_calls_per_step();

        let finite = est.x.iter().all(|v| v.is_finite());
        let err = if finite {
            error_norm(&est.err, x, &est.x, opts.tolerances)
        } else {
            Real::INFINITY
        };

        let factor = if !err.is_finite() {
            opts.cutback_factor
        } else if err == 0.0 {
            opts.grow_factor
        } else {
            (opts.safety_factor * err.powf(exponent)).clamp(opts.cutback_factor, opts.grow_factor)
        };

        if err <= 1.0 {
            *t = if landing { t_end } else { *t + dt };
            *x = est.x;
            stats.accepted_steps += 1;
            // a landing step was clipped, keep the proposal it replaced
            h = if landing { h.max(dt * factor) } else { dt * factor };
        } else {
            stats.rejected_steps += 1;
            h = dt * factor.min(1.0);
            trace!(t = *t, dt, err, "step rejected");
            if h < min_dt {
                return Err(Halt::Diverged {
                    dt: h,
                    reason: format!(
                        "step size underflow (err={err:e}) before reaching t={t_end}"
                    ),
                });
            }
        }
    }

    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClosureModel;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.tolerances.rel, 1e-6);
        assert_eq!(opts.tolerances.abs, 1e-8);
        assert_eq!(opts.max_steps, 100_000);
        assert_eq!(opts.integrator, IntegratorType::DormandPrince45);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn sim_options_invalid() {
        let opts = SimOptions {
            max_steps: 0,
            ..SimOptions::default()
        };
        assert!(matches!(opts.validate(), Err(SimError::InvalidInput { .. })));

        let opts = SimOptions {
            cutback_factor: 1.5,
            ..SimOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn error_norm_is_scaled_rms() {
        let tol = Tolerances { abs: 1.0, rel: 0.0 };
        let norm = error_norm(&[3.0, 4.0], &[0.0, 0.0], &[0.0, 0.0], tol);
        assert!((norm - (12.5_f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn decreasing_grid_is_invalid_input() {
        let model = ClosureModel::new(1, |_t, x: &[Real], _p: &ParamSet| vec![-x[0]]);
        let err = integrate(&model, &[1.0], &[5.0, 3.0], &ParamSet::new()).unwrap_err();
        assert!(matches!(err, SimError::InvalidInput { .. }));
    }

    #[test]
    fn wrong_initial_length_is_invalid_input() {
        let model = ClosureModel::new(2, |_t, x: &[Real], _p: &ParamSet| x.to_vec());
        let err = integrate(&model, &[1.0], &[0.0, 1.0], &ParamSet::new()).unwrap_err();
        assert!(matches!(err, SimError::InvalidInput { .. }));
    }

    #[test]
    fn max_steps_limit_is_divergence() {
        let model = ClosureModel::new(1, |_t, x: &[Real], _p: &ParamSet| vec![-x[0]]);
        let opts = SimOptions {
            max_steps: 2,
            initial_dt: Some(1e-3),
            ..SimOptions::default()
        };
        let err = integrate_with(&model, &[1.0], &[0.0, 10.0], &ParamSet::new(), &opts)
            .unwrap_err();
        let partial = err.partial_trajectory().expect("partial trajectory");
        assert_eq!(partial.len(), 1);
        assert_eq!(partial.t[0], 0.0);
    }
}

//! Two-phase SIUAR information-diffusion model.
//!
//! Compartments: `S` unexposed, `I` sharing a false item, `U` no longer
//! sharing it, `A` sharing a correcting item, `R` no longer sharing the
//! correction. Until `t_A` only the false item spreads (`S -> I -> U`);
//! from `t_A` on the correction competes for `S`, `I` and `U` and decays
//! into `R`.

use cm_core::{CoreResult, ParamSet, Real, TimeGrid};
use cm_sim::{OdeModel, SimError, SimResult};

use crate::catalog::BoundOde;
use crate::common::{finite, positive, rate};
use crate::error::ModelResult;

pub const STATE_NAMES: [&str; 5] = ["S", "I", "U", "A", "R"];

/// Which set of equations governs a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `t < t_A`: only `S -> I -> U`.
    Diffusion,
    /// `t >= t_A`: the correcting item spreads as well.
    Competition,
}

impl Phase {
    pub fn at(t: Real, t_a: Real) -> Self {
        if t < t_a {
            Phase::Diffusion
        } else {
            Phase::Competition
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiuarParams {
    pub n: Real,
    pub beta: Real,
    pub gamma: Real,
    pub t_a: Real,
}

impl SiuarParams {
    pub fn from_params(params: &ParamSet) -> CoreResult<Self> {
        Ok(Self {
            n: positive(params, "N")?,
            beta: rate(params, "beta")?,
            gamma: rate(params, "gamma")?,
            t_a: finite(params, "t_A")?,
        })
    }

    pub fn to_params(&self) -> ParamSet {
        ParamSet::new()
            .with("N", self.n)
            .with("beta", self.beta)
            .with("gamma", self.gamma)
            .with("t_A", self.t_a)
    }

    pub fn derivatives(&self, phase: Phase, x: [Real; 5]) -> [Real; 5] {
        let [s, i, u, a, _r] = x;
        let spread = self.beta * s * i / self.n;
        match phase {
            Phase::Diffusion => [-spread, spread - self.gamma * i, self.gamma * i, 0.0, 0.0],
            Phase::Competition => {
                let k = self.beta / self.n;
                [
                    -spread - k * s * a,
                    spread - self.gamma * i - k * i * a,
                    self.gamma * i - k * u * a,
                    k * (s * a + i * a + u * a) - self.gamma * a,
                    self.gamma * a,
                ]
            }
        }
    }
}

/// Resolved parameters integrate directly and report `t_A` as their switch
/// time.
impl OdeModel for SiuarParams {
    fn dimension(&self) -> usize {
        STATE_NAMES.len()
    }

    fn rhs(&self, t: Real, x: &[Real], _params: &ParamSet) -> SimResult<Vec<Real>> {
        let state: [Real; 5] = x
            .try_into()
            .map_err(|_| SimError::invalid("SIUAR state must have 5 components"))?;
        Ok(self.derivatives(Phase::at(t, self.t_a), state).to_vec())
    }

    fn switch_times(&self, _params: &ParamSet) -> SimResult<Vec<Real>> {
        Ok(vec![self.t_a])
    }
}

/// SIUAR reading its parameters from the `ParamSet` on every evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Siuar;

impl OdeModel for Siuar {
    fn dimension(&self) -> usize {
        STATE_NAMES.len()
    }

    fn rhs(&self, t: Real, x: &[Real], params: &ParamSet) -> SimResult<Vec<Real>> {
        SiuarParams::from_params(params)?.rhs(t, x, params)
    }

    fn switch_times(&self, params: &ParamSet) -> SimResult<Vec<Real>> {
        Ok(vec![finite(params, "t_A")?])
    }
}

pub fn bind(params: &ParamSet) -> ModelResult<BoundOde> {
    Ok(Box::new(SiuarParams::from_params(params)?))
}

pub fn default_params() -> ParamSet {
    SiuarParams {
        n: 1000.0,
        beta: 2.5,
        gamma: 0.5,
        t_a: 7.0,
    }
    .to_params()
}

/// One false-item spreader and one correction spreader; everybody else
/// unexposed, so the compartments sum to `N`.
pub fn default_initial_state(params: &ParamSet) -> ModelResult<Vec<Real>> {
    let n = positive(params, "N")?;
    Ok(vec![n - 2.0, 1.0, 0.0, 1.0, 0.0])
}

/// Three weeks.
pub fn default_time_grid() -> CoreResult<TimeGrid> {
    TimeGrid::linspace(0.0, 21.0, 21)
}

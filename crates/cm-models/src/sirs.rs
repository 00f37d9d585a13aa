//! SIRS model: SIR with waning immunity.
//!
//! Recovered individuals return to the susceptible pool at rate `xi`.

use cm_core::{CoreResult, ParamSet, Real, TimeGrid};
use cm_sim::{OdeModel, SimError, SimResult};

use crate::catalog::BoundOde;
use crate::common::{positive, rate};
use crate::error::ModelResult;

pub const STATE_NAMES: [&str; 3] = ["S", "I", "R"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SirsParams {
    pub n: Real,
    pub beta: Real,
    pub gamma: Real,
    pub xi: Real,
}

impl SirsParams {
    pub fn from_params(params: &ParamSet) -> CoreResult<Self> {
        Ok(Self {
            n: positive(params, "N")?,
            beta: rate(params, "beta")?,
            gamma: rate(params, "gamma")?,
            xi: rate(params, "xi")?,
        })
    }

    pub fn to_params(&self) -> ParamSet {
        ParamSet::new()
            .with("N", self.n)
            .with("beta", self.beta)
            .with("gamma", self.gamma)
            .with("xi", self.xi)
    }

    pub fn derivatives(&self, [s, i, r]: [Real; 3]) -> [Real; 3] {
        let infection = self.beta * s * i / self.n;
        let recovery = self.gamma * i;
        let waning = self.xi * r;
        [-infection + waning, infection - recovery, recovery - waning]
    }
}

impl OdeModel for SirsParams {
    fn dimension(&self) -> usize {
        STATE_NAMES.len()
    }

    fn rhs(&self, _t: Real, x: &[Real], _params: &ParamSet) -> SimResult<Vec<Real>> {
        let state: [Real; 3] = x
            .try_into()
            .map_err(|_| SimError::invalid("SIRS state must have 3 components"))?;
        Ok(self.derivatives(state).to_vec())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sirs;

impl OdeModel for Sirs {
    fn dimension(&self) -> usize {
        STATE_NAMES.len()
    }

    fn rhs(&self, t: Real, x: &[Real], params: &ParamSet) -> SimResult<Vec<Real>> {
        SirsParams::from_params(params)?.rhs(t, x, params)
    }
}

pub fn bind(params: &ParamSet) -> ModelResult<BoundOde> {
    Ok(Box::new(SirsParams::from_params(params)?))
}

/// Early-pandemic rates with immunity lasting roughly 125 days.
pub fn default_params() -> ParamSet {
    SirsParams {
        n: 1000.0,
        beta: 0.25,
        gamma: 0.1,
        xi: 0.008,
    }
    .to_params()
}

pub fn default_initial_state(params: &ParamSet) -> ModelResult<Vec<Real>> {
    let n = positive(params, "N")?;
    Ok(vec![n - 1.0, 1.0, 0.0])
}

pub fn default_time_grid() -> CoreResult<TimeGrid> {
    TimeGrid::linspace(0.0, 250.0, 250)
}

//! SIR epidemic / information-diffusion model.
//!
//! ```text
//! dS = -beta S I / N
//! dI =  beta S I / N - gamma I
//! dR =  gamma I
//! ```
//!
//! `S + I + R` is conserved. The same equations back two catalog entries:
//! the epidemic scenario (`sir`) and the social-network information
//! spreading scenario (`sir_sns`).

use cm_core::{CoreResult, ParamSet, Real, TimeGrid};
use cm_sim::{OdeModel, SimError, SimResult};

use crate::catalog::BoundOde;
use crate::common::{positive, rate};
use crate::error::ModelResult;

pub const STATE_NAMES: [&str; 3] = ["S", "I", "R"];

/// Typed view of the SIR parameter set (`N`, `beta`, `gamma`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SirParams {
    pub n: Real,
    pub beta: Real,
    pub gamma: Real,
}

impl SirParams {
    pub fn from_params(params: &ParamSet) -> CoreResult<Self> {
        Ok(Self {
            n: positive(params, "N")?,
            beta: rate(params, "beta")?,
            gamma: rate(params, "gamma")?,
        })
    }

    pub fn to_params(&self) -> ParamSet {
        ParamSet::new()
            .with("N", self.n)
            .with("beta", self.beta)
            .with("gamma", self.gamma)
    }

    /// Force of infection per susceptible-infected contact.
    pub fn incidence(&self, s: Real, i: Real) -> Real {
        self.beta * s * i / self.n
    }

    /// Basic reproduction number `beta / gamma` (infinite for gamma = 0).
    pub fn r0(&self) -> Real {
        self.beta / self.gamma
    }

    pub fn derivatives(&self, [s, i, _r]: [Real; 3]) -> [Real; 3] {
        let infection = self.incidence(s, i);
        let recovery = self.gamma * i;
        [-infection, infection - recovery, recovery]
    }
}

/// Resolved parameters integrate directly; the `ParamSet` passed to `rhs`
/// is not consulted again.
impl OdeModel for SirParams {
    fn dimension(&self) -> usize {
        STATE_NAMES.len()
    }

    fn rhs(&self, _t: Real, x: &[Real], _params: &ParamSet) -> SimResult<Vec<Real>> {
        let state: [Real; 3] = x
            .try_into()
            .map_err(|_| SimError::invalid("SIR state must have 3 components"))?;
        Ok(self.derivatives(state).to_vec())
    }
}

/// SIR reading its parameters from the `ParamSet` on every evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sir;

impl OdeModel for Sir {
    fn dimension(&self) -> usize {
        STATE_NAMES.len()
    }

    fn rhs(&self, t: Real, x: &[Real], params: &ParamSet) -> SimResult<Vec<Real>> {
        SirParams::from_params(params)?.rhs(t, x, params)
    }
}

pub fn bind(params: &ParamSet) -> ModelResult<BoundOde> {
    Ok(Box::new(SirParams::from_params(params)?))
}

pub fn default_params() -> ParamSet {
    SirParams {
        n: 1000.0,
        beta: 1.8,
        gamma: 0.2,
    }
    .to_params()
}

pub fn sns_default_params() -> ParamSet {
    SirParams {
        n: 1000.0,
        beta: 2.5,
        gamma: 0.5,
    }
    .to_params()
}

/// One initial spreader, nobody removed: `[N - 1, 1, 0]`.
pub fn default_initial_state(params: &ParamSet) -> ModelResult<Vec<Real>> {
    let n = positive(params, "N")?;
    Ok(vec![n - 1.0, 1.0, 0.0])
}

/// 160 days.
pub fn default_time_grid() -> CoreResult<TimeGrid> {
    TimeGrid::linspace(0.0, 160.0, 160)
}

/// Two weeks.
pub fn sns_default_time_grid() -> CoreResult<TimeGrid> {
    TimeGrid::linspace(0.0, 14.0, 14)
}

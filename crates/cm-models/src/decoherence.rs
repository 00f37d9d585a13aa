//! Two-level decoherence evaluated in closed form.
//!
//! A qubit prepared in `cos(theta)|0> + sin(theta)|1>` loses coherence at
//! rate `Gamma`: the populations stay put while the off-diagonal element of
//! the density matrix decays as `rho01(t) = cos(theta) sin(theta) e^(-Gamma t)`.

use std::f64::consts::FRAC_PI_4;

use cm_core::{CoreResult, ParamSet, Real, TimeGrid};
use nalgebra::Matrix2;

use crate::common::{finite, rate};
use crate::error::ModelResult;

pub const STATE_NAMES: [&str; 3] = ["eig1", "eig2", "entropy"];
pub const COHERENCE_STATE_NAMES: [&str; 1] = ["rho01"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecoherenceParams {
    /// Mixing angle of the initial pure state.
    pub theta: Real,
    /// Dephasing rate.
    pub gamma: Real,
}

impl DecoherenceParams {
    pub fn from_params(params: &ParamSet) -> CoreResult<Self> {
        Ok(Self {
            theta: finite(params, "theta")?,
            gamma: rate(params, "Gamma")?,
        })
    }

    pub fn to_params(&self) -> ParamSet {
        ParamSet::new()
            .with("theta", self.theta)
            .with("Gamma", self.gamma)
    }

    pub fn coherence(&self, t: Real) -> Real {
        self.theta.cos() * self.theta.sin() * (-self.gamma * t).exp()
    }

    pub fn density_matrix(&self, t: Real) -> Matrix2<Real> {
        let c = self.theta.cos();
        let s = self.theta.sin();
        let off = self.coherence(t);
        Matrix2::new(c * c, off, off, s * s)
    }

    /// Eigenvalues of the density matrix at `t`, ascending.
    pub fn eigenvalues(&self, t: Real) -> [Real; 2] {
        let eig = self.density_matrix(t).symmetric_eigenvalues();
        let (a, b) = (eig[0], eig[1]);
        if a <= b { [a, b] } else { [b, a] }
    }
}

/// `-sum(lambda log2 lambda)`, skipping non-positive eigenvalues.
pub fn von_neumann_entropy(eigenvalues: &[Real]) -> Real {
    let s: Real = eigenvalues
        .iter()
        .filter(|&&l| l > 0.0)
        .map(|&l| -l * l.log2())
        .sum();
    // round-off can leave a pure state at -0.0 or a hair below
    s.max(0.0)
}

/// Rows of `[eig1, eig2, entropy]`, one per grid point.
pub fn evaluate(grid: &TimeGrid, params: &ParamSet) -> ModelResult<Vec<Vec<Real>>> {
    let p = DecoherenceParams::from_params(params)?;
    Ok(grid
        .iter()
        .map(|t| {
            let [l1, l2] = p.eigenvalues(t);
            vec![l1, l2, von_neumann_entropy(&[l1, l2])]
        })
        .collect())
}

/// Rows of `[rho01]`, one per grid point.
pub fn evaluate_coherence(grid: &TimeGrid, params: &ParamSet) -> ModelResult<Vec<Vec<Real>>> {
    let p = DecoherenceParams::from_params(params)?;
    Ok(grid.iter().map(|t| vec![p.coherence(t)]).collect())
}

pub fn default_params() -> ParamSet {
    DecoherenceParams {
        theta: FRAC_PI_4,
        gamma: 1.0,
    }
    .to_params()
}

pub fn default_initial_state(params: &ParamSet) -> ModelResult<Vec<Real>> {
    let p = DecoherenceParams::from_params(params)?;
    let [l1, l2] = p.eigenvalues(0.0);
    Ok(vec![l1, l2, von_neumann_entropy(&[l1, l2])])
}

pub fn default_coherence_initial_state(params: &ParamSet) -> ModelResult<Vec<Real>> {
    let p = DecoherenceParams::from_params(params)?;
    Ok(vec![p.coherence(0.0)])
}

pub fn default_time_grid() -> CoreResult<TimeGrid> {
    TimeGrid::linspace(0.0, 5.0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> DecoherenceParams {
        DecoherenceParams::from_params(&default_params()).unwrap()
    }

    #[test]
    fn coherence_decays_exponentially() {
        let p = defaults();
        assert!((p.coherence(0.0) - 0.5).abs() < 1e-12);
        assert!((p.coherence(1.0) - 0.5 * (-1.0_f64).exp()).abs() < 1e-12);
        assert!((p.coherence(1.0) - 0.1839).abs() < 1e-4);
    }

    #[test]
    fn pure_state_has_zero_entropy() {
        let p = defaults();
        let [l1, l2] = p.eigenvalues(0.0);
        assert!(l1.abs() < 1e-9);
        assert!((l2 - 1.0).abs() < 1e-9);
        assert!(von_neumann_entropy(&[l1, l2]) < 1e-9);
    }

    #[test]
    fn fully_decohered_equal_mixture_approaches_one_bit() {
        let p = defaults();
        let [l1, l2] = p.eigenvalues(50.0);
        assert!((von_neumann_entropy(&[l1, l2]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn eigenvalues_sum_to_unit_trace() {
        let grid = default_time_grid().unwrap();
        for row in evaluate(&grid, &default_params()).unwrap() {
            assert!((row[0] + row[1] - 1.0).abs() < 1e-12);
            assert!(row[0] <= row[1]);
        }
    }

    #[test]
    fn entropy_grows_monotonically() {
        let grid = default_time_grid().unwrap();
        let rows = evaluate(&grid, &default_params()).unwrap();
        for pair in rows.windows(2) {
            assert!(pair[1][2] >= pair[0][2] - 1e-12);
        }
    }
}

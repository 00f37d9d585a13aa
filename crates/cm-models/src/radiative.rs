//! Steady-state air temperature above a heated surface.
//!
//! Two exponentially attenuated sources feed the air column at height `h`:
//! long-wave emission of the surface (`eps sigma Ts^4`, attenuation `k`) and
//! absorbed short-wave irradiance (`alpha S`, attenuation `k'`). Evaluated
//! for an artificial turf and a sand surface side by side.

use cm_core::{CoreResult, ParamSet, Real, TimeGrid};

use crate::common::{finite, positive, rate};
use crate::error::ModelResult;

/// W m^-2 K^-4
pub const STEFAN_BOLTZMANN: Real = 5.670374419e-8;

const CELSIUS_TO_KELVIN: Real = 273.15;

pub const STATE_NAMES: [&str; 2] = ["turf", "sand"];

/// One surface's contribution to the column, temperatures in Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceProfile {
    pub emissivity: Real,
    pub absorptivity: Real,
    pub irradiance: Real,
    pub air_density: Real,
    pub heat_capacity: Real,
    pub longwave_attenuation: Real,
    pub shortwave_attenuation: Real,
    pub ambient: Real,
    pub surface_temperature: Real,
}

impl SurfaceProfile {
    pub fn temperature_at(&self, h: Real) -> Real {
        let ts = self.surface_temperature + CELSIUS_TO_KELVIN;
        let rho_cp = self.air_density * self.heat_capacity;
        let longwave = self.emissivity * STEFAN_BOLTZMANN * ts.powi(4)
            / (rho_cp * self.longwave_attenuation)
            * (-self.longwave_attenuation * h).exp();
        let shortwave = self.absorptivity * self.irradiance
            / (rho_cp * self.shortwave_attenuation)
            * (-self.shortwave_attenuation * h).exp();
        self.ambient + longwave + shortwave
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiativeParams {
    pub turf: SurfaceProfile,
    pub sand: SurfaceProfile,
}

impl RadiativeParams {
    pub fn from_params(params: &ParamSet) -> CoreResult<Self> {
        let surface = |alpha: &str, ts: &str| -> CoreResult<SurfaceProfile> {
            Ok(SurfaceProfile {
                emissivity: rate(params, "epsilon")?,
                absorptivity: rate(params, alpha)?,
                irradiance: rate(params, "S")?,
                air_density: positive(params, "rho")?,
                heat_capacity: positive(params, "cp")?,
                longwave_attenuation: positive(params, "k")?,
                shortwave_attenuation: positive(params, "k_prime")?,
                ambient: finite(params, "T_inf")?,
                surface_temperature: finite(params, ts)?,
            })
        };
        Ok(Self {
            turf: surface("alpha_turf", "Ts_turf")?,
            sand: surface("alpha_sand", "Ts_sand")?,
        })
    }
}

/// Rows of `[turf, sand]`, one per height.
pub fn evaluate(heights: &TimeGrid, params: &ParamSet) -> ModelResult<Vec<Vec<Real>>> {
    let p = RadiativeParams::from_params(params)?;
    Ok(heights
        .iter()
        .map(|h| vec![p.turf.temperature_at(h), p.sand.temperature_at(h)])
        .collect())
}

pub fn default_params() -> ParamSet {
    ParamSet::new()
        .with("epsilon", 0.95)
        .with("alpha_turf", 0.25)
        .with("alpha_sand", 0.4)
        .with("S", 1000.0)
        .with("rho", 1.2)
        .with("cp", 1005.0)
        .with("k", 0.2)
        .with("k_prime", 0.05)
        .with("T_inf", 36.0)
        .with("Ts_turf", 70.19)
        .with("Ts_sand", 52.11)
}

pub fn default_initial_state(params: &ParamSet) -> ModelResult<Vec<Real>> {
    let p = RadiativeParams::from_params(params)?;
    Ok(vec![p.turf.temperature_at(0.0), p.sand.temperature_at(0.0)])
}

/// 0 to 5 m every half metre.
pub fn default_time_grid() -> CoreResult<TimeGrid> {
    TimeGrid::arange(0.0, 5.01, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_values_match_hand_calculation() {
        let p = RadiativeParams::from_params(&default_params()).unwrap();
        let turf = p.turf.temperature_at(0.0);
        let sand = p.sand.temperature_at(0.0);
        assert!((turf - 43.25).abs() < 0.01, "turf={turf}");
        assert!((sand - 45.13).abs() < 0.01, "sand={sand}");
    }

    #[test]
    fn profile_relaxes_towards_ambient() {
        let grid = default_time_grid().unwrap();
        assert_eq!(grid.len(), 11);
        let rows = evaluate(&grid, &default_params()).unwrap();
        for pair in rows.windows(2) {
            assert!(pair[1][0] < pair[0][0]);
            assert!(pair[1][1] < pair[0][1]);
        }
        assert!(rows.iter().flatten().all(|&t| t > 36.0));
    }

    #[test]
    fn missing_key_is_reported() {
        let mut params = ParamSet::new();
        for (k, v) in default_params().iter().filter(|(k, _)| *k != "k_prime") {
            params.insert(k, v);
        }
        assert!(evaluate(&default_time_grid().unwrap(), &params).is_err());
    }
}

//! Parallel parameter sweeps.
//!
//! One base configuration is re-run for every value of a single parameter.
//! Points are independent, so they are spread over the rayon pool; each
//! point keeps its own outcome and a failing point does not abort the rest.

use cm_core::Real;
use cm_models::{ModelCatalog, ModelRun};
use rayon::prelude::*;
use tracing::info;

use crate::config::RunConfig;
use crate::error::{AppError, AppResult};
use crate::run_service::execute;

#[derive(Debug, Clone)]
pub struct SweepRequest {
    pub base: RunConfig,
    /// Parameter key to vary; must be one of the model's parameters.
    pub parameter: String,
    pub values: Vec<Real>,
}

#[derive(Debug)]
pub struct SweepPoint {
    pub value: Real,
    pub outcome: AppResult<ModelRun>,
}

#[derive(Debug)]
pub struct SweepResult {
    pub model: String,
    pub parameter: String,
    /// In the order of `SweepRequest::values`.
    pub points: Vec<SweepPoint>,
    pub num_successful: usize,
    pub num_failed: usize,
}

impl SweepResult {
    /// Parameter values whose run succeeded.
    pub fn successful_values(&self) -> Vec<Real> {
        self.points
            .iter()
            .filter(|p| p.outcome.is_ok())
            .map(|p| p.value)
            .collect()
    }

    pub fn runs(&self) -> impl Iterator<Item = (Real, &ModelRun)> {
        self.points
            .iter()
            .filter_map(|p| p.outcome.as_ref().ok().map(|run| (p.value, run)))
    }

    /// `(parameter value, reduced series)` for every successful point, e.g.
    /// the peak of `I` against `beta`.
    pub fn reduce(&self, state: &str, f: impl Fn(&[Real]) -> Real) -> Vec<(Real, Real)> {
        self.runs()
            .filter_map(|(value, run)| run.series(state).map(|s| (value, f(&s))))
            .collect()
    }
}

pub fn run_sweep(catalog: &ModelCatalog, request: &SweepRequest) -> AppResult<SweepResult> {
    if request.values.is_empty() {
        return Err(AppError::InvalidInput("sweep has no values".into()));
    }
    if let Some(v) = request.values.iter().find(|v| !v.is_finite()) {
        return Err(AppError::InvalidInput(format!(
            "sweep value for {} is not finite: {v}",
            request.parameter
        )));
    }
    let entry = catalog.get(&request.base.model)?;
    if !(entry.default_params)().contains(&request.parameter) {
        return Err(AppError::InvalidInput(format!(
            "model '{}' has no parameter '{}'",
            entry.name, request.parameter
        )));
    }

    info!(
        model = entry.name,
        parameter = %request.parameter,
        points = request.values.len(),
        "starting sweep"
    );

    let points: Vec<SweepPoint> = request
        .values
        .par_iter()
        .map(|&value| {
            let mut config = request.base.clone();
            config.params.insert(request.parameter.as_str(), value);
            SweepPoint {
                value,
                outcome: execute(catalog, &config),
            }
        })
        .collect();

    let num_successful = points.iter().filter(|p| p.outcome.is_ok()).count();
    let num_failed = points.len() - num_successful;
    info!(model = entry.name, num_successful, num_failed, "sweep finished");

    Ok(SweepResult {
        model: entry.name.to_string(),
        parameter: request.parameter.clone(),
        points,
        num_successful,
        num_failed,
    })
}

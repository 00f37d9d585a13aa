//! Presentation hand-off: a run flattened into named columns.

use cm_core::{ParamSet, Real};
use cm_models::ModelRun;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<Real>,
}

/// Everything a plotting layer needs: labels, the time column, one line per
/// compartment and the vertical phase-switch markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSeries {
    pub model: String,
    pub display_name: String,
    pub params: ParamSet,
    pub time: Vec<Real>,
    pub series: Vec<NamedSeries>,
    pub markers: Vec<Real>,
}

impl From<&ModelRun> for RunSeries {
    fn from(run: &ModelRun) -> Self {
        let series = run
            .state_names
            .iter()
            .enumerate()
            .map(|(i, name)| NamedSeries {
                name: (*name).to_string(),
                values: run.trajectory.series(i).unwrap_or_default(),
            })
            .collect();
        Self {
            model: run.model.to_string(),
            display_name: run.display_name.to_string(),
            params: run.params.clone(),
            time: run.trajectory.t.clone(),
            series,
            markers: run.markers.clone(),
        }
    }
}

impl RunSeries {
    pub fn get(&self, name: &str) -> Option<&[Real]> {
        self.series
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.values.as_slice())
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

//! Config-driven run execution.

use std::path::Path;
use std::time::Instant;

use cm_models::{ModelCatalog, ModelRun};
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::AppResult;

/// Resolve `config.model` in `catalog` and run it with the configured
/// overrides and solver options.
pub fn execute(catalog: &ModelCatalog, config: &RunConfig) -> AppResult<ModelRun> {
    let entry = catalog.get(&config.model)?;
    let overrides = config.overrides()?;
    let opts = config.solver.to_options();

    let start = Instant::now();
    let result = entry.run(&overrides, &opts);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    match &result {
        Ok(run) => info!(
            model = entry.name,
            points = run.trajectory.len(),
            rhs_evaluations = run.trajectory.stats.rhs_evaluations,
            elapsed_ms,
            "run finished"
        ),
        Err(e) => warn!(model = entry.name, error = %e, elapsed_ms, "run failed"),
    }
    Ok(result?)
}

/// Load a YAML or JSON config from disk and execute it.
pub fn execute_file(catalog: &ModelCatalog, path: &Path) -> AppResult<ModelRun> {
    let config = RunConfig::load(path)?;
    execute(catalog, &config)
}

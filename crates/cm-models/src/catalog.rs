use std::collections::BTreeMap;

use cm_core::{CoreResult, ParamSet, Real, TimeGrid};
use cm_sim::OdeModel;

use crate::error::{ModelError, ModelResult};
use crate::{decoherence, radiative, sir, sirs, siuar};

/// Direct evaluator for models with a closed-form solution: one row per grid
/// point, one column per state name.
pub type ClosedFormFn = fn(&TimeGrid, &ParamSet) -> ModelResult<Vec<Vec<Real>>>;

/// An ODE model with its parameters already resolved.
pub type BoundOde = Box<dyn OdeModel + Send + Sync>;

/// Resolves and validates a parameter set once, before integration.
pub type OdeBinder = fn(&ParamSet) -> ModelResult<BoundOde>;

/// How a catalog entry produces its trajectory.
#[derive(Debug, Clone, Copy)]
pub enum Dynamics {
    /// Integrated by `cm_sim`.
    Ode(OdeBinder),
    ClosedForm(ClosedFormFn),
}

#[derive(Debug, Clone, Copy)]
pub struct ModelEntry {
    pub name: &'static str,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
    pub state_names: &'static [&'static str],
    pub dynamics: Dynamics,
    pub default_params: fn() -> ParamSet,
    pub default_initial_state: fn(&ParamSet) -> ModelResult<Vec<Real>>,
    pub default_time_grid: fn() -> CoreResult<TimeGrid>,
}

impl ModelEntry {
    /// Case-insensitive match on the name or any alias.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.name.eq_ignore_ascii_case(query)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(query))
    }

    /// Phase-switch times the model declares for `params` (empty for
    /// closed-form models and single-phase ODEs).
    pub fn switch_times(&self, params: &ParamSet) -> ModelResult<Vec<Real>> {
        match self.dynamics {
            Dynamics::Ode(bind) => Ok(bind(params)?.switch_times(params)?),
            Dynamics::ClosedForm(_) => Ok(Vec::new()),
        }
    }
}

const BUILTIN_MODELS: [ModelEntry; 7] = [
    ModelEntry {
        name: "sir",
        display_name: "SIR epidemic",
        aliases: &["sir_epidemic"],
        state_names: &sir::STATE_NAMES,
        dynamics: Dynamics::Ode(sir::bind),
        default_params: sir::default_params,
        default_initial_state: sir::default_initial_state,
        default_time_grid: sir::default_time_grid,
    },
    ModelEntry {
        name: "sir_sns",
        display_name: "SIR information diffusion on a social network",
        aliases: &["sns", "sir-sns"],
        state_names: &sir::STATE_NAMES,
        dynamics: Dynamics::Ode(sir::bind),
        default_params: sir::sns_default_params,
        default_initial_state: sir::default_initial_state,
        default_time_grid: sir::sns_default_time_grid,
    },
    ModelEntry {
        name: "sirs",
        display_name: "SIRS with waning immunity",
        aliases: &[],
        state_names: &sirs::STATE_NAMES,
        dynamics: Dynamics::Ode(sirs::bind),
        default_params: sirs::default_params,
        default_initial_state: sirs::default_initial_state,
        default_time_grid: sirs::default_time_grid,
    },
    ModelEntry {
        name: "siuar",
        display_name: "Two-phase SIUAR misinformation and correction",
        aliases: &["misinformation"],
        state_names: &siuar::STATE_NAMES,
        dynamics: Dynamics::Ode(siuar::bind),
        default_params: siuar::default_params,
        default_initial_state: siuar::default_initial_state,
        default_time_grid: siuar::default_time_grid,
    },
    ModelEntry {
        name: "decoherence",
        display_name: "Two-level decoherence entropy",
        aliases: &["entropy", "von_neumann"],
        state_names: &decoherence::STATE_NAMES,
        dynamics: Dynamics::ClosedForm(decoherence::evaluate),
        default_params: decoherence::default_params,
        default_initial_state: decoherence::default_initial_state,
        default_time_grid: decoherence::default_time_grid,
    },
    ModelEntry {
        name: "coherence",
        display_name: "Off-diagonal coherence decay",
        aliases: &["rho01"],
        state_names: &decoherence::COHERENCE_STATE_NAMES,
        dynamics: Dynamics::ClosedForm(decoherence::evaluate_coherence),
        default_params: decoherence::default_params,
        default_initial_state: decoherence::default_coherence_initial_state,
        default_time_grid: decoherence::default_time_grid,
    },
    ModelEntry {
        name: "radiative_profile",
        display_name: "Radiative air temperature over turf and sand",
        aliases: &["radiative", "heat_profile"],
        state_names: &radiative::STATE_NAMES,
        dynamics: Dynamics::ClosedForm(radiative::evaluate),
        default_params: radiative::default_params,
        default_initial_state: radiative::default_initial_state,
        default_time_grid: radiative::default_time_grid,
    },
];

pub fn builtin_models() -> &'static [ModelEntry] {
    &BUILTIN_MODELS
}

/// Name-keyed registry of model entries.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    entries: BTreeMap<&'static str, ModelEntry>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_MODELS.iter().map(|e| (e.name, *e)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> ModelResult<&ModelEntry> {
        self.entries
            .get(name)
            .or_else(|| self.entries.values().find(|e| e.matches(name)))
            .ok_or_else(|| ModelError::UnknownModel {
                name: name.to_string(),
            })
    }

    /// Add a caller-defined entry. Its name and aliases must not collide with
    /// anything already registered.
    pub fn register(&mut self, entry: ModelEntry) -> ModelResult<()> {
        let clash = std::iter::once(entry.name)
            .chain(entry.aliases.iter().copied())
            .find(|key| self.entries.values().any(|e| e.matches(key)));
        if let Some(key) = clash {
            return Err(ModelError::invalid(format!(
                "model name or alias '{key}' is already registered"
            )));
        }
        if entry.state_names.is_empty() {
            return Err(ModelError::invalid(format!(
                "model '{}' declares no state names",
                entry.name
            )));
        }
        if let Dynamics::Ode(bind) = entry.dynamics {
            let model = bind(&(entry.default_params)())?;
            if model.dimension() != entry.state_names.len() {
                return Err(ModelError::invalid(format!(
                    "model '{}' has {} state names but dimension {}",
                    entry.name,
                    entry.state_names.len(),
                    model.dimension()
                )));
            }
        }
        self.entries.insert(entry.name, entry);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Parameter sweeps: many configurations over one shared schedule.
//!
//! Configurations are independent (fresh population and engine each), so
//! they run in parallel. Rounds inside a configuration never do.

use rayon::prelude::*;

use crate::engine::RatingEngine;
use crate::error::Result;
use crate::runner::{run_experiment, Population, RunConfig, RunOutcome};
use crate::schedule::Schedule;

/// The configuration field a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SweepParameter {
    TimeLimit,
    Uncertainty,
}

impl SweepParameter {
    /// Column name used in summary tables.
    pub fn column(self) -> &'static str {
        match self {
            SweepParameter::TimeLimit => "time_limit",
            SweepParameter::Uncertainty => "uncertainty",
        }
    }

    pub fn value_of(self, config: &RunConfig) -> f64 {
        match self {
            SweepParameter::TimeLimit => config.time_limit,
            SweepParameter::Uncertainty => config.initial_uncertainty,
        }
    }

    fn apply(self, config: &mut RunConfig, value: f64) {
        match self {
            SweepParameter::TimeLimit => config.time_limit = value,
            SweepParameter::Uncertainty => config.initial_uncertainty = value,
        }
    }
}

/// Format a swept value for ids and file names: 5.0 → "5", 0.1 → "0.1".
pub fn format_value(value: f64) -> String {
    format!("{}", value)
}

/// One configuration per value, identical to `base` except for `parameter`.
pub fn expand_grid(base: &RunConfig, parameter: SweepParameter, values: &[f64]) -> Vec<RunConfig> {
    values
        .iter()
        .map(|&value| {
            let mut config = base.clone();
            parameter.apply(&mut config, value);
            config.id = format!("{}={}", parameter.column(), format_value(value));
            config
        })
        .collect()
}

/// Run every configuration against the same schedule, in parallel.
///
/// Results come back in `configs` order and match [`run_sweep_sequential`].
/// The first configuration error aborts the sweep.
pub fn run_sweep<E, F>(configs: &[RunConfig], schedule: &Schedule, build_engine: F) -> Result<Vec<RunOutcome>>
where
    E: RatingEngine,
    F: Fn(&Population) -> E + Sync,
{
    tracing::debug!(configs = configs.len(), rounds = schedule.len(), "sweep started");
    configs
        .par_iter()
        .map(|config| run_experiment(config, schedule, &build_engine))
        .collect()
}

pub fn run_sweep_sequential<E, F>(configs: &[RunConfig], schedule: &Schedule, build_engine: F) -> Result<Vec<RunOutcome>>
where
    E: RatingEngine,
    F: Fn(&Population) -> E,
{
    configs
        .iter()
        .map(|config| run_experiment(config, schedule, &build_engine))
        .collect()
}

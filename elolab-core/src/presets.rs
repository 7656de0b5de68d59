//! The four built-in experiments and the constants they run with.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::archetype::ArchetypeTable;
use crate::constants::{
    DEFAULT_TIME_LIMIT, DEFAULT_UNCERTAINTY, EPOCHS, GLOBAL_SEED, LANDMARK_POOL, SINGLE_PLAYER_DISPERSION_RATIO,
    TIME_LIMITS, UNCERTAINTY_LEVELS, UNCERTAINTY_SEED,
};
use crate::engine::{RatingEngine, TimedElo};
use crate::error::{ConfigurationError, Result};
use crate::performance::{AbsoluteModel, PerformanceModel, RelativeModel};
use crate::report::ColumnSet;
use crate::runner::{Population, RunConfig, RunOutcome};
use crate::schedule::{build_schedule, DrawPlan, Schedule};
use crate::sweep::{expand_grid, run_sweep, SweepParameter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Experiment {
    /// Three archetypes, relative timing, fresh draws, one configuration.
    Baseline,
    /// One player, relative timing gated by the limit.
    SinglePlayer,
    /// Absolute timing swept over time limits.
    TimeLimit,
    /// Pre-sampled relative outcomes swept over initial uncertainty.
    Uncertainty,
}

impl Experiment {
    pub const ALL: [Experiment; 4] = [
        Experiment::Baseline,
        Experiment::SinglePlayer,
        Experiment::TimeLimit,
        Experiment::Uncertainty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Experiment::Baseline => "baseline",
            Experiment::SinglePlayer => "single-player",
            Experiment::TimeLimit => "time-limit",
            Experiment::Uncertainty => "uncertainty",
        }
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Experiment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Experiment::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| format!("unknown experiment \"{s}\" (expected one of: baseline, single-player, time-limit, uncertainty)"))
    }
}

/// Replacements for the built-in constants. `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetOverrides {
    pub rounds: Option<usize>,
    pub seed: Option<u64>,
    pub time_limits: Option<Vec<f64>>,
    pub uncertainty_levels: Option<Vec<f64>>,
    pub landmarks: Option<Vec<String>>,
}

/// A ready-to-run experiment: one schedule, one or more configurations.
#[derive(Debug, Clone)]
pub struct ExperimentPlan {
    pub experiment: Experiment,
    pub schedule: Schedule,
    pub configs: Vec<RunConfig>,
    /// Per-round columns the history tables should carry.
    pub columns: ColumnSet,
    /// Set when the configurations form a sweep with a summary table.
    pub sweep: Option<SweepParameter>,
}

fn single_config(id: &str, model: PerformanceModel, fresh_seed: u64) -> RunConfig {
    RunConfig {
        id: id.to_string(),
        time_limit: DEFAULT_TIME_LIMIT,
        initial_uncertainty: DEFAULT_UNCERTAINTY,
        test_mode: true,
        model,
        fresh_seed,
    }
}

pub fn plan(experiment: Experiment, overrides: &PresetOverrides) -> Result<ExperimentPlan> {
    let rounds = overrides.rounds.unwrap_or(EPOCHS);
    let default_landmarks: Vec<String> = LANDMARK_POOL.iter().map(|s| s.to_string()).collect();
    let landmarks = overrides.landmarks.as_deref().unwrap_or(&default_landmarks);

    let plan = match experiment {
        Experiment::Baseline => {
            let seed = overrides.seed.unwrap_or(GLOBAL_SEED);
            let table = ArchetypeTable::relative_default(DEFAULT_TIME_LIMIT)?;
            let model = PerformanceModel::Relative(RelativeModel::default());
            ExperimentPlan {
                experiment,
                schedule: build_schedule(seed, rounds, &table, landmarks, DrawPlan::Fresh)?,
                configs: vec![single_config("baseline", model, seed)],
                columns: ColumnSet::RATINGS_ONLY,
                sweep: None,
            }
        }
        Experiment::SinglePlayer => {
            let seed = overrides.seed.unwrap_or(GLOBAL_SEED);
            let table = ArchetypeTable::single_player(DEFAULT_TIME_LIMIT)?;
            let model = PerformanceModel::Relative(RelativeModel::gated(SINGLE_PLAYER_DISPERSION_RATIO));
            ExperimentPlan {
                experiment,
                schedule: build_schedule(seed, rounds, &table, landmarks, DrawPlan::Fresh)?,
                configs: vec![single_config("single_player_timing", model, seed)],
                columns: ColumnSet {
                    landmark: true,
                    minutes_used: true,
                    timing_tag: true,
                    is_correct: true,
                    ..ColumnSet::RATINGS_ONLY
                },
                sweep: None,
            }
        }
        Experiment::TimeLimit => {
            let seed = overrides.seed.unwrap_or(GLOBAL_SEED);
            let limits = overrides.time_limits.as_deref().unwrap_or(&TIME_LIMITS);
            let table = ArchetypeTable::absolute_default()?;
            let base = single_config("time_limit", PerformanceModel::Absolute(AbsoluteModel::default()), seed);
            ExperimentPlan {
                experiment,
                schedule: build_schedule(seed, rounds, &table, landmarks, DrawPlan::Standardized)?,
                configs: expand_grid(&base, SweepParameter::TimeLimit, limits),
                columns: ColumnSet {
                    time_limit: true,
                    player: true,
                    landmark: true,
                    minutes_used: true,
                    timing_tag: true,
                    is_correct: true,
                    ..ColumnSet::RATINGS_ONLY
                },
                sweep: Some(SweepParameter::TimeLimit),
            }
        }
        Experiment::Uncertainty => {
            let seed = overrides.seed.unwrap_or(UNCERTAINTY_SEED);
            let levels = overrides.uncertainty_levels.as_deref().unwrap_or(&UNCERTAINTY_LEVELS);
            let table = ArchetypeTable::relative_default(DEFAULT_TIME_LIMIT)?;
            let relative = RelativeModel::default();
            let draws = DrawPlan::Presampled {
                model: relative,
                time_limit: DEFAULT_TIME_LIMIT,
            };
            let base = single_config("uncertainty", PerformanceModel::Relative(relative), seed);
            ExperimentPlan {
                experiment,
                schedule: build_schedule(seed, rounds, &table, landmarks, draws)?,
                configs: expand_grid(&base, SweepParameter::Uncertainty, levels),
                columns: ColumnSet::RATINGS_ONLY,
                sweep: Some(SweepParameter::Uncertainty),
            }
        }
    };

    // Surface bad sweep values before anything runs
    let mut ids = HashSet::with_capacity(plan.configs.len());
    for config in &plan.configs {
        config.validate()?;
        if !ids.insert(config.id.as_str()) {
            return Err(ConfigurationError::DuplicateName(config.id.clone()));
        }
    }
    Ok(plan)
}

impl ExperimentPlan {
    /// Run every configuration with engines from `build_engine`.
    pub fn run_with<E, F>(&self, build_engine: F) -> Result<Vec<RunOutcome>>
    where
        E: RatingEngine,
        F: Fn(&Population) -> E + Sync,
    {
        tracing::info!(
            experiment = %self.experiment,
            configs = self.configs.len(),
            rounds = self.schedule.len(),
            seed = self.schedule.seed(),
            "running experiment"
        );
        run_sweep(&self.configs, &self.schedule, build_engine)
    }

    /// Run with the reference engine.
    pub fn run(&self) -> Result<Vec<RunOutcome>> {
        self.run_with(TimedElo::for_population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for experiment in Experiment::ALL {
            assert_eq!(experiment.name().parse::<Experiment>().unwrap(), experiment);
        }
        assert!("tournament".parse::<Experiment>().is_err());
    }

    #[test]
    fn test_time_limit_plan_shape() {
        let plan = plan(Experiment::TimeLimit, &PresetOverrides::default()).unwrap();
        assert_eq!(plan.schedule.len(), EPOCHS);
        assert_eq!(plan.configs.len(), TIME_LIMITS.len());
        assert_eq!(plan.sweep, Some(SweepParameter::TimeLimit));
        assert_eq!(plan.configs[0].id, "time_limit=5");
    }

    #[test]
    fn test_single_player_has_one_archetype() {
        let plan = plan(Experiment::SinglePlayer, &PresetOverrides::default()).unwrap();
        assert_eq!(plan.schedule.archetypes().names(), ["TestPlayer"]);
        assert!(plan.schedule.entries().iter().all(|e| e.archetype == 0));
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = PresetOverrides {
            rounds: Some(20),
            uncertainty_levels: Some(vec![0.2, 0.4]),
            landmarks: Some(vec!["Boole Library".into(), "Student Centre".into()]),
            ..PresetOverrides::default()
        };
        let plan = plan(Experiment::Uncertainty, &overrides).unwrap();
        assert_eq!(plan.schedule.len(), 20);
        assert_eq!(plan.configs.len(), 2);
        assert_eq!(plan.schedule.landmarks().len(), 2);
        assert_eq!(plan.schedule.seed(), UNCERTAINTY_SEED);
    }

    #[test]
    fn test_bad_overrides_fail_fast() {
        let zero = PresetOverrides {
            rounds: Some(0),
            ..PresetOverrides::default()
        };
        assert_eq!(plan(Experiment::Baseline, &zero).unwrap_err(), ConfigurationError::ZeroRounds);

        let bad_level = PresetOverrides {
            uncertainty_levels: Some(vec![0.5, 1.5]),
            ..PresetOverrides::default()
        };
        assert!(matches!(
            plan(Experiment::Uncertainty, &bad_level).unwrap_err(),
            ConfigurationError::InvalidParameter { name: "initial_uncertainty", .. }
        ));

        let repeated = PresetOverrides {
            time_limits: Some(vec![10.0, 5.0, 10.0]),
            ..PresetOverrides::default()
        };
        assert_eq!(
            plan(Experiment::TimeLimit, &repeated).unwrap_err(),
            ConfigurationError::DuplicateName("time_limit=10".into())
        );

        let no_landmarks = PresetOverrides {
            landmarks: Some(vec![]),
            ..PresetOverrides::default()
        };
        assert_eq!(
            plan(Experiment::TimeLimit, &no_landmarks).unwrap_err(),
            ConfigurationError::EmptyLandmarks
        );
    }
}

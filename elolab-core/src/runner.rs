//! Experiment runner: replays a shared schedule for one configuration.
//!
//! Each run owns a freshly initialised population and its own engine
//! instance, so runs never observe each other's state. The schedule is only
//! read. Rounds are applied strictly in order because ratings are
//! path-dependent.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::engine::RatingEngine;
use crate::error::{ConfigurationError, Result};
use crate::performance::PerformanceModel;
use crate::schedule::{RawDraws, Schedule, ScheduleEntry};
use crate::types::{LandmarkState, Performance, PlayerState, RatingState, RoundSnapshot, TimingTag};

/// ChaCha stream of the per-run source. Schedules draw from stream 0, so a
/// run seeded like its schedule still gets an unrelated word sequence.
const FRESH_DRAW_STREAM: u64 = 1;

fn fresh_draw_source(seed: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(FRESH_DRAW_STREAM);
    rng
}

/// Parameters of one configuration in a sweep.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    pub id: String,
    pub time_limit: f64,
    pub initial_uncertainty: f64,
    /// Passed through to the engine; holds uncertainty fixed for the run.
    pub test_mode: bool,
    pub model: PerformanceModel,
    /// Seed for rounds whose draws are sampled at play time.
    pub fresh_seed: u64,
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.time_limit.is_finite() && self.time_limit >= 0.0) {
            return Err(ConfigurationError::InvalidParameter {
                name: "time_limit",
                value: self.time_limit,
            });
        }
        if !(self.initial_uncertainty > 0.0 && self.initial_uncertainty <= 1.0) {
            return Err(ConfigurationError::InvalidParameter {
                name: "initial_uncertainty",
                value: self.initial_uncertainty,
            });
        }
        Ok(())
    }
}

/// Player and landmark states of one run, indexed like the schedule's sets.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Population {
    players: Vec<PlayerState>,
    landmarks: Vec<LandmarkState>,
}

impl Population {
    /// Everyone at rating 0.0 with the given uncertainty.
    pub fn fresh<S: AsRef<str>>(players: &[S], landmarks: &[S], uncertainty: f64) -> Self {
        Population {
            players: players.iter().map(|n| RatingState::fresh(n.as_ref(), uncertainty)).collect(),
            landmarks: landmarks.iter().map(|n| RatingState::fresh(n.as_ref(), uncertainty)).collect(),
        }
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn landmarks(&self) -> &[LandmarkState] {
        &self.landmarks
    }

    pub fn player(&self, name: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn landmark(&self, name: &str) -> Option<&LandmarkState> {
        self.landmarks.iter().find(|l| l.name == name)
    }

    fn pair_mut(&mut self, player: usize, landmark: usize) -> (&mut PlayerState, &mut LandmarkState) {
        (&mut self.players[player], &mut self.landmarks[landmark])
    }

    fn player_ratings(&self) -> Vec<f64> {
        self.players.iter().map(|p| p.rating).collect()
    }

    fn landmark_ratings(&self) -> Vec<f64> {
        self.landmarks.iter().map(|l| l.rating).collect()
    }
}

/// Per-archetype round and timeout tallies, indexed like the archetype table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisitCounts {
    pub visits: Vec<usize>,
    pub timeouts: Vec<usize>,
}

impl VisitCounts {
    pub fn new(num_archetypes: usize) -> Self {
        VisitCounts {
            visits: vec![0; num_archetypes],
            timeouts: vec![0; num_archetypes],
        }
    }

    pub fn record(&mut self, archetype: usize, tag: TimingTag) {
        self.visits[archetype] += 1;
        if tag.is_timeout() {
            self.timeouts[archetype] += 1;
        }
    }
}

/// Everything one configuration produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub config: RunConfig,
    pub history: Vec<RoundSnapshot>,
    pub counts: VisitCounts,
    /// Population after the last round.
    pub population: Population,
    pub player_names: Vec<String>,
    pub landmark_names: Vec<String>,
}

pub struct ExperimentRunner<'s, E> {
    config: RunConfig,
    configuration_id: Arc<str>,
    schedule: &'s Schedule,
    population: Population,
    engine: E,
    rng: ChaCha8Rng,
    /// Index of the next schedule entry to play.
    next: usize,
    counts: VisitCounts,
    history: Vec<RoundSnapshot>,
}

impl<'s, E: RatingEngine> ExperimentRunner<'s, E> {
    /// Validate the configuration against the schedule and set up fresh state.
    ///
    /// `build_engine` sees the population exactly once, before any round.
    pub fn new<F>(config: &RunConfig, schedule: &'s Schedule, build_engine: F) -> Result<Self>
    where
        F: FnOnce(&Population) -> E,
    {
        config.validate()?;
        if schedule.is_empty() {
            return Err(ConfigurationError::ZeroRounds);
        }
        if schedule.archetypes().is_empty() {
            return Err(ConfigurationError::EmptyArchetypes);
        }
        if schedule.landmarks().is_empty() {
            return Err(ConfigurationError::EmptyLandmarks);
        }
        for entry in schedule.entries() {
            check_draws(&config.model, entry)?;
        }

        let population = Population::fresh(
            schedule.archetypes().names(),
            schedule.landmarks().names(),
            config.initial_uncertainty,
        );
        let engine = build_engine(&population);

        Ok(ExperimentRunner {
            configuration_id: Arc::from(config.id.as_str()),
            config: config.clone(),
            schedule,
            population,
            engine,
            rng: fresh_draw_source(config.fresh_seed),
            next: 0,
            counts: VisitCounts::new(schedule.archetypes().len()),
            history: Vec::with_capacity(schedule.len()),
        })
    }

    fn perform(&mut self, entry: &ScheduleEntry) -> Performance {
        let schedule = self.schedule;
        let profile = schedule.archetypes().by_index(entry.archetype);
        let time_limit = self.config.time_limit;
        match (entry.draws, &self.config.model) {
            (RawDraws::Standardized { z, u }, PerformanceModel::Absolute(model)) => {
                model.sample(profile, time_limit, z, u)
            }
            (RawDraws::Fresh, PerformanceModel::Relative(model)) => model.sample(profile, time_limit, &mut self.rng),
            (RawDraws::Realized { minutes_used, correct }, PerformanceModel::Relative(_)) => Performance {
                minutes_used,
                correct,
                tag: TimingTag::classify(minutes_used, time_limit),
            },
            // Ruled out by check_draws in new()
            _ => unreachable!("draws were validated against the model"),
        }
    }

    /// Play the next scheduled round and record its snapshot.
    /// Returns `None` once the schedule is exhausted.
    pub fn step(&mut self) -> Option<&RoundSnapshot> {
        let schedule = self.schedule;
        let entry = schedule.entries().get(self.next)?;
        self.next += 1;
        let performance = self.perform(entry);

        let (player, landmark) = self.population.pair_mut(entry.archetype, entry.landmark);
        self.engine.calculate_elo(
            player,
            landmark,
            performance.minutes_used,
            self.config.time_limit,
            performance.correct,
            self.config.test_mode,
        );

        self.counts.record(entry.archetype, performance.tag);

        tracing::trace!(
            config = %self.configuration_id,
            round = entry.round,
            minutes = performance.minutes_used,
            tag = %performance.tag,
            correct = performance.correct,
            "round played"
        );

        self.history.push(RoundSnapshot {
            round: entry.round,
            configuration_id: self.configuration_id.clone(),
            archetype: entry.archetype,
            landmark: entry.landmark,
            performance,
            player_ratings: self.population.player_ratings(),
            landmark_ratings: self.population.landmark_ratings(),
        });
        self.history.last()
    }

    /// Play the whole schedule in order.
    pub fn run(mut self) -> RunOutcome {
        tracing::debug!(config = %self.configuration_id, rounds = self.schedule.len(), "run started");
        let schedule = self.schedule;
        while self.step().is_some() {}
        tracing::debug!(config = %self.configuration_id, "run finished");

        RunOutcome {
            config: self.config,
            history: self.history,
            counts: self.counts,
            population: self.population,
            player_names: schedule.archetypes().names().to_vec(),
            landmark_names: schedule.landmarks().names().to_vec(),
        }
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn history(&self) -> &[RoundSnapshot] {
        &self.history
    }
}

fn check_draws(model: &PerformanceModel, entry: &ScheduleEntry) -> Result<()> {
    let fits = matches!(
        (entry.draws, model),
        (RawDraws::Standardized { .. }, PerformanceModel::Absolute(_))
            | (RawDraws::Fresh, PerformanceModel::Relative(_))
            | (RawDraws::Realized { .. }, PerformanceModel::Relative(_))
    );
    if fits {
        Ok(())
    } else {
        Err(ConfigurationError::DrawMismatch {
            round: entry.round,
            model: model.name(),
        })
    }
}

/// Run one configuration over the shared schedule.
pub fn run_experiment<E, F>(config: &RunConfig, schedule: &Schedule, build_engine: F) -> Result<RunOutcome>
where
    E: RatingEngine,
    F: FnOnce(&Population) -> E,
{
    Ok(ExperimentRunner::new(config, schedule, build_engine)?.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::ArchetypeTable;
    use crate::constants::{GLOBAL_SEED, LANDMARK_POOL};
    use crate::engine::TimedElo;
    use crate::performance::{AbsoluteModel, RelativeModel};
    use crate::schedule::{build_schedule, DrawPlan};
    use rand::RngCore;

    fn absolute_config(time_limit: f64) -> RunConfig {
        RunConfig {
            id: format!("tl={time_limit}"),
            time_limit,
            initial_uncertainty: 0.5,
            test_mode: true,
            model: PerformanceModel::Absolute(AbsoluteModel::default()),
            fresh_seed: 0,
        }
    }

    /// Engine that records what it was called with and nudges ratings by a constant.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, String, bool)>,
    }

    impl RatingEngine for Recorder {
        fn calculate_elo(
            &mut self,
            player: &mut PlayerState,
            landmark: &mut LandmarkState,
            _minutes_used: f64,
            _time_limit_minutes: f64,
            correct: bool,
            _test_mode: bool,
        ) {
            self.calls.push((player.name.clone(), landmark.name.clone(), correct));
            player.rating += 1.0;
            landmark.rating -= 1.0;
        }
    }

    #[test]
    fn test_snapshot_covers_every_entity() {
        let table = ArchetypeTable::absolute_default().unwrap();
        let schedule = build_schedule(42, 30, &table, &LANDMARK_POOL, DrawPlan::Standardized).unwrap();
        let outcome = run_experiment(&absolute_config(10.0), &schedule, TimedElo::for_population).unwrap();

        assert_eq!(outcome.history.len(), 30);
        for (i, snap) in outcome.history.iter().enumerate() {
            assert_eq!(snap.round, i + 1);
            assert_eq!(snap.player_ratings.len(), 3);
            assert_eq!(snap.landmark_ratings.len(), LANDMARK_POOL.len());
            assert_eq!(&*snap.configuration_id, "tl=10");
        }
        assert_eq!(outcome.counts.visits.iter().sum::<usize>(), 30);
    }

    #[test]
    fn test_engine_sees_scheduled_pairs_in_order() {
        let table = ArchetypeTable::absolute_default().unwrap();
        let schedule = build_schedule(42, 25, &table, &LANDMARK_POOL, DrawPlan::Standardized).unwrap();
        let mut runner = ExperimentRunner::new(&absolute_config(10.0), &schedule, |_| Recorder::default()).unwrap();
        while runner.step().is_some() {}
        assert_eq!(runner.engine.calls.len(), schedule.len());
        for (call, entry) in runner.engine.calls.iter().zip(schedule.entries()) {
            assert_eq!(call.0, table.by_index(entry.archetype).name);
            assert_eq!(call.1, LANDMARK_POOL[entry.landmark]);
        }
        // Untouched entities keep their value in later snapshots
        let last = runner.history().last().unwrap();
        let total: f64 = last.player_ratings.iter().sum();
        assert_eq!(total, 25.0);
    }

    #[test]
    fn test_runs_do_not_share_state() {
        let table = ArchetypeTable::absolute_default().unwrap();
        let schedule = build_schedule(9, 40, &table, &LANDMARK_POOL, DrawPlan::Standardized).unwrap();
        let first = run_experiment(&absolute_config(10.0), &schedule, TimedElo::for_population).unwrap();
        let second = run_experiment(&absolute_config(10.0), &schedule, TimedElo::for_population).unwrap();
        assert_eq!(first.history, second.history);
        assert_eq!(first.population, second.population);
    }

    #[test]
    fn test_draw_mismatch_fails_before_any_round() {
        let table = ArchetypeTable::absolute_default().unwrap();
        let schedule = build_schedule(9, 10, &table, &LANDMARK_POOL, DrawPlan::Fresh).unwrap();
        let err = ExperimentRunner::new(&absolute_config(10.0), &schedule, TimedElo::for_population)
            .err()
            .unwrap();
        assert_eq!(err, ConfigurationError::DrawMismatch { round: 1, model: "absolute" });
    }

    #[test]
    fn test_invalid_uncertainty_rejected() {
        let table = ArchetypeTable::absolute_default().unwrap();
        let schedule = build_schedule(9, 10, &table, &LANDMARK_POOL, DrawPlan::Standardized).unwrap();
        let mut config = absolute_config(10.0);
        config.initial_uncertainty = 0.0;
        assert!(matches!(
            run_experiment(&config, &schedule, TimedElo::for_population),
            Err(ConfigurationError::InvalidParameter { name: "initial_uncertainty", .. })
        ));
    }

    #[test]
    fn test_fresh_draws_follow_config_seed() {
        let table = ArchetypeTable::relative_default(10.0).unwrap();
        let schedule = build_schedule(1, 50, &table, &LANDMARK_POOL, DrawPlan::Fresh).unwrap();
        let config = |seed| RunConfig {
            id: "baseline".into(),
            time_limit: 10.0,
            initial_uncertainty: 0.5,
            test_mode: true,
            model: PerformanceModel::Relative(RelativeModel::default()),
            fresh_seed: seed,
        };
        let a = run_experiment(&config(5), &schedule, TimedElo::for_population).unwrap();
        let b = run_experiment(&config(5), &schedule, TimedElo::for_population).unwrap();
        let c = run_experiment(&config(6), &schedule, TimedElo::for_population).unwrap();
        assert_eq!(a.history, b.history);
        assert_ne!(a.history, c.history);
    }

    #[test]
    fn test_step_stops_at_end_of_schedule() {
        let table = ArchetypeTable::absolute_default().unwrap();
        let schedule = build_schedule(3, 5, &table, &LANDMARK_POOL, DrawPlan::Standardized).unwrap();
        let mut runner = ExperimentRunner::new(&absolute_config(10.0), &schedule, TimedElo::for_population).unwrap();
        for round in 1..=5 {
            assert_eq!(runner.step().map(|snap| snap.round), Some(round));
        }
        assert!(runner.step().is_none());
        assert!(runner.step().is_none());
        assert_eq!(runner.history().len(), schedule.len());
    }

    #[test]
    fn test_fresh_source_does_not_replay_schedule_source() {
        let mut schedule_rng = ChaCha8Rng::seed_from_u64(GLOBAL_SEED);
        let mut fresh = fresh_draw_source(GLOBAL_SEED);
        let a: Vec<u32> = (0..8).map(|_| schedule_rng.next_u32()).collect();
        let b: Vec<u32> = (0..8).map(|_| fresh.next_u32()).collect();
        assert_ne!(a, b);
    }
}

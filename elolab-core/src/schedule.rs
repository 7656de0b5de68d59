//! Seeded, reusable round schedules.
//!
//! A schedule fixes every random choice of an experiment up front: which
//! archetype plays, which landmark is shown and, depending on the plan, the raw
//! draws behind the round's outcome. One schedule is shared read-only by every
//! configuration of a sweep so that differences between configurations come
//! from the swept parameter alone.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::archetype::ArchetypeTable;
use crate::error::{ConfigurationError, Result};
use crate::performance::RelativeModel;
use crate::types::Roster;

/// Random material attached to one scheduled round.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawDraws {
    /// Nothing stored; the runner samples the relative model at play time.
    Fresh,
    /// Standard-normal `z` and uniform `u` in [0, 1) for the absolute model.
    Standardized { z: f64, u: f64 },
    /// Relative-model outcome sampled while the schedule was built.
    Realized { minutes_used: f64, correct: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleEntry {
    /// 1-based round number.
    pub round: usize,
    pub archetype: usize,
    pub landmark: usize,
    pub draws: RawDraws,
}

/// What to draw per round besides the archetype and landmark choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawPlan {
    Fresh,
    Standardized,
    /// Freeze relative-model outcomes for the given limit into the schedule.
    Presampled { model: RelativeModel, time_limit: f64 },
}

/// Ordered, immutable sequence of rounds plus the entity sets it indexes into.
#[derive(Debug, Clone)]
pub struct Schedule {
    seed: u64,
    archetypes: ArchetypeTable,
    landmarks: Roster,
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn archetypes(&self) -> &ArchetypeTable {
        &self.archetypes
    }

    pub fn landmarks(&self) -> &Roster {
        &self.landmarks
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build a schedule from a single source seeded exactly once.
///
/// Same seed, sets and plan always give an identical sequence. Per round the
/// draw order is: archetype, landmark, then the plan's draws.
pub fn build_schedule<S: AsRef<str>>(
    seed: u64,
    round_count: usize,
    archetypes: &ArchetypeTable,
    landmarks: &[S],
    plan: DrawPlan,
) -> Result<Schedule> {
    if round_count == 0 {
        return Err(ConfigurationError::ZeroRounds);
    }
    if archetypes.is_empty() {
        return Err(ConfigurationError::EmptyArchetypes);
    }
    if landmarks.is_empty() {
        return Err(ConfigurationError::EmptyLandmarks);
    }
    if let DrawPlan::Presampled { time_limit, .. } = plan {
        if !(time_limit.is_finite() && time_limit >= 0.0) {
            return Err(ConfigurationError::InvalidParameter {
                name: "time_limit",
                value: time_limit,
            });
        }
    }
    let landmarks = Roster::from_names(landmarks)?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut entries = Vec::with_capacity(round_count);

    for round in 1..=round_count {
        let archetype = rng.random_range(0..archetypes.len());
        let landmark = rng.random_range(0..landmarks.len());
        let draws = match plan {
            DrawPlan::Fresh => RawDraws::Fresh,
            DrawPlan::Standardized => {
                let z: f64 = rng.sample(StandardNormal);
                let u: f64 = rng.random();
                RawDraws::Standardized { z, u }
            }
            DrawPlan::Presampled { model, time_limit } => {
                let perf = model.sample(archetypes.by_index(archetype), time_limit, &mut rng);
                RawDraws::Realized {
                    minutes_used: perf.minutes_used,
                    correct: perf.correct,
                }
            }
        };
        entries.push(ScheduleEntry {
            round,
            archetype,
            landmark,
            draws,
        });
    }

    tracing::debug!(seed, round_count, ?plan, "built schedule");

    Ok(Schedule {
        seed,
        archetypes: archetypes.clone(),
        landmarks,
        entries,
    })
}

//! Performance models: map an archetype, a time limit and random draws to a
//! round outcome.
//!
//! Both models are stateless. The absolute model consumes pre-drawn `(z, u)`
//! values from the schedule, so replaying one schedule against several time
//! limits changes only the threshold comparison. The relative model draws
//! from a caller-supplied source.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::archetype::ArchetypeProfile;
use crate::constants::{FLOOR_MINUTES, RELATIVE_DISPERSION_RATIO};
use crate::types::{Performance, TimingTag};

/// Clamp a raw duration to the floor. NaN also lands on the floor.
pub fn clamp_minutes(raw: f64, floor_minutes: f64) -> f64 {
    raw.max(floor_minutes)
}

/// Duration from a fixed standardized draw; correctness gated by the limit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsoluteModel {
    pub floor_minutes: f64,
}

impl Default for AbsoluteModel {
    fn default() -> Self {
        AbsoluteModel {
            floor_minutes: FLOOR_MINUTES,
        }
    }
}

impl AbsoluteModel {
    /// `minutes_used` depends only on the profile and `z`, never on `time_limit`.
    /// A timeout overrides correctness and leaves `u` unused.
    pub fn sample(&self, profile: &ArchetypeProfile, time_limit: f64, z: f64, u: f64) -> Performance {
        let minutes_used = clamp_minutes(profile.mean_time + z * profile.dispersion, self.floor_minutes);
        match TimingTag::classify(minutes_used, time_limit) {
            TimingTag::Timeout => Performance {
                minutes_used,
                correct: false,
                tag: TimingTag::Timeout,
            },
            TimingTag::InTime => Performance {
                minutes_used,
                correct: u < profile.correct_prob,
                tag: TimingTag::InTime,
            },
        }
    }
}

/// Duration and correctness drawn fresh on each call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelativeModel {
    /// Standard deviation of the duration as a fraction of the time limit.
    pub dispersion_ratio: f64,
    pub floor_minutes: f64,
    /// When set, a round over the limit is scored incorrect and the accuracy
    /// draw is skipped. When clear, correctness ignores the duration entirely.
    pub gated: bool,
}

impl Default for RelativeModel {
    fn default() -> Self {
        RelativeModel {
            dispersion_ratio: RELATIVE_DISPERSION_RATIO,
            floor_minutes: FLOOR_MINUTES,
            gated: false,
        }
    }
}

impl RelativeModel {
    pub fn gated(dispersion_ratio: f64) -> Self {
        RelativeModel {
            dispersion_ratio,
            gated: true,
            ..Self::default()
        }
    }

    fn sample_minutes<R: Rng + ?Sized>(&self, profile: &ArchetypeProfile, time_limit: f64, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        let std_dev = self.dispersion_ratio * time_limit.max(0.0);
        clamp_minutes(profile.mean_time + z * std_dev, self.floor_minutes)
    }

    pub fn sample<R: Rng + ?Sized>(&self, profile: &ArchetypeProfile, time_limit: f64, rng: &mut R) -> Performance {
        if self.gated {
            let minutes_used = self.sample_minutes(profile, time_limit, rng);
            let tag = TimingTag::classify(minutes_used, time_limit);
            let correct = !tag.is_timeout() && rng.random::<f64>() < profile.correct_prob;
            return Performance { minutes_used, correct, tag };
        }

        let correct = rng.random::<f64>() < profile.correct_prob;
        let minutes_used = self.sample_minutes(profile, time_limit, rng);
        Performance {
            minutes_used,
            correct,
            tag: TimingTag::classify(minutes_used, time_limit),
        }
    }
}

/// Performance model selected by a run configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PerformanceModel {
    Relative(RelativeModel),
    Absolute(AbsoluteModel),
}

impl PerformanceModel {
    pub fn name(&self) -> &'static str {
        match self {
            PerformanceModel::Relative(m) if m.gated => "gated relative",
            PerformanceModel::Relative(_) => "relative",
            PerformanceModel::Absolute(_) => "absolute",
        }
    }
}

//! Static per-archetype performance parameters.
//!
//! A table is validated once when it is built and is immutable afterwards.

use crate::constants::{RELATIVE_DISPERSION_RATIO, SINGLE_PLAYER_DISPERSION_RATIO};
use crate::error::{ConfigurationError, Result};
use crate::types::Roster;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArchetypeProfile {
    pub name: String,
    /// Probability of a correct answer when the round is not a timeout.
    pub correct_prob: f64,
    /// Mean completion time in minutes.
    pub mean_time: f64,
    /// Standard deviation of the completion time in minutes.
    pub dispersion: f64,
}

impl ArchetypeProfile {
    pub fn new(name: impl Into<String>, correct_prob: f64, mean_time: f64, dispersion: f64) -> Self {
        ArchetypeProfile {
            name: name.into(),
            correct_prob,
            mean_time,
            dispersion,
        }
    }

    /// Profile whose timing is expressed as fractions of a time limit.
    pub fn relative(
        name: impl Into<String>,
        correct_prob: f64,
        mean_fraction: f64,
        dispersion_ratio: f64,
        time_limit: f64,
    ) -> Self {
        Self::new(name, correct_prob, mean_fraction * time_limit, dispersion_ratio * time_limit)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason| ConfigurationError::InvalidProfile {
            name: self.name.clone(),
            reason,
        };
        if !(0.0..=1.0).contains(&self.correct_prob) {
            return Err(invalid("correct_prob must be within [0, 1]"));
        }
        if !(self.mean_time.is_finite() && self.mean_time > 0.0) {
            return Err(invalid("mean_time must be positive"));
        }
        if !(self.dispersion.is_finite() && self.dispersion >= 0.0) {
            return Err(invalid("dispersion must be non-negative"));
        }
        Ok(())
    }
}

/// Closed, ordered set of archetypes used by one experiment.
#[derive(Debug, Clone)]
pub struct ArchetypeTable {
    profiles: Vec<ArchetypeProfile>,
    roster: Roster,
}

impl ArchetypeTable {
    pub fn new(profiles: Vec<ArchetypeProfile>) -> Result<Self> {
        if profiles.is_empty() {
            return Err(ConfigurationError::EmptyArchetypes);
        }
        for profile in &profiles {
            profile.validate()?;
        }
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        let roster = Roster::from_names(&names)?;
        Ok(ArchetypeTable { profiles, roster })
    }

    /// Novice/Average/Expert with absolute timing in minutes.
    pub fn absolute_default() -> Result<Self> {
        Self::new(vec![
            ArchetypeProfile::new("Novice", 0.40, 12.0, 3.0),
            ArchetypeProfile::new("Average", 0.65, 9.0, 2.0),
            ArchetypeProfile::new("Expert", 0.90, 6.0, 1.5),
        ])
    }

    /// Novice/Average/Expert whose mean time scales with the time limit.
    pub fn relative_default(time_limit: f64) -> Result<Self> {
        let r = RELATIVE_DISPERSION_RATIO;
        Self::new(vec![
            ArchetypeProfile::relative("Novice", 0.40, 0.9, r, time_limit),
            ArchetypeProfile::relative("Average", 0.65, 0.7, r, time_limit),
            ArchetypeProfile::relative("Expert", 0.90, 0.5, r, time_limit),
        ])
    }

    /// The lone player of the single-player timing test.
    pub fn single_player(time_limit: f64) -> Result<Self> {
        Self::new(vec![ArchetypeProfile::relative(
            "TestPlayer",
            0.65,
            0.75,
            SINGLE_PLAYER_DISPERSION_RATIO,
            time_limit,
        )])
    }

    pub fn get(&self, name: &str) -> Result<&ArchetypeProfile> {
        self.roster
            .index_of(name)
            .map(|idx| &self.profiles[idx])
            .ok_or_else(|| ConfigurationError::UnknownArchetype(name.to_string()))
    }

    pub fn by_index(&self, idx: usize) -> &ArchetypeProfile {
        &self.profiles[idx]
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn names(&self) -> &[String] {
        self.roster.names()
    }

    pub fn profiles(&self) -> &[ArchetypeProfile] {
        &self.profiles
    }
}

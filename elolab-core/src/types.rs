use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigurationError, Result};

/// Rating state for one player or one landmark.
///
/// Only the rating engine writes to it. The harness reads `rating` (and
/// `uncertainty`) after each engine call to build snapshots.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingState {
    pub name: String,
    pub rating: f64,
    /// Engine-defined marker of the last round this entity took part in.
    pub last_interaction: Option<u64>,
    /// Rating confidence in (0, 1]. Held fixed when the engine runs in test mode.
    pub uncertainty: f64,
}

impl RatingState {
    pub fn fresh(name: impl Into<String>, uncertainty: f64) -> Self {
        RatingState {
            name: name.into(),
            rating: 0.0,
            last_interaction: None,
            uncertainty,
        }
    }
}

pub type PlayerState = RatingState;
pub type LandmarkState = RatingState;

/// Whether a round finished inside the time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimingTag {
    InTime,
    Timeout,
}

impl TimingTag {
    /// Tag for a duration measured against a limit. Equal to the limit is still in time.
    pub fn classify(minutes_used: f64, time_limit: f64) -> Self {
        if minutes_used > time_limit {
            TimingTag::Timeout
        } else {
            TimingTag::InTime
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimingTag::InTime => "in_time",
            TimingTag::Timeout => "timeout",
        }
    }

    pub fn is_timeout(self) -> bool {
        self == TimingTag::Timeout
    }
}

impl fmt::Display for TimingTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one simulated round, as fed to the rating engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Performance {
    pub minutes_used: f64,
    pub correct: bool,
    pub tag: TimingTag,
}

/// Ratings of the whole population after one round of one configuration.
///
/// `player_ratings[i]` belongs to the i-th archetype of the schedule and
/// `landmark_ratings[j]` to its j-th landmark; every entity is captured, not
/// just the two that played this round.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundSnapshot {
    /// 1-based round number.
    pub round: usize,
    pub configuration_id: Arc<str>,
    /// Index of the archetype that played this round.
    pub archetype: usize,
    /// Index of the landmark that was shown this round.
    pub landmark: usize,
    pub performance: Performance,
    pub player_ratings: Vec<f64>,
    pub landmark_ratings: Vec<f64>,
}

/// Maps entity names to dense indices, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    names: Vec<String>,
    name_to_idx: HashMap<String, usize>,
}

impl Roster {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut name_to_idx = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            let name = name.as_ref();
            if name_to_idx.insert(name.to_string(), idx).is_some() {
                return Err(ConfigurationError::DuplicateName(name.to_string()));
            }
        }
        Ok(Roster {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            name_to_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_idx.get(name).copied()
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundary_is_in_time() {
        assert_eq!(TimingTag::classify(10.0, 10.0), TimingTag::InTime);
        assert_eq!(TimingTag::classify(10.0001, 10.0), TimingTag::Timeout);
        assert_eq!(TimingTag::classify(0.1, 0.0), TimingTag::Timeout);
    }

    #[test]
    fn test_roster_keeps_insertion_order() {
        let roster = Roster::from_names(&["Novice", "Average", "Expert"]).unwrap();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.index_of("Expert"), Some(2));
        assert_eq!(roster.name(1), "Average");
        assert_eq!(roster.index_of("Master"), None);
    }

    #[test]
    fn test_roster_rejects_duplicates() {
        let err = Roster::from_names(&["Boole Library", "Boole Library"]).unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateName("Boole Library".into()));
    }

    #[test]
    fn test_fresh_state_starts_at_zero() {
        let state = RatingState::fresh("Student Centre", 0.3);
        assert_eq!(state.rating, 0.0);
        assert_eq!(state.last_interaction, None);
        assert_eq!(state.uncertainty, 0.3);
    }
}

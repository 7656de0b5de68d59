//! Summary statistics derived from a finished run. Read-only over the outcome.

use crate::runner::{RunOutcome, VisitCounts};

/// Timeout rate of one archetype within one configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregateStat {
    pub configuration_id: String,
    pub archetype: String,
    pub timeout_rate: f64,
}

/// `timeouts / max(1, visits)`: an archetype that never played has rate 0.
pub fn timeout_rate(visits: usize, timeouts: usize) -> f64 {
    timeouts as f64 / visits.max(1) as f64
}

/// Rates per archetype, in archetype order.
pub fn timeout_rates(archetypes: &[String], counts: &VisitCounts) -> Vec<(String, f64)> {
    archetypes
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), timeout_rate(counts.visits[i], counts.timeouts[i])))
        .collect()
}

pub fn aggregate(outcome: &RunOutcome) -> Vec<AggregateStat> {
    timeout_rates(&outcome.player_names, &outcome.counts)
        .into_iter()
        .map(|(archetype, timeout_rate)| AggregateStat {
            configuration_id: outcome.config.id.clone(),
            archetype,
            timeout_rate,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntityKind {
    Player,
    Landmark,
}

/// Final rating of one entity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standing {
    pub name: String,
    pub kind: EntityKind,
    pub rating: f64,
    pub uncertainty: f64,
    /// Rounds this entity took part in.
    pub rounds: usize,
}

/// Players then landmarks, each group sorted by final rating, highest first.
pub fn final_standings(outcome: &RunOutcome) -> Vec<Standing> {
    let mut landmark_rounds = vec![0usize; outcome.landmark_names.len()];
    for snap in &outcome.history {
        landmark_rounds[snap.landmark] += 1;
    }

    let by_rating = |a: &Standing, b: &Standing| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal);

    let mut players: Vec<Standing> = outcome
        .population
        .players()
        .iter()
        .zip(&outcome.counts.visits)
        .map(|(p, &rounds)| Standing {
            name: p.name.clone(),
            kind: EntityKind::Player,
            rating: p.rating,
            uncertainty: p.uncertainty,
            rounds,
        })
        .collect();
    players.sort_by(by_rating);

    let mut landmarks: Vec<Standing> = outcome
        .population
        .landmarks()
        .iter()
        .zip(landmark_rounds)
        .map(|(l, rounds)| Standing {
            name: l.name.clone(),
            kind: EntityKind::Landmark,
            rating: l.rating,
            uncertainty: l.uncertainty,
            rounds,
        })
        .collect();
    landmarks.sort_by(by_rating);

    players.extend(landmarks);
    players
}

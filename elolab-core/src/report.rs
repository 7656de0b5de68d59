//! Shapes run outcomes into flat tables for persistence.
//!
//! Nothing here writes files; the CLI decides where tables go.

use std::fmt;

use crate::runner::RunOutcome;
use crate::stats::timeout_rates;
use crate::sweep::SweepParameter;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn column(&self, header: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(header)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}

/// Optional per-round columns. Emitted after `round` in field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSet {
    pub time_limit: bool,
    pub uncertainty: bool,
    pub player: bool,
    pub landmark: bool,
    pub minutes_used: bool,
    pub timing_tag: bool,
    pub is_correct: bool,
}

impl ColumnSet {
    pub const RATINGS_ONLY: ColumnSet = ColumnSet {
        time_limit: false,
        uncertainty: false,
        player: false,
        landmark: false,
        minutes_used: false,
        timing_tag: false,
        is_correct: false,
    };

    /// Everything known about each round.
    pub const FULL: ColumnSet = ColumnSet {
        time_limit: true,
        uncertainty: true,
        player: true,
        landmark: true,
        minutes_used: true,
        timing_tag: true,
        is_correct: true,
    };
}

/// One row per round: `round`, the selected optional columns, then
/// `player_<name>` and `landmark_<name>` for every entity.
pub fn history_table(outcome: &RunOutcome, columns: ColumnSet) -> Table {
    let mut headers = vec!["round".to_string()];
    let optional = [
        (columns.time_limit, "time_limit"),
        (columns.uncertainty, "uncertainty"),
        (columns.player, "player"),
        (columns.landmark, "landmark"),
        (columns.minutes_used, "minutes_used"),
        (columns.timing_tag, "timing_tag"),
        (columns.is_correct, "is_correct"),
    ];
    headers.extend(optional.iter().filter(|(on, _)| *on).map(|(_, h)| h.to_string()));
    headers.extend(outcome.player_names.iter().map(|n| format!("player_{n}")));
    headers.extend(outcome.landmark_names.iter().map(|n| format!("landmark_{n}")));

    let rows = outcome
        .history
        .iter()
        .map(|snap| {
            let mut row = Vec::with_capacity(headers.len());
            row.push(Cell::Int(snap.round as i64));
            if columns.time_limit {
                row.push(Cell::Float(outcome.config.time_limit));
            }
            if columns.uncertainty {
                row.push(Cell::Float(outcome.config.initial_uncertainty));
            }
            if columns.player {
                row.push(Cell::Text(outcome.player_names[snap.archetype].clone()));
            }
            if columns.landmark {
                row.push(Cell::Text(outcome.landmark_names[snap.landmark].clone()));
            }
            if columns.minutes_used {
                row.push(Cell::Float(snap.performance.minutes_used));
            }
            if columns.timing_tag {
                row.push(Cell::Text(snap.performance.tag.as_str().to_string()));
            }
            if columns.is_correct {
                row.push(Cell::Int(snap.performance.correct as i64));
            }
            row.extend(snap.player_ratings.iter().map(|&r| Cell::Float(r)));
            row.extend(snap.landmark_ratings.iter().map(|&r| Cell::Float(r)));
            row
        })
        .collect();

    Table { headers, rows }
}

/// One row per configuration: the swept value, then `timeout_rate_<archetype>`.
///
/// Archetype columns come from the first outcome; every outcome of a sweep
/// shares the schedule, hence the archetype set.
pub fn summary_table(parameter: SweepParameter, outcomes: &[RunOutcome]) -> Table {
    let Some(first) = outcomes.first() else {
        return Table {
            headers: vec![parameter.column().to_string()],
            rows: Vec::new(),
        };
    };

    let mut headers = vec![parameter.column().to_string()];
    headers.extend(first.player_names.iter().map(|n| format!("timeout_rate_{n}")));

    let rows = outcomes
        .iter()
        .map(|outcome| {
            let mut row = vec![Cell::Float(parameter.value_of(&outcome.config))];
            row.extend(
                timeout_rates(&outcome.player_names, &outcome.counts)
                    .into_iter()
                    .map(|(_, rate)| Cell::Float(rate)),
            );
            row
        })
        .collect();

    Table { headers, rows }
}

//! elolab-core: Simulation harness for a timed landmark-recognition rating system.
//!
//! Seeded schedule → per-round performance → rating-engine update → full
//! snapshot. Sweeps replay one schedule under many configurations so that
//! differences come from the swept parameter alone. No IO; the CLI writes
//! the tables this crate shapes.
//!
//! # Quick start
//!
//! ```rust
//! use elolab_core::{plan, summary_table, Experiment, PresetOverrides};
//!
//! let overrides = PresetOverrides { rounds: Some(50), ..PresetOverrides::default() };
//! let experiment = plan(Experiment::TimeLimit, &overrides).unwrap();
//! let outcomes = experiment.run().unwrap();
//!
//! let summary = summary_table(experiment.sweep.unwrap(), &outcomes);
//! assert_eq!(summary.rows.len(), 6);
//! ```

pub mod archetype;
pub mod constants;
pub mod engine;
pub mod error;
pub mod performance;
pub mod presets;
pub mod report;
pub mod runner;
pub mod schedule;
pub mod stats;
pub mod sweep;
pub mod types;

// Re-export primary public API at crate root.
pub use archetype::{ArchetypeProfile, ArchetypeTable};
pub use engine::{RatingEngine, TimedElo};
pub use error::{ConfigurationError, Result};
pub use performance::{clamp_minutes, AbsoluteModel, PerformanceModel, RelativeModel};
pub use presets::{plan, Experiment, ExperimentPlan, PresetOverrides};
pub use report::{history_table, summary_table, Cell, ColumnSet, Table};
pub use runner::{run_experiment, ExperimentRunner, Population, RunConfig, RunOutcome, VisitCounts};
pub use schedule::{build_schedule, DrawPlan, RawDraws, Schedule, ScheduleEntry};
pub use stats::{aggregate, final_standings, timeout_rate, timeout_rates, AggregateStat, EntityKind, Standing};
pub use sweep::{expand_grid, run_sweep, run_sweep_sequential, SweepParameter};
pub use types::{LandmarkState, Performance, PlayerState, RatingState, RoundSnapshot, Roster, TimingTag};

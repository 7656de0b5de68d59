/// Number of rounds played in every experiment configuration.
pub const EPOCHS: usize = 200;

/// Seed shared by the baseline, single-player and time-limit experiments.
pub const GLOBAL_SEED: u64 = 20250826;

/// Seed for the uncertainty-sensitivity schedule.
pub const UNCERTAINTY_SEED: u64 = 20250819;

/// Lower bound for any sampled completion time, in minutes.
///
/// Gaussian draws can go negative for fast archetypes or extreme `z`.
/// Anything at or below this is clamped up to it.
pub const FLOOR_MINUTES: f64 = 0.1;

/// Time limit used when an experiment does not sweep it.
pub const DEFAULT_TIME_LIMIT: f64 = 10.0;

/// Initial uncertainty for players and landmarks when it is not swept.
pub const DEFAULT_UNCERTAINTY: f64 = 0.5;

/// Time limits swept by the time-limit experiment, in minutes.
pub const TIME_LIMITS: [f64; 6] = [5.0, 10.0, 15.0, 20.0, 25.0, 30.0];

/// Initial uncertainty levels swept by the uncertainty experiment.
pub const UNCERTAINTY_LEVELS: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

/// Spread of relative-model durations as a fraction of the time limit.
pub const RELATIVE_DISPERSION_RATIO: f64 = 0.1;

/// Spread used by the single-player timing test.
pub const SINGLE_PLAYER_DISPERSION_RATIO: f64 = 0.2;

/// Landmarks every experiment draws from.
pub const LANDMARK_POOL: [&str; 7] = [
    "Glucksman Gallery",
    "Honan Collegiate Chapel",
    "Boole Library",
    "The Quad / Aula Maxima",
    "Brookfield Health Sciences Complex",
    "Student Centre",
    "Geography Building",
];

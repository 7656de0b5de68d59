/// Errors raised while validating an experiment before it runs.
///
/// Every variant is detected up front: a run that returns one of these has
/// produced no snapshots.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("archetype set is empty")]
    EmptyArchetypes,

    #[error("landmark set is empty")]
    EmptyLandmarks,

    #[error("round count must be positive")]
    ZeroRounds,

    #[error("unknown archetype \"{0}\"")]
    UnknownArchetype(String),

    #[error("duplicate name \"{0}\"")]
    DuplicateName(String),

    #[error("invalid profile for \"{name}\": {reason}")]
    InvalidProfile { name: String, reason: &'static str },

    #[error("invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("round {round}: schedule draws do not fit the {model} model")]
    DrawMismatch { round: usize, model: &'static str },
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

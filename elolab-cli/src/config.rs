/// Config file loading and creation for the elolab CLI.
///
/// Config lives at ~/.config/elolab/config.toml.
/// All fields are optional. CLI flags override config values, which override
/// the built-in experiment constants.
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ElolabConfig {
    pub output_dir: Option<PathBuf>,
    pub rounds: Option<usize>,
    pub seed: Option<u64>,
    pub time_limits: Option<Vec<f64>>,
    pub uncertainty_levels: Option<Vec<f64>>,
    pub landmarks: Option<Vec<String>>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# elolab configuration
# All values here can be overridden by CLI flags.

# Directory that receives one sub-directory of CSV files per experiment
# output_dir = \"results\"

# Rounds per run
# rounds = 200

# Schedule seed. When unset, each experiment uses its own built-in seed.
# seed = 20250826

# Time limits (minutes) swept by the time-limit experiment
# time_limits = [5.0, 10.0, 15.0, 20.0, 25.0, 30.0]

# Initial uncertainties swept by the uncertainty experiment
# uncertainty_levels = [0.1, 0.3, 0.5, 0.7, 0.9]

# Landmarks shown to players
# landmarks = [\"Glucksman Gallery\", \"Boole Library\", \"Honan Chapel\"]
";

/// Returns the default config path: ~/.config/elolab/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("elolab").join("config.toml"))
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> Result<ElolabConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            toml::from_str(&content).with_context(|| format!("Failed to parse config at {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ElolabConfig::default()),
        Err(e) => Err(e).with_context(|| format!("Failed to read config at {}", path.display())),
    }
}

/// Write the commented template to `path`. Errors if it already exists.
pub fn create_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write config to {}", path.display()))
}

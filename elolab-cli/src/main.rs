mod config;
mod output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use elolab_core::{final_standings, history_table, plan, summary_table, Experiment, PresetOverrides};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use crate::output::{JsonConfiguration, JsonReport};

#[derive(Parser)]
#[command(name = "elolab", version, about = "Run timed landmark-rating experiments over shared random schedules")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug-level logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run one experiment, or "all" of them in turn
    Run(RunArgs),
    /// Create a default config file at ~/.config/elolab/config.toml
    Init {
        /// Write the template here instead
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the available experiments
    List,
}

#[derive(Clone, Copy, Debug)]
enum Selection {
    All,
    One(Experiment),
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Selection::All);
        }
        s.parse().map(Selection::One)
    }
}

impl Selection {
    fn experiments(self) -> Vec<Experiment> {
        match self {
            Selection::All => Experiment::ALL.to_vec(),
            Selection::One(e) => vec![e],
        }
    }
}

#[derive(Parser)]
struct RunArgs {
    /// baseline, single-player, time-limit, uncertainty or all
    experiment: Selection,

    /// Directory for CSV output (default: ./results)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Path to config file (default: ~/.config/elolab/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Schedule seed (default: the experiment's built-in seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Rounds per run
    #[arg(long)]
    rounds: Option<usize>,

    /// Comma-separated time limits for the time-limit experiment
    #[arg(long, value_delimiter = ',')]
    time_limits: Option<Vec<f64>>,

    /// Comma-separated initial uncertainties for the uncertainty experiment
    #[arg(long, value_delimiter = ',')]
    uncertainty_levels: Option<Vec<f64>>,

    /// Output JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Init { config } => {
            let path = match config {
                Some(path) => path,
                None => config::config_path()?,
            };
            config::create_default_config(&path)?;
            println!("Created config at {}", path.display());
            println!("Edit it to set your default output directory, rounds, seed, etc.");
            Ok(())
        }
        Commands::List => {
            for experiment in Experiment::ALL {
                println!("{experiment}");
            }
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    // Load config file, merge with CLI args (CLI wins)
    let config_path = match args.config.clone() {
        Some(path) => path,
        None => config::config_path()?,
    };
    let cfg = config::load_config(&config_path)?;

    let out_dir = args
        .out_dir
        .clone()
        .or(cfg.output_dir)
        .unwrap_or_else(|| PathBuf::from("results"));
    let overrides = PresetOverrides {
        rounds: args.rounds.or(cfg.rounds),
        seed: args.seed.or(cfg.seed),
        time_limits: args.time_limits.clone().or(cfg.time_limits),
        uncertainty_levels: args.uncertainty_levels.clone().or(cfg.uncertainty_levels),
        landmarks: cfg.landmarks,
    };

    if let Selection::One(experiment) = args.experiment {
        if args.time_limits.is_some() && experiment != Experiment::TimeLimit {
            tracing::warn!(%experiment, "--time-limits only applies to the time-limit experiment");
        }
        if args.uncertainty_levels.is_some() && experiment != Experiment::Uncertainty {
            tracing::warn!(%experiment, "--uncertainty-levels only applies to the uncertainty experiment");
        }
    }

    let mut failed_reports = 0;
    let mut json_reports = Vec::new();
    for experiment in args.experiment.experiments() {
        let (failed, report) = run_one(experiment, &overrides, &out_dir, args.json)?;
        failed_reports += failed;
        json_reports.extend(report);
    }
    if args.json {
        output::print_json(json_reports)?;
    }

    if failed_reports > 0 {
        bail!("{failed_reports} report file(s) could not be written");
    }
    Ok(())
}

/// Run one experiment, persist its tables and print its summary.
/// Returns the number of report files that failed to write and, with
/// `json`, the experiment's report for the caller to print.
fn run_one(
    experiment: Experiment,
    overrides: &PresetOverrides,
    out_dir: &Path,
    json: bool,
) -> Result<(usize, Option<serde_json::Value>)> {
    let plan = plan(experiment, overrides).with_context(|| format!("Invalid setup for {experiment}"))?;
    let outcomes = plan.run().with_context(|| format!("Failed to run {experiment}"))?;

    let dir = out_dir.join(experiment.name());
    let mut failed = 0;
    let mut persist = |name: String, table: &elolab_core::Table| {
        let path = dir.join(format!("{name}.csv"));
        match output::write_csv(&path, table) {
            Ok(()) => tracing::info!(path = %path.display(), rows = table.rows.len(), "wrote report"),
            Err(e) => {
                tracing::error!(path = %path.display(), "report failed: {e:#}");
                failed += 1;
            }
        }
    };

    for outcome in &outcomes {
        let table = history_table(outcome, plan.columns);
        persist(output::file_label(&outcome.config.id), &table);
    }

    let summary = plan.sweep.map(|parameter| summary_table(parameter, &outcomes));
    if let Some(summary) = &summary {
        persist("summary".to_string(), summary);
    }

    if json {
        let mut report = JsonReport::new(experiment, plan.schedule.seed(), plan.schedule.len(), summary.as_ref());
        report.configurations = outcomes
            .iter()
            .map(|o| JsonConfiguration {
                id: &o.config.id,
                standings: final_standings(o),
            })
            .collect();
        return Ok((failed, Some(report.to_value()?)));
    }

    println!(
        "== {experiment} ({} configuration(s), {} rounds, seed {}) ==",
        outcomes.len(),
        plan.schedule.len(),
        plan.schedule.seed()
    );
    if let Some(summary) = &summary {
        print!("{}", output::render_table(summary));
    }
    for outcome in &outcomes {
        output::print_standings(&outcome.config.id, &final_standings(outcome));
    }
    println!();

    Ok((failed, None))
}

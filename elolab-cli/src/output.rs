/// Output: CSV persistence, terminal tables and JSON.
use std::path::Path;

use anyhow::{Context, Result};
use elolab_core::{Cell, EntityKind, Experiment, Standing, Table, TimedElo};
use serde::Serialize;

/// Write `table` as CSV, creating parent directories as needed.
pub fn write_csv(path: &Path, table: &Table) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::to_string))?;
    }
    writer.flush().with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

/// File stem for a configuration id: `time_limit=5` becomes `time_limit_5`.
pub fn file_label(configuration_id: &str) -> String {
    configuration_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

fn terminal_cell(cell: &Cell) -> String {
    match cell {
        Cell::Float(v) => format!("{v:.4}"),
        other => other.to_string(),
    }
}

/// Render a table with every column padded to its widest entry.
pub fn render_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table.rows.iter().map(|r| r.iter().map(terminal_cell).collect()).collect();
    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| cells.iter().map(|r| r[i].len()).max().unwrap_or(0).max(h.len()))
        .collect();

    let mut out = String::new();
    let header: Vec<String> = table.headers.iter().zip(&widths).map(|(h, &w)| format!("{h:>w$}")).collect();
    out.push_str(&header.join(" | "));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("-|-"));
    out.push('\n');
    for row in &cells {
        let line: Vec<String> = row.iter().zip(&widths).map(|(c, &w)| format!("{c:>w$}")).collect();
        out.push_str(&line.join(" | "));
        out.push('\n');
    }
    out
}

/// Print final ratings of one configuration as a formatted terminal table.
pub fn print_standings(configuration_id: &str, standings: &[Standing]) {
    let name_width = standings.iter().map(|s| s.name.len()).max().unwrap_or(4).max(4);

    println!("\n{configuration_id}");
    println!("  Kind     | {:<name_width$} |  Rating | Uncertainty | Rounds", "Name");
    println!("  ---------|-{}-|---------|-------------|-------", "-".repeat(name_width));
    for s in standings {
        let kind = match s.kind {
            EntityKind::Player => "player",
            EntityKind::Landmark => "landmark",
        };
        println!(
            "  {:<8} | {:<name_width$} | {:>7.4} | {:>11.2} | {:>6}",
            kind, s.name, s.rating, s.uncertainty, s.rounds,
        );
    }
}

#[derive(Serialize)]
pub struct JsonConfiguration<'a> {
    pub id: &'a str,
    pub standings: Vec<Standing>,
}

#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub experiment: Experiment,
    pub engine: &'static str,
    pub seed: u64,
    pub rounds: usize,
    pub summary: Option<&'a Table>,
    pub configurations: Vec<JsonConfiguration<'a>>,
}

impl<'a> JsonReport<'a> {
    pub fn new(experiment: Experiment, seed: u64, rounds: usize, summary: Option<&'a Table>) -> Self {
        JsonReport {
            experiment,
            engine: TimedElo::VERSION,
            seed,
            rounds,
            summary,
            configurations: Vec::new(),
        }
    }
}

impl JsonReport<'_> {
    pub fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).context("Failed to serialize report")
    }
}

/// Reports of one invocation as a single document: the lone report itself,
/// or an array when several experiments ran.
pub fn json_document(mut reports: Vec<serde_json::Value>) -> serde_json::Value {
    if reports.len() == 1 {
        reports.remove(0)
    } else {
        serde_json::Value::Array(reports)
    }
}

/// Print the collected reports as one JSON document.
pub fn print_json(reports: Vec<serde_json::Value>) -> Result<()> {
    let document = json_document(reports);
    println!("{}", serde_json::to_string_pretty(&document).context("Failed to serialize report")?);
    Ok(())
}

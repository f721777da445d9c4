//! Caseflow - departmental metric synthesis and forecasting CLI
//!
//! ## Commands
//!
//! - `analyze`: Run the full engine over a CSV or JSON record table
//! - `grid`: Show the discovered departments and months only

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use caseflow_core::{
    records_from_json, write_report_json, write_summary_md, Engine, EngineConfig, RawRecord,
    METRICS,
};

#[derive(Parser)]
#[command(name = "caseflow")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Departmental metric synthesis and accuracy forecasting", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize metrics, aggregate departments and forecast trends
    Analyze {
        /// Record table (.csv or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Engine configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for the jitter generator
        #[arg(long)]
        seed: Option<u64>,

        /// Disable accuracy jitter for both models
        #[arg(long)]
        no_jitter: bool,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write a markdown summary
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// List the departments and months the engine would use
    Grid {
        /// Record table (.csv or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Engine configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    caseflow_core::init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Analyze {
            input,
            config,
            seed,
            no_jitter,
            output,
            summary,
        } => cmd_analyze(
            &input,
            config.as_deref(),
            seed,
            no_jitter,
            output.as_deref(),
            summary.as_deref(),
        ),
        Commands::Grid { input, config } => cmd_grid(&input, config.as_deref()),
    };

    METRICS.flush();
    result
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => EngineConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("Invalid CASEFLOW_* environment override")
}

fn cmd_analyze(
    input: &Path,
    config: Option<&Path>,
    seed: Option<u64>,
    no_jitter: bool,
    output: Option<&Path>,
    summary: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if no_jitter {
        config = config.without_jitter();
    }

    let records = read_records(input)?;
    info!(input = ?input, records = records.len(), "records loaded");

    let engine = Engine::new(config).context("Invalid engine configuration")?;
    let report = engine.run(&records)?;

    match output {
        Some(path) => {
            write_report_json(path, &report)?;
            println!("✓ Report written: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    if let Some(path) = summary {
        write_summary_md(path, &report)?;
        println!("✓ Summary written: {}", path.display());
    }
    Ok(())
}

fn cmd_grid(input: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let records = read_records(input)?;
    let engine = Engine::new(config).context("Invalid engine configuration")?;
    let grid = engine.extract(&records);

    println!("Departments ({}):", grid.departments.len());
    for department in &grid.departments {
        println!("  {}", department);
    }
    if grid.dropped_departments > 0 {
        println!(
            "  ({} more over the limit of {})",
            grid.dropped_departments,
            engine.config().department_limit
        );
    }
    println!("Months ({}):", grid.months.len());
    for month in &grid.months {
        println!("  {}", month);
    }
    Ok(())
}

/// Load records, choosing the format from the file extension.
fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => read_csv_records(path),
        Some("json") => read_json_records(path),
        _ => bail!("Unsupported input format (expected .csv or .json): {:?}", path),
    }
}

fn read_csv_records(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let headers = reader
        .headers()
        .with_context(|| format!("Missing CSV header in {:?}", path))?
        .clone();

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let line = result.with_context(|| format!("Invalid CSV row {} in {:?}", row + 1, path))?;
        let record: RawRecord = headers
            .iter()
            .zip(line.iter())
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();
        records.push(record);
    }
    Ok(records)
}

fn read_json_records(path: &Path) -> Result<Vec<RawRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))?;
    records_from_json(&value).with_context(|| format!("Malformed record table in {:?}", path))
}

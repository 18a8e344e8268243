use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rowsift::config::{self, PartitionOptions};
use rowsift::pipeline;
use rowsift::{Result, SiftError};
use tracing::info;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if !cli.config.exists() {
        return Err(SiftError::MissingInput(cli.config));
    }

    let defaults = PartitionOptions::default();
    let options = PartitionOptions {
        lower_case_except_file_zone: !cli.lower_case_file_zone,
        criteria_exceptions: cli
            .keep_case_columns
            .map(|columns| columns.into_iter().collect::<HashSet<_>>())
            .unwrap_or(defaults.criteria_exceptions),
        mapping_exceptions: defaults.mapping_exceptions,
    };

    let tables = config::load_config(&cli.config, &cli.sheet, &cli.base_path, &options);
    if tables.is_empty() {
        return Err(SiftError::EmptyConfiguration(cli.config));
    }

    let outcomes = pipeline::run_removal(&tables, &cli.base_path)?;

    let written = outcomes
        .iter()
        .filter(|outcome| matches!(outcome.status, rowsift::model::FileStatus::Written { .. }))
        .count();
    info!(total = outcomes.len(), written, "run finished");

    if let Some(report) = cli.report {
        let json = serde_json::to_string_pretty(&outcomes)?;
        fs::write(report, json)?;
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Filter configured tabular files into multi-sheet workbooks."
)]
struct Cli {
    /// Configuration workbook path.
    #[arg(long)]
    config: PathBuf,

    /// Configuration sheet name.
    #[arg(long)]
    sheet: String,

    /// Filesystem root that relative configuration paths resolve against.
    #[arg(long, default_value = ".")]
    base_path: PathBuf,

    /// Criteria columns whose values keep their original casing.
    /// Defaults to `criteria_value`.
    #[arg(long = "keep-case-column", value_name = "COLUMN")]
    keep_case_columns: Option<Vec<String>>,

    /// Also lower-case file-zone cells instead of only trimming them.
    #[arg(long)]
    lower_case_file_zone: bool,

    /// Optional path for a JSON report of per-file outcomes.
    #[arg(long)]
    report: Option<PathBuf>,
}

//! Command-line surface for script-driven test runners.
//!
//! Runners that shell out instead of linking the library get the same three
//! session triggers: `clean` before a session, `render` after it (exit
//! status zero suppresses generation), and `inspect` to look at captured
//! records without writing anything.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{FsError, FsResult};
use crate::model::FailureRecord;

#[derive(Debug, Parser)]
#[command(name = "failscribe")]
#[command(about = "Render captured test failures into standalone markdown reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Remove previously generated reports (session-start trigger).
    Clean(CleanArgs),
    /// Render one report per captured failure (session-finish trigger).
    Render(RenderArgs),
    /// Show captured records without writing reports.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Report output directory.
    #[arg(long, default_value = "test_failures")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Captured failure records, NDJSON (one record per line) or a JSON array.
    #[arg(long)]
    pub records: PathBuf,

    /// Report output directory.
    #[arg(long, default_value = "test_failures")]
    pub out: PathBuf,

    /// Test session exit status; zero suppresses report generation.
    #[arg(long, default_value_t = 1)]
    pub exit_status: i32,

    /// Maximum retained failure records.
    #[arg(long, default_value_t = 500)]
    pub max_failures: usize,

    /// Maximum retained passed records.
    #[arg(long, default_value_t = 100)]
    pub max_passed: usize,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Captured failure records, NDJSON (one record per line) or a JSON array.
    #[arg(long)]
    pub records: PathBuf,

    #[arg(long, value_enum, default_value_t = InspectFormat::Plain)]
    pub format: InspectFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectFormat {
    Plain,
    Json,
    Ndjson,
}

/// Load failure records from an NDJSON file (or a single JSON array).
///
/// A malformed NDJSON line is logged and skipped — one bad record never
/// aborts the batch. A non-empty file that yields no records at all is an
/// error, since silently rendering nothing would hide the problem.
pub fn load_records(path: &Path) -> FsResult<Vec<FailureRecord>> {
    let raw = std::fs::read_to_string(path)?;
    let trimmed = raw.trim_start();

    if trimmed.starts_with('[') {
        let records: Vec<FailureRecord> = serde_json::from_str(trimmed)?;
        return Ok(records);
    }

    let mut records = Vec::new();
    let mut saw_content = false;
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        saw_content = true;
        match serde_json::from_str::<FailureRecord>(line) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(line = index + 1, %error, "skipping malformed record");
            }
        }
    }

    if saw_content && records.is_empty() {
        return Err(FsError::InvalidRecord(format!(
            "no parseable records in `{}`",
            path.display()
        )));
    }
    Ok(records)
}

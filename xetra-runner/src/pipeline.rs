//! The daily report pipeline: select → extract → transform → load.
//!
//! Two entry points:
//! - `run_etl()`: full run, writes the report to the target store. Used by CLI `run`.
//! - `dry_run()`: same stages without the write. Used by CLI `run --dry-run`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xetra_core::{
    select_partitions, transform_with_stats, DailyReport, ObjectStore, SelectError, StoreError,
    TransformError, TransformStats,
};

use crate::config::{ConfigError, RunConfig};
use crate::extract::{ExtractError, Extractor};
use crate::load::{LoadError, Loader};

/// Errors from the pipeline. All of them abort the run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("partition selection: {0}")]
    Select(#[from] SelectError),
    #[error("list source partitions: {0}")]
    Catalog(#[from] StoreError),
    #[error("extract: {0}")]
    Extract(#[from] ExtractError),
    #[error("transform: {0}")]
    Transform(#[from] TransformError),
    #[error("load: {0}")]
    Load(#[from] LoadError),
}

/// What one run did, for logs and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub target_date: NaiveDate,
    /// Source partitions read, including the look-back day.
    pub partitions: usize,
    pub stats: TransformStats,
    /// BLAKE3 hash of the report rows; equal for identical input.
    pub report_hash: String,
    /// Key written, `None` for a dry run.
    pub report_key: Option<String>,
}

/// A report built in memory, not yet written.
#[derive(Debug, Clone)]
pub struct BuiltReport {
    pub target_date: NaiveDate,
    pub partitions: Vec<String>,
    pub report: DailyReport,
    pub stats: TransformStats,
}

impl BuiltReport {
    fn summary(&self, report_key: Option<String>) -> RunSummary {
        RunSummary {
            target_date: self.target_date,
            partitions: self.partitions.len(),
            stats: self.stats,
            report_hash: self.report.content_hash(),
            report_key,
        }
    }
}

/// Source keys eligible for the configured target date.
pub fn source_partitions(
    config: &RunConfig,
    source: &dyn ObjectStore,
) -> Result<Vec<String>, RunError> {
    let catalog = source.list("")?;
    Ok(select_partitions(
        &config.target_date,
        &config.source_date_format,
        &catalog,
    )?)
}

/// Select, extract and transform. Nothing is written.
pub fn build_report(config: &RunConfig, source: &dyn ObjectStore) -> Result<BuiltReport, RunError> {
    config.validate()?;
    let target_date = config.parsed_target_date()?;

    let partitions = source_partitions(config, source)?;
    if partitions.is_empty() {
        tracing::warn!(
            store = source.name(),
            %target_date,
            "no source partitions on or after the look-back day"
        );
    }

    let table = Extractor::new(source, &config.columns, config.delimiter_byte()?)
        .extract(&partitions)?;
    let (report, stats) = transform_with_stats(&table, &config.columns, target_date)?;

    Ok(BuiltReport {
        target_date,
        partitions,
        report,
        stats,
    })
}

/// Run the whole job and write the report under a key stamped with `run_at`.
pub fn run_etl(
    config: &RunConfig,
    source: &dyn ObjectStore,
    target: &dyn ObjectStore,
    run_at: NaiveDateTime,
) -> Result<RunSummary, RunError> {
    tracing::info!(target_date = %config.target_date, "starting daily report run");
    let built = build_report(config, source)?;
    let key = Loader::new(target, &config.report).load(&built.report, run_at)?;
    let summary = built.summary(Some(key));
    tracing::info!(
        rows = summary.stats.rows_out,
        hash = %summary.report_hash,
        "daily report run complete"
    );
    Ok(summary)
}

/// Run every stage except the write.
pub fn dry_run(config: &RunConfig, source: &dyn ObjectStore) -> Result<RunSummary, RunError> {
    let built = build_report(config, source)?;
    Ok(built.summary(None))
}

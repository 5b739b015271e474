//! Xetra Runner — configuration and orchestration of the daily report job.
//!
//! This crate builds on `xetra-core` to provide:
//! - TOML run configuration with Xetra defaults
//! - The extract stage (partition fetch + concatenation)
//! - The load stage (Parquet encode + timestamped put)
//! - `run_etl` / `dry_run`, the single parameterized pipeline

pub mod config;
pub mod extract;
pub mod load;
pub mod pipeline;

pub use config::{ConfigError, ReportConfig, RunConfig, StoreConfig};
pub use extract::{ExtractError, Extractor};
pub use load::{report_key, LoadError, Loader, REPORT_TIMESTAMP_FORMAT};
pub use pipeline::{
    build_report, dry_run, run_etl, source_partitions, BuiltReport, RunError, RunSummary,
};

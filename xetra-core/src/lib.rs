//! Xetra Core — tick domain types, CSV decoding, daily aggregation, report codec.
//!
//! This crate contains everything the daily report job needs that does not
//! depend on run configuration:
//! - Domain types (ticks, daily summaries, the report)
//! - Tick table decoding from CSV partitions
//! - Parquet encoding/decoding of the daily report
//! - The aggregator: open/close derivation, group rollup, lagged change
//! - Partition selection by date prefix
//! - The object store gateway trait with in-memory and directory backends

pub mod data;
pub mod domain;
pub mod select;
pub mod store;
pub mod transform;

pub use data::{SourceColumns, TickTable};
pub use domain::{DailyReport, DailySummary, Tick};
pub use select::{select_date_range, select_partitions, SelectError};
pub use store::{InMemoryStore, LocalStore, ObjectStore, StoreError};
pub use transform::{transform, transform_with_stats, TransformError, TransformStats};

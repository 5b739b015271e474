//! Load stage: encode the report and store it under a timestamped key.

use chrono::NaiveDateTime;
use thiserror::Error;
use xetra_core::data::{encode_report, ReportCodecError};
use xetra_core::{DailyReport, ObjectStore, StoreError};

use crate::config::ReportConfig;

/// Second-precision run timestamp embedded in report keys.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("encode report: {0}")]
    Encode(#[from] ReportCodecError),

    #[error("write '{key}': {source}")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },
}

/// `<prefix><YYYYMMDD_HHMMSS>.<extension>`.
///
/// Two runs in the same second produce the same key; the later one wins.
pub fn report_key(config: &ReportConfig, run_at: NaiveDateTime) -> String {
    format!(
        "{}{}.{}",
        config.key_prefix,
        run_at.format(REPORT_TIMESTAMP_FORMAT),
        config.extension.trim_start_matches('.')
    )
}

/// Writes daily reports to a target store.
pub struct Loader<'a> {
    store: &'a dyn ObjectStore,
    config: &'a ReportConfig,
}

impl<'a> Loader<'a> {
    pub fn new(store: &'a dyn ObjectStore, config: &'a ReportConfig) -> Self {
        Self { store, config }
    }

    /// Encode `report` fully in memory, then store it with a single put.
    /// Returns the key written. Empty reports are written too.
    pub fn load(&self, report: &DailyReport, run_at: NaiveDateTime) -> Result<String, LoadError> {
        let key = report_key(self.config, run_at);
        let bytes = encode_report(report)?;
        let size = bytes.len();

        self.store
            .put(&key, bytes)
            .map_err(|source| LoadError::Store {
                key: key.clone(),
                source,
            })?;

        tracing::info!(
            store = self.store.name(),
            key = %key,
            rows = report.len(),
            bytes = size,
            "wrote daily report"
        );
        Ok(key)
    }

    /// Report keys currently in the target store, oldest first.
    pub fn list_reports(&self) -> Result<Vec<String>, StoreError> {
        let suffix = format!(".{}", self.config.extension.trim_start_matches('.'));
        let mut keys = self.store.list(&self.config.key_prefix)?;
        keys.retain(|k| k.ends_with(&suffix));
        Ok(keys)
    }
}

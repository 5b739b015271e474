//! Extract stage: fetch source partitions and concatenate them.

use thiserror::Error;
use xetra_core::data::{decode_ticks, CsvError, SchemaMismatch};
use xetra_core::{ObjectStore, SourceColumns, StoreError, TickTable};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("read '{key}': {source}")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("decode '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: CsvError,
    },

    #[error("partition '{key}' lacks required column '{column}'")]
    MissingColumn { key: String, column: String },

    #[error("partition '{key}': {source}")]
    SchemaMismatch {
        key: String,
        #[source]
        source: SchemaMismatch,
    },
}

/// Reads tick partitions from a source store into one unified table.
pub struct Extractor<'a> {
    store: &'a dyn ObjectStore,
    columns: &'a SourceColumns,
    delimiter: u8,
}

impl<'a> Extractor<'a> {
    pub fn new(store: &'a dyn ObjectStore, columns: &'a SourceColumns, delimiter: u8) -> Self {
        Self {
            store,
            columns,
            delimiter,
        }
    }

    /// Fetch every key in order and concatenate the rows.
    ///
    /// Every partition must carry the required columns and share the first
    /// partition's header exactly. Any read or decode failure aborts.
    pub fn extract(&self, keys: &[String]) -> Result<TickTable, ExtractError> {
        let mut unified = TickTable::default();

        for key in keys {
            let part = self.fetch(key)?;
            tracing::debug!(key = %key, rows = part.len(), "read partition");
            unified
                .append(part)
                .map_err(|source| ExtractError::SchemaMismatch {
                    key: key.clone(),
                    source,
                })?;
        }

        tracing::info!(
            store = self.store.name(),
            partitions = keys.len(),
            rows = unified.len(),
            "extracted tick table"
        );
        Ok(unified)
    }

    /// Fetch and decode a single partition.
    pub fn fetch(&self, key: &str) -> Result<TickTable, ExtractError> {
        let bytes = self.store.get(key).map_err(|source| ExtractError::Store {
            key: key.to_string(),
            source,
        })?;
        let table =
            decode_ticks(&bytes, self.delimiter).map_err(|source| ExtractError::Decode {
                key: key.to_string(),
                source,
            })?;
        if let Some(column) = self.columns.missing_from(table.header()) {
            return Err(ExtractError::MissingColumn {
                key: key.to_string(),
                column: column.to_string(),
            });
        }
        Ok(table)
    }
}

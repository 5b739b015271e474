//! Tick table decoding and report serialization

pub mod parquet;
pub mod schema;
pub mod table;
pub mod ticks;

pub use parquet::{decode_report, encode_report, report_to_dataframe, ReportCodecError};
pub use schema::{ReportSchema, SchemaError, SourceColumns};
pub use table::{SchemaMismatch, TickTable};
pub use ticks::{decode_ticks, CsvError};

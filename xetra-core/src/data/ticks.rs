use csv::ReaderBuilder;

use super::table::TickTable;

/// Errors decoding a tick CSV partition.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("partition has no header row")]
    MissingHeader,

    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),
}

/// Decode one CSV partition into a tick table.
///
/// The first row is the header. Every record must have as many fields as
/// the header; fields are kept as text and typed later during projection.
pub fn decode_ticks(bytes: &[u8], delimiter: u8) -> Result<TickTable, CsvError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if header.iter().all(|h| h.is_empty()) {
        return Err(CsvError::MissingHeader);
    }

    let mut table = TickTable::new(header);
    for record in reader.records() {
        table.push_row(record?);
    }
    Ok(table)
}

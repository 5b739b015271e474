//! The unified tick table: raw CSV records from one or more partitions.

use csv::StringRecord;

/// Raw tick rows with the header they were read under.
///
/// Rows are kept as read: no projection, no typing. Row order is the order
/// partitions were appended, then file order within a partition; the
/// aggregator relies on it to break ties between ticks with equal time.
#[derive(Debug, Clone, Default)]
pub struct TickTable {
    header: Vec<String>,
    rows: Vec<StringRecord>,
}

/// Two partitions disagree on their column layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "header mismatch: expected [{}], found [{}]",
    .expected.join(", "),
    .found.join(", ")
)]
pub struct SchemaMismatch {
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

impl TickTable {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(header: Vec<String>, rows: Vec<StringRecord>) -> Self {
        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True for the table of an empty run: no header, no rows.
    pub fn is_blank(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    pub fn push_row(&mut self, record: StringRecord) {
        self.rows.push(record);
    }

    /// Position of a column in the header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Append another partition's rows after this table's rows.
    ///
    /// A blank table adopts the other table's header. Otherwise headers must
    /// match exactly, column order included.
    pub fn append(&mut self, other: TickTable) -> Result<(), SchemaMismatch> {
        if self.is_blank() {
            *self = other;
            return Ok(());
        }
        if self.header != other.header {
            return Err(SchemaMismatch {
                expected: self.header.clone(),
                found: other.header,
            });
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Row-wise concatenation of several partitions.
    pub fn concat(parts: impl IntoIterator<Item = TickTable>) -> Result<Self, SchemaMismatch> {
        let mut out = TickTable::default();
        for part in parts {
            out.append(part)?;
        }
        Ok(out)
    }
}

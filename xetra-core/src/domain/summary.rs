//! Daily summary rows and the report that collects them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row per (ISIN, date): OHLC, volume and change vs. the previous close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub isin: String,
    pub date: NaiveDate,
    pub opening_price_eur: f64,
    pub closing_price_eur: f64,
    pub minimum_price_eur: f64,
    pub maximum_price_eur: f64,
    pub daily_traded_volume: u64,
    /// Percent change vs. the previous available close of the same ISIN.
    /// `None` when there is no earlier row or the previous close is zero.
    #[serde(rename = "change_prev_closing_%")]
    pub change_prev_closing_pct: Option<f64>,
}

/// The immutable result of one aggregation run, sorted by (ISIN, date).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    rows: Vec<DailySummary>,
}

impl DailyReport {
    /// Build a report, ordering rows by (ISIN, date).
    pub fn new(mut rows: Vec<DailySummary>) -> Self {
        rows.sort_by(|a, b| a.isin.cmp(&b.isin).then(a.date.cmp(&b.date)));
        Self { rows }
    }

    pub fn rows(&self) -> &[DailySummary] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<DailySummary> {
        self.rows
    }

    /// Row for a given ISIN and date, if present.
    pub fn get(&self, isin: &str, date: NaiveDate) -> Option<&DailySummary> {
        self.rows
            .binary_search_by(|r| r.isin.as_str().cmp(isin).then(r.date.cmp(&date)))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Distinct ISINs in the report, in order.
    pub fn isins(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            if out.last() != Some(&row.isin.as_str()) {
                out.push(&row.isin);
            }
        }
        out
    }

    /// Earliest and latest date covered, or `None` for an empty report.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|r| r.date).min()?;
        let max = self.rows.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// BLAKE3 hash over every field of every row, hex encoded.
    ///
    /// Floats are hashed by bit pattern, so two reports hash equal only if
    /// they are bit-identical.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for row in &self.rows {
            hasher.update(row.isin.as_bytes());
            hasher.update(&[0]);
            hasher.update(row.date.to_string().as_bytes());
            hasher.update(&row.opening_price_eur.to_bits().to_le_bytes());
            hasher.update(&row.closing_price_eur.to_bits().to_le_bytes());
            hasher.update(&row.minimum_price_eur.to_bits().to_le_bytes());
            hasher.update(&row.maximum_price_eur.to_bits().to_le_bytes());
            hasher.update(&row.daily_traded_volume.to_le_bytes());
            match row.change_prev_closing_pct {
                Some(v) => {
                    hasher.update(&[1]);
                    hasher.update(&v.to_bits().to_le_bytes());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl<'a> IntoIterator for &'a DailyReport {
    type Item = &'a DailySummary;
    type IntoIter = std::slice::Iter<'a, DailySummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

//! Parquet codec for the daily report.
//!
//! Encoding happens fully in memory so the loader can hand a complete
//! object to a single `put`; a failed encode never reaches the store.

use std::io::Cursor;

use chrono::NaiveDate;
use polars::prelude::*;

use super::schema::{ReportSchema, SchemaError};
use crate::domain::{DailyReport, DailySummary};

#[derive(Debug, thiserror::Error)]
pub enum ReportCodecError {
    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("report schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("null {column} at row {row}")]
    NullValue { column: &'static str, row: usize },
}

/// 1970-01-01, the origin of Polars' `Date` physical representation.
fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Convert a report to a Polars DataFrame with the report schema.
pub fn report_to_dataframe(report: &DailyReport) -> Result<DataFrame, ReportCodecError> {
    let rows = report.rows();
    let epoch = epoch();

    let isins: Vec<&str> = rows.iter().map(|r| r.isin.as_str()).collect();
    let dates: Vec<i32> = rows
        .iter()
        .map(|r| (r.date - epoch).num_days() as i32)
        .collect();
    let opens: Vec<f64> = rows.iter().map(|r| r.opening_price_eur).collect();
    let closes: Vec<f64> = rows.iter().map(|r| r.closing_price_eur).collect();
    let mins: Vec<f64> = rows.iter().map(|r| r.minimum_price_eur).collect();
    let maxs: Vec<f64> = rows.iter().map(|r| r.maximum_price_eur).collect();
    let volumes: Vec<u64> = rows.iter().map(|r| r.daily_traded_volume).collect();
    let changes: Vec<Option<f64>> = rows.iter().map(|r| r.change_prev_closing_pct).collect();

    DataFrame::new(vec![
        Column::new(ReportSchema::ISIN.into(), isins),
        Column::new(ReportSchema::DATE.into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| ReportCodecError::Parquet(format!("date cast: {e}")))?,
        Column::new(ReportSchema::OPENING_PRICE.into(), opens),
        Column::new(ReportSchema::CLOSING_PRICE.into(), closes),
        Column::new(ReportSchema::MINIMUM_PRICE.into(), mins),
        Column::new(ReportSchema::MAXIMUM_PRICE.into(), maxs),
        Column::new(ReportSchema::TRADED_VOLUME.into(), volumes),
        Column::new(ReportSchema::CHANGE_PREV_CLOSING.into(), changes),
    ])
    .map_err(|e| ReportCodecError::Parquet(format!("dataframe creation: {e}")))
}

/// Encode a report as a Parquet file in memory.
pub fn encode_report(report: &DailyReport) -> Result<Vec<u8>, ReportCodecError> {
    let mut df = report_to_dataframe(report)?;
    let mut buf = Vec::new();
    ParquetWriter::new(&mut buf)
        .finish(&mut df)
        .map_err(|e| ReportCodecError::Parquet(format!("write parquet: {e}")))?;
    Ok(buf)
}

/// Decode a Parquet report written by [`encode_report`].
pub fn decode_report(bytes: &[u8]) -> Result<DailyReport, ReportCodecError> {
    let df = ParquetReader::new(Cursor::new(bytes))
        .finish()
        .map_err(|e| ReportCodecError::Parquet(format!("read: {e}")))?;
    ReportSchema::validate(&df)?;
    dataframe_to_report(&df)
}

/// Convert a DataFrame with the report schema back to summary rows.
fn dataframe_to_report(df: &DataFrame) -> Result<DailyReport, ReportCodecError> {
    let map_err = |e: PolarsError| ReportCodecError::Parquet(format!("column read: {e}"));

    let isin_ca = df.column(ReportSchema::ISIN).map_err(map_err)?.str().map_err(map_err)?;
    let date_ca = df.column(ReportSchema::DATE).map_err(map_err)?.date().map_err(map_err)?;
    let open_ca = df
        .column(ReportSchema::OPENING_PRICE)
        .map_err(map_err)?
        .f64()
        .map_err(map_err)?;
    let close_ca = df
        .column(ReportSchema::CLOSING_PRICE)
        .map_err(map_err)?
        .f64()
        .map_err(map_err)?;
    let min_ca = df
        .column(ReportSchema::MINIMUM_PRICE)
        .map_err(map_err)?
        .f64()
        .map_err(map_err)?;
    let max_ca = df
        .column(ReportSchema::MAXIMUM_PRICE)
        .map_err(map_err)?
        .f64()
        .map_err(map_err)?;
    let vol_ca = df
        .column(ReportSchema::TRADED_VOLUME)
        .map_err(map_err)?
        .u64()
        .map_err(map_err)?;
    let change_ca = df
        .column(ReportSchema::CHANGE_PREV_CLOSING)
        .map_err(map_err)?
        .f64()
        .map_err(map_err)?;

    let epoch = epoch();
    let n = df.height();
    let mut rows = Vec::with_capacity(n);

    let null_at = |column: &'static str, row: usize| ReportCodecError::NullValue { column, row };

    for i in 0..n {
        let days = date_ca.get(i).ok_or_else(|| null_at(ReportSchema::DATE, i))?;
        rows.push(DailySummary {
            isin: isin_ca
                .get(i)
                .ok_or_else(|| null_at(ReportSchema::ISIN, i))?
                .to_string(),
            date: epoch + chrono::Duration::days(days as i64),
            opening_price_eur: open_ca
                .get(i)
                .ok_or_else(|| null_at(ReportSchema::OPENING_PRICE, i))?,
            closing_price_eur: close_ca
                .get(i)
                .ok_or_else(|| null_at(ReportSchema::CLOSING_PRICE, i))?,
            minimum_price_eur: min_ca
                .get(i)
                .ok_or_else(|| null_at(ReportSchema::MINIMUM_PRICE, i))?,
            maximum_price_eur: max_ca
                .get(i)
                .ok_or_else(|| null_at(ReportSchema::MAXIMUM_PRICE, i))?,
            daily_traded_volume: vol_ca
                .get(i)
                .ok_or_else(|| null_at(ReportSchema::TRADED_VOLUME, i))?,
            change_prev_closing_pct: change_ca.get(i),
        });
    }

    Ok(DailyReport::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> DailyReport {
        DailyReport::new(vec![
            DailySummary {
                isin: "DE0005190003".into(),
                date: NaiveDate::from_ymd_opt(2021, 5, 10).unwrap(),
                opening_price_eur: 101.5,
                closing_price_eur: 102.25,
                minimum_price_eur: 100.9,
                maximum_price_eur: 103.0,
                daily_traded_volume: 48_211,
                change_prev_closing_pct: Some(0.74),
            },
            DailySummary {
                isin: "US0378331005".into(),
                date: NaiveDate::from_ymd_opt(2021, 5, 10).unwrap(),
                opening_price_eur: 107.0,
                closing_price_eur: 106.4,
                minimum_price_eur: 106.1,
                maximum_price_eur: 107.2,
                daily_traded_volume: 310,
                change_prev_closing_pct: None,
            },
        ])
    }

    #[test]
    fn dataframe_matches_report_schema() {
        let df = report_to_dataframe(&sample_report()).unwrap();
        assert_eq!(df.height(), 2);
        assert!(ReportSchema::validate(&df).is_ok());
        assert_eq!(
            df.column(ReportSchema::CHANGE_PREV_CLOSING)
                .unwrap()
                .null_count(),
            1
        );
    }

    #[test]
    fn encode_then_decode_preserves_rows() {
        let report = sample_report();
        let bytes = encode_report(&report).unwrap();
        let decoded = decode_report(&bytes).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn empty_report_still_carries_schema() {
        let bytes = encode_report(&DailyReport::default()).unwrap();
        assert!(!bytes.is_empty());
        let decoded = decode_report(&bytes).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn decode_rejects_non_parquet_bytes() {
        let err = decode_report(b"ISIN,Date\nX1,2021-05-10\n").unwrap_err();
        assert!(matches!(err, ReportCodecError::Parquet(_)));
    }
}

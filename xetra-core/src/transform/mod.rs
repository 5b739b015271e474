//! Daily aggregation: unified tick table → daily report.
//!
//! Stages, in order:
//! 1. [`project`]: required columns only, rows with nulls dropped
//! 2. [`sort_within_groups`]: (ISIN, date, time), stable
//! 3. [`rollup`]: one row per (ISIN, date): open, close, min, max, volume
//! 4. [`sort_by_security_date`] + [`apply_percent_change`]: one-row lag per ISIN
//! 5. [`round_prices`]: 2 decimals
//! 6. [`filter_from`]: drop rows before the target date
//!
//! Missing previous closes and empty input are data, not errors.

pub mod change;
pub mod project;
pub mod rollup;

pub use change::{
    apply_percent_change, filter_from, percent_change, previous_closes, round2, round_prices,
    sort_by_security_date,
};
pub use project::{project, Projection, TICK_DATE_FORMAT};
pub use rollup::{rollup, sort_within_groups};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{SourceColumns, TickTable};
use crate::domain::DailyReport;

/// Input-shape errors found while typing and rolling up the tick table.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("invalid {column} value '{value}' at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("traded volume of {isin} on {date} overflows u64")]
    VolumeOverflow { isin: String, date: NaiveDate },
}

/// Row counts through the stages of one aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformStats {
    /// Rows in the unified tick table.
    pub rows_in: usize,
    /// Rows dropped for a null in a required column.
    pub rows_dropped: usize,
    /// (ISIN, date) groups before the date filter.
    pub groups: usize,
    /// Rows in the final report.
    pub rows_out: usize,
}

/// Aggregate ticks into daily summaries dated on or after `target_date`.
pub fn transform(
    table: &TickTable,
    columns: &SourceColumns,
    target_date: NaiveDate,
) -> Result<DailyReport, TransformError> {
    transform_with_stats(table, columns, target_date).map(|(report, _)| report)
}

/// [`transform`], also returning row counts for each stage.
pub fn transform_with_stats(
    table: &TickTable,
    columns: &SourceColumns,
    target_date: NaiveDate,
) -> Result<(DailyReport, TransformStats), TransformError> {
    let Projection { mut ticks, dropped } = project(table, columns)?;
    tracing::debug!(rows = table.len(), dropped, "projected tick table");

    sort_within_groups(&mut ticks);
    let mut daily = rollup(&ticks)?;
    let groups = daily.len();

    sort_by_security_date(&mut daily);
    apply_percent_change(&mut daily);
    round_prices(&mut daily);
    let report = DailyReport::new(filter_from(daily, target_date));

    let stats = TransformStats {
        rows_in: table.len(),
        rows_dropped: dropped,
        groups,
        rows_out: report.len(),
    };
    tracing::debug!(?stats, %target_date, "aggregated daily summaries");
    Ok((report, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::decode_ticks;

    const HEADER: &str = "ISIN,Date,Time,StartPrice,MaxPrice,MinPrice,EndPrice,TradedVolume\n";

    fn table(body: &str) -> TickTable {
        decode_ticks(format!("{HEADER}{body}").as_bytes(), b',').unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 5, day).unwrap()
    }

    fn run(body: &str, target_day: u32) -> DailyReport {
        transform(&table(body), &SourceColumns::default(), date(target_day)).unwrap()
    }

    #[test]
    fn reference_scenario() {
        let report = run(
            "X1,2021-05-07,17:30,9.00,9.10,8.90,9.00,10\n\
             X1,2021-05-08,10:00,10.50,10.60,10.40,10.50,200\n\
             X1,2021-05-08,09:00,10.00,10.20,9.90,10.00,100\n\
             X1,2021-05-08,16:30,9.80,10.00,9.70,9.80,150\n",
            8,
        );

        assert_eq!(report.len(), 1);
        let row = &report.rows()[0];
        assert_eq!(row.date, date(8));
        assert_eq!(row.opening_price_eur, 10.0);
        assert_eq!(row.closing_price_eur, 9.8);
        assert_eq!(row.minimum_price_eur, 9.7);
        assert_eq!(row.maximum_price_eur, 10.6);
        assert_eq!(row.daily_traded_volume, 450);
        assert_eq!(row.change_prev_closing_pct, Some(8.89));
    }

    #[test]
    fn row_missing_start_price_does_not_contribute() {
        let report = run(
            "X1,2021-05-08,08:00,,99.00,0.01,50.00,100000\n\
             X1,2021-05-08,09:00,10.00,10.20,9.90,10.00,100\n\
             X1,2021-05-08,17:00,10.40,10.50,10.30,10.40,5\n",
            8,
        );
        let row = &report.rows()[0];
        assert_eq!(row.opening_price_eur, 10.0);
        assert_eq!(row.minimum_price_eur, 9.9);
        assert_eq!(row.maximum_price_eur, 10.5);
        assert_eq!(row.daily_traded_volume, 105);
    }

    #[test]
    fn single_tick_opens_and_closes() {
        let report = run("X1,2021-05-08,12:00,7.25,7.30,7.20,7.28,3\n", 8);
        let row = &report.rows()[0];
        assert_eq!(row.opening_price_eur, 7.25);
        assert_eq!(row.closing_price_eur, 7.25);
    }

    #[test]
    fn first_date_of_security_has_no_change() {
        let report = run(
            "X1,2021-05-08,09:00,10.00,10.00,10.00,10.00,1\n\
             X1,2021-05-09,09:00,11.00,11.00,11.00,11.00,1\n\
             X2,2021-05-09,09:00,5.00,5.00,5.00,5.00,1\n",
            8,
        );
        assert_eq!(report.get("X1", date(8)).unwrap().change_prev_closing_pct, None);
        assert_eq!(
            report.get("X1", date(9)).unwrap().change_prev_closing_pct,
            Some(10.0)
        );
        assert_eq!(report.get("X2", date(9)).unwrap().change_prev_closing_pct, None);
    }

    #[test]
    fn lookback_rows_are_excluded_but_feed_the_change() {
        let report = run(
            "X1,2021-05-07,09:00,20.00,20.00,20.00,20.00,1\n\
             X1,2021-05-08,09:00,25.00,25.00,25.00,25.00,1\n",
            8,
        );
        assert_eq!(report.len(), 1);
        assert!(report.rows().iter().all(|r| r.date >= date(8)));
        assert_eq!(report.rows()[0].change_prev_closing_pct, Some(25.0));
    }

    #[test]
    fn ties_on_time_follow_partition_order() {
        let a = decode_ticks(
            format!("{HEADER}X1,2021-05-08,09:00,1.00,1,1,1,1\n").as_bytes(),
            b',',
        )
        .unwrap();
        let b = decode_ticks(
            format!("{HEADER}X1,2021-05-08,09:00,2.00,2,2,2,1\n").as_bytes(),
            b',',
        )
        .unwrap();
        let all = TickTable::concat([a, b]).unwrap();
        let report = transform(&all, &SourceColumns::default(), date(8)).unwrap();
        let row = &report.rows()[0];
        assert_eq!(row.opening_price_eur, 1.0);
        assert_eq!(row.closing_price_eur, 2.0);
    }

    #[test]
    fn zero_previous_close_yields_no_change() {
        let report = run(
            "X1,2021-05-07,09:00,0.00,0.00,0.00,0.00,1\n\
             X1,2021-05-08,09:00,3.00,3.00,3.00,3.00,1\n",
            8,
        );
        assert_eq!(report.rows()[0].change_prev_closing_pct, None);
    }

    #[test]
    fn zero_volume_is_not_an_error() {
        let report = run("X1,2021-05-08,09:00,3.00,3.00,3.00,3.00,0\n", 8);
        assert_eq!(report.rows()[0].daily_traded_volume, 0);
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = transform(&TickTable::default(), &SourceColumns::default(), date(8)).unwrap();
        assert!(report.is_empty());

        let header_only = run("", 8);
        assert!(header_only.is_empty());
    }

    #[test]
    fn stats_count_each_stage() {
        let (report, stats) = transform_with_stats(
            &table(
                "X1,2021-05-07,09:00,1,1,1,1,1\n\
                 X1,2021-05-08,09:00,1,1,1,1,1\n\
                 X1,2021-05-08,10:00,,1,1,1,1\n\
                 X2,2021-05-08,09:00,1,1,1,1,1\n",
            ),
            &SourceColumns::default(),
            date(8),
        )
        .unwrap();
        assert_eq!(
            stats,
            TransformStats {
                rows_in: 4,
                rows_dropped: 1,
                groups: 3,
                rows_out: 2,
            }
        );
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn rerun_is_bit_identical() {
        let t = table(
            "X2,2021-05-08,09:00,3.333,3.4,3.2,3.3,7\n\
             X1,2021-05-07,11:00,1.111,1.2,1.0,1.1,1\n\
             X1,2021-05-08,09:00,1.777,1.8,1.7,1.75,2\n",
        );
        let a = transform(&t, &SourceColumns::default(), date(8)).unwrap();
        let b = transform(&t, &SourceColumns::default(), date(8)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn half_cent_prices_round_to_even() {
        let report = run("X1,2021-05-08,09:00,14.125,14.375,13.625,14.125,1\n", 8);
        let row = &report.rows()[0];
        assert_eq!(
            (row.opening_price_eur, row.maximum_price_eur, row.minimum_price_eur),
            (14.12, 14.38, 13.62)
        );
    }

    #[test]
    fn daily_volume_overflow_aborts() {
        let body = format!(
            "X1,2021-05-08,09:00,1,1,1,1,{}\nX1,2021-05-08,10:00,1,1,1,1,1\n",
            u64::MAX
        );
        let err = transform(&table(&body), &SourceColumns::default(), date(8)).unwrap_err();
        assert!(matches!(err, TransformError::VolumeOverflow { .. }));
    }
}

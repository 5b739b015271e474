//! Day-over-day change, rounding and the final date filter.

use chrono::NaiveDate;

use crate::domain::DailySummary;

/// Order rows by ISIN, then date.
pub fn sort_by_security_date(rows: &mut [DailySummary]) {
    rows.sort_by(|a, b| a.isin.cmp(&b.isin).then(a.date.cmp(&b.date)));
}

/// Closing price of the preceding row of the same ISIN.
///
/// Rows must be sorted by [`sort_by_security_date`]. The lag is one row, not
/// one calendar day: a gap in dates still compares against the last date
/// present.
pub fn previous_closes(rows: &[DailySummary]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(rows.len());
    let mut prev: Option<&DailySummary> = None;
    for row in rows {
        out.push(
            prev.filter(|p| p.isin == row.isin)
                .map(|p| p.closing_price_eur),
        );
        prev = Some(row);
    }
    out
}

/// Percent change from `previous_close` to `close`.
///
/// `None` without a previous close, and `None` when the previous close is
/// zero or the result is otherwise not finite.
pub fn percent_change(close: f64, previous_close: Option<f64>) -> Option<f64> {
    let prev = previous_close?;
    if prev == 0.0 {
        return None;
    }
    let change = (close - prev) / prev * 100.0;
    change.is_finite().then_some(change)
}

/// Fill the change column from the lagged close.
pub fn apply_percent_change(rows: &mut [DailySummary]) {
    let prev = previous_closes(rows);
    for (row, prev) in rows.iter_mut().zip(prev) {
        row.change_prev_closing_pct = percent_change(row.closing_price_eur, prev);
    }
}

/// Round to 2 decimals, ties to even (14.125 → 14.12, 14.375 → 14.38).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Round every price column and the change to 2 decimals. Volume is exact.
pub fn round_prices(rows: &mut [DailySummary]) {
    for row in rows {
        row.opening_price_eur = round2(row.opening_price_eur);
        row.closing_price_eur = round2(row.closing_price_eur);
        row.minimum_price_eur = round2(row.minimum_price_eur);
        row.maximum_price_eur = round2(row.maximum_price_eur);
        row.change_prev_closing_pct = row.change_prev_closing_pct.map(round2);
    }
}

/// Keep rows dated on or after `from`; drops the look-back day.
pub fn filter_from(rows: Vec<DailySummary>, from: NaiveDate) -> Vec<DailySummary> {
    rows.into_iter().filter(|r| r.date >= from).collect()
}

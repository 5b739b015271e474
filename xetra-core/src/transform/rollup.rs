//! Intra-day ordering and the per-(ISIN, date) rollup.

use super::TransformError;
use crate::domain::{DailySummary, Tick};

/// Order ticks by (ISIN, date, time).
///
/// The sort is stable: ticks with equal time keep their table order, which
/// decides which of them opens or closes the day.
pub fn sort_within_groups(ticks: &mut [Tick]) {
    ticks.sort_by(|a, b| {
        a.isin
            .cmp(&b.isin)
            .then(a.date.cmp(&b.date))
            .then(a.time.cmp(&b.time))
    });
}

/// Collapse sorted ticks to one summary row per (ISIN, date).
///
/// Expects the output of [`sort_within_groups`]. The change column is left
/// empty; it is filled by the lag stage. A daily volume that does not fit in
/// `u64` is an error.
pub fn rollup(ticks: &[Tick]) -> Result<Vec<DailySummary>, TransformError> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < ticks.len() {
        let key = ticks[start].group_key();
        let mut end = start + 1;
        while end < ticks.len() && ticks[end].group_key() == key {
            end += 1;
        }
        out.extend(summarize(&ticks[start..end])?);
        start = end;
    }
    Ok(out)
}

/// Summary of one time-ordered group.
///
/// Open and close both come from the start price field: the first tick's
/// start price opens the day, the last tick's start price closes it.
fn summarize(group: &[Tick]) -> Result<Option<DailySummary>, TransformError> {
    let (Some(first), Some(last)) = (group.first(), group.last()) else {
        return Ok(None);
    };
    let volume = group
        .iter()
        .try_fold(0u64, |acc, t| acc.checked_add(t.traded_volume))
        .ok_or_else(|| TransformError::VolumeOverflow {
            isin: first.isin.clone(),
            date: first.date,
        })?;

    Ok(Some(DailySummary {
        isin: first.isin.clone(),
        date: first.date,
        opening_price_eur: first.start_price,
        closing_price_eur: last.start_price,
        minimum_price_eur: group
            .iter()
            .map(|t| t.min_price)
            .fold(f64::INFINITY, f64::min),
        maximum_price_eur: group
            .iter()
            .map(|t| t.max_price)
            .fold(f64::NEG_INFINITY, f64::max),
        daily_traded_volume: volume,
        change_prev_closing_pct: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn tick(isin: &str, day: u32, hm: (u32, u32), start: f64, volume: u64) -> Tick {
        Tick {
            isin: isin.into(),
            date: NaiveDate::from_ymd_opt(2021, 5, day).unwrap(),
            time: NaiveTime::from_hms_opt(hm.0, hm.1, 0).unwrap(),
            start_price: start,
            max_price: start + 1.0,
            min_price: start - 1.0,
            end_price: start,
            traded_volume: volume,
        }
    }

    #[test]
    fn sort_orders_by_isin_date_time() {
        let mut ticks = vec![
            tick("B", 8, (9, 0), 1.0, 1),
            tick("A", 8, (16, 0), 2.0, 1),
            tick("A", 7, (10, 0), 3.0, 1),
            tick("A", 8, (9, 0), 4.0, 1),
        ];
        sort_within_groups(&mut ticks);
        let starts: Vec<f64> = ticks.iter().map(|t| t.start_price).collect();
        assert_eq!(starts, vec![3.0, 4.0, 2.0, 1.0]);
    }

    #[test]
    fn equal_times_keep_table_order() {
        let mut ticks = vec![
            tick("A", 8, (9, 0), 1.0, 1),
            tick("A", 8, (9, 0), 2.0, 1),
            tick("A", 8, (9, 0), 3.0, 1),
        ];
        sort_within_groups(&mut ticks);
        let rows = rollup(&ticks).unwrap();
        assert_eq!(rows[0].opening_price_eur, 1.0);
        assert_eq!(rows[0].closing_price_eur, 3.0);
    }

    #[test]
    fn rollup_emits_one_row_per_group() {
        let mut ticks = vec![
            tick("A", 8, (9, 0), 10.0, 100),
            tick("A", 8, (17, 0), 12.0, 50),
            tick("A", 9, (9, 0), 11.0, 7),
            tick("B", 8, (9, 0), 5.0, 3),
        ];
        sort_within_groups(&mut ticks);
        let rows = rollup(&ticks).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].isin, "A");
        assert_eq!(rows[0].opening_price_eur, 10.0);
        assert_eq!(rows[0].closing_price_eur, 12.0);
        assert_eq!(rows[0].minimum_price_eur, 9.0);
        assert_eq!(rows[0].maximum_price_eur, 13.0);
        assert_eq!(rows[0].daily_traded_volume, 150);
        assert!(rows.iter().all(|r| r.change_prev_closing_pct.is_none()));
    }

    #[test]
    fn close_ignores_end_price() {
        let mut t = tick("A", 8, (9, 0), 10.0, 1);
        t.end_price = 99.0;
        let rows = rollup(&[t]).unwrap();
        assert_eq!(rows[0].closing_price_eur, 10.0);
    }

    #[test]
    fn empty_input_rolls_up_to_nothing() {
        assert!(rollup(&[]).unwrap().is_empty());
    }

    #[test]
    fn volume_overflow_is_an_error() {
        let ticks = vec![
            tick("A", 8, (9, 0), 1.0, u64::MAX),
            tick("A", 8, (10, 0), 1.0, 1),
        ];
        let err = rollup(&ticks).unwrap_err();
        assert!(matches!(err, TransformError::VolumeOverflow { isin, .. } if isin == "A"));
    }

    #[test]
    fn volume_at_the_limit_is_kept() {
        let ticks = vec![
            tick("A", 8, (9, 0), 1.0, u64::MAX - 1),
            tick("A", 8, (10, 0), 1.0, 1),
        ];
        assert_eq!(rollup(&ticks).unwrap()[0].daily_traded_volume, u64::MAX);
    }
}

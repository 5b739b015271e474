//! Partition selection by date-prefixed key.
//!
//! Source keys look like `2021-05-08/2021-05-08_BINS_XETR08.csv`: the first
//! path segment is the trading date in the configured source format.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("target date '{date}' does not match format '{format}': {source}")]
    InvalidTargetDate {
        date: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Parse a date string with a chrono format.
pub fn parse_date(date: &str, format: &str) -> Result<NaiveDate, SelectError> {
    NaiveDate::parse_from_str(date, format).map_err(|source| SelectError::InvalidTargetDate {
        date: date.to_string(),
        format: format.to_string(),
        source,
    })
}

/// The day whose close is needed to compute the target date's change.
pub fn lookback_date(target: NaiveDate) -> NaiveDate {
    target - Duration::days(1)
}

/// Date embedded in a key's leading segment, if it parses with `format`.
pub fn key_date(key: &str, format: &str) -> Option<NaiveDate> {
    let segment = key.split('/').next()?;
    NaiveDate::parse_from_str(segment, format).ok()
}

/// Keys whose embedded date is on or after the look-back day of `target_date`.
///
/// Keys without a parseable leading date are skipped. An empty result is a
/// valid, empty run.
pub fn select_partitions(
    target_date: &str,
    format: &str,
    catalog: &[String],
) -> Result<Vec<String>, SelectError> {
    let min_date = lookback_date(parse_date(target_date, format)?);

    let mut selected = Vec::new();
    for key in catalog {
        match key_date(key, format) {
            Some(date) if date >= min_date => selected.push(key.clone()),
            Some(_) => {}
            None => tracing::warn!(key = %key, format, "skipping key without a leading date"),
        }
    }

    tracing::debug!(
        target_date,
        %min_date,
        catalog = catalog.len(),
        selected = selected.len(),
        "selected source partitions"
    );
    Ok(selected)
}

/// Keys whose embedded date is exactly one of `dates`.
pub fn select_date_range(
    dates: &[String],
    format: &str,
    catalog: &[String],
) -> Result<Vec<String>, SelectError> {
    let wanted = dates
        .iter()
        .map(|d| parse_date(d, format))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(catalog
        .iter()
        .filter(|key| key_date(key, format).is_some_and(|d| wanted.contains(&d)))
        .cloned()
        .collect())
}

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One trade print after projection: every required field present and typed.
///
/// `end_price` is carried through projection but never feeds the report;
/// open and close are both taken from `start_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub isin: String,
    pub date: NaiveDate,
    /// Intra-day time. Only used to order ticks within a day.
    pub time: NaiveTime,
    pub start_price: f64,
    pub max_price: f64,
    pub min_price: f64,
    pub end_price: f64,
    pub traded_volume: u64,
}

impl Tick {
    /// Grouping key for the daily rollup.
    pub fn group_key(&self) -> (&str, NaiveDate) {
        (self.isin.as_str(), self.date)
    }
}

//! Column projection and null filtering: raw CSV records → typed ticks.

use chrono::{NaiveDate, NaiveTime};

use super::TransformError;
use crate::data::{SourceColumns, TickTable};
use crate::domain::Tick;

/// Format of the `Date` column inside tick files.
pub const TICK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted formats of the `Time` column, tried in order.
const TICK_TIME_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];

/// Field values read as missing, in addition to the empty field.
const NULL_TOKENS: [&str; 6] = ["NA", "N/A", "NaN", "null", "NULL", "None"];

/// Typed ticks in table order, plus how many rows were dropped for nulls.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub ticks: Vec<Tick>,
    pub dropped: usize,
}

/// Keep only the required columns and drop every row with a null in any of
/// them. Non-null values that do not parse are an input error.
pub fn project(table: &TickTable, columns: &SourceColumns) -> Result<Projection, TransformError> {
    if table.is_blank() {
        return Ok(Projection::default());
    }

    let names = columns.required();
    let mut indices = [0usize; 8];
    for (slot, name) in indices.iter_mut().zip(names) {
        *slot = table
            .column_index(name)
            .ok_or_else(|| TransformError::MissingColumn(name.to_string()))?;
    }

    let mut ticks = Vec::with_capacity(table.len());
    let mut dropped = 0;

    for (row, record) in table.rows().iter().enumerate() {
        let mut fields = [""; 8];
        for (field, &idx) in fields.iter_mut().zip(&indices) {
            *field = record.get(idx).unwrap_or("").trim();
        }
        if fields.iter().any(|f| is_null(f)) {
            dropped += 1;
            continue;
        }

        let invalid = |col: usize| TransformError::InvalidValue {
            row,
            column: names[col].to_string(),
            value: fields[col].to_string(),
        };

        ticks.push(Tick {
            isin: fields[0].to_string(),
            date: NaiveDate::parse_from_str(fields[1], TICK_DATE_FORMAT).map_err(|_| invalid(1))?,
            time: parse_time(fields[2]).ok_or_else(|| invalid(2))?,
            start_price: parse_price(fields[3]).ok_or_else(|| invalid(3))?,
            max_price: parse_price(fields[4]).ok_or_else(|| invalid(4))?,
            min_price: parse_price(fields[5]).ok_or_else(|| invalid(5))?,
            end_price: parse_price(fields[6]).ok_or_else(|| invalid(6))?,
            traded_volume: parse_volume(fields[7]).ok_or_else(|| invalid(7))?,
        });
    }

    Ok(Projection { ticks, dropped })
}

fn is_null(field: &str) -> bool {
    field.is_empty() || NULL_TOKENS.contains(&field)
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    TICK_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

fn parse_price(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Volumes are integers, but some exports write them as `1452.0`.
fn parse_volume(s: &str) -> Option<u64> {
    s.parse::<u64>().ok().or_else(|| {
        let v = s.parse::<f64>().ok()?;
        (v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64).then_some(v as u64)
    })
}

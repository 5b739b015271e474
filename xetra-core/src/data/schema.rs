use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Names of the required source columns in the tick CSV files.
///
/// Defaults match the Deutsche Börse Xetra public data set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceColumns {
    pub isin: String,
    pub date: String,
    pub time: String,
    pub start_price: String,
    pub max_price: String,
    pub min_price: String,
    pub end_price: String,
    pub traded_volume: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            isin: "ISIN".into(),
            date: "Date".into(),
            time: "Time".into(),
            start_price: "StartPrice".into(),
            max_price: "MaxPrice".into(),
            min_price: "MinPrice".into(),
            end_price: "EndPrice".into(),
            traded_volume: "TradedVolume".into(),
        }
    }
}

impl SourceColumns {
    /// All required column names, in projection order.
    pub fn required(&self) -> [&str; 8] {
        [
            &self.isin,
            &self.date,
            &self.time,
            &self.start_price,
            &self.max_price,
            &self.min_price,
            &self.end_price,
            &self.traded_volume,
        ]
    }

    /// First required column that `header` lacks, if any.
    pub fn missing_from<'a>(&'a self, header: &[String]) -> Option<&'a str> {
        self.required()
            .into_iter()
            .find(|name| !header.iter().any(|h| h == name))
    }
}

/// Column layout of the Parquet daily report.
pub struct ReportSchema;

impl ReportSchema {
    pub const ISIN: &'static str = "ISIN";
    pub const DATE: &'static str = "Date";
    pub const OPENING_PRICE: &'static str = "opening_price_eur";
    pub const CLOSING_PRICE: &'static str = "closing_price_eur";
    pub const MINIMUM_PRICE: &'static str = "minimum_price_eur";
    pub const MAXIMUM_PRICE: &'static str = "maximum_price_eur";
    pub const TRADED_VOLUME: &'static str = "daily_traded_volume";
    pub const CHANGE_PREV_CLOSING: &'static str = "change_prev_closing_%";

    /// Get the canonical report schema
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new(Self::ISIN.into(), DataType::String),
            Field::new(Self::DATE.into(), DataType::Date),
            Field::new(Self::OPENING_PRICE.into(), DataType::Float64),
            Field::new(Self::CLOSING_PRICE.into(), DataType::Float64),
            Field::new(Self::MINIMUM_PRICE.into(), DataType::Float64),
            Field::new(Self::MAXIMUM_PRICE.into(), DataType::Float64),
            Field::new(Self::TRADED_VOLUME.into(), DataType::UInt64),
            Field::new(Self::CHANGE_PREV_CLOSING.into(), DataType::Float64),
        ])
    }

    /// Validate DataFrame against schema
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let expected = Self::schema();
        let actual = df.schema();

        for field in expected.iter_fields() {
            let actual_dtype = actual
                .get(field.name())
                .ok_or_else(|| SchemaError::MissingColumn(field.name().to_string()))?;
            if actual_dtype != field.dtype() {
                return Err(SchemaError::TypeMismatch {
                    column: field.name().to_string(),
                    expected: field.dtype().clone(),
                    actual: actual_dtype.clone(),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}

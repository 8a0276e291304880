use arrow_schema::ArrowError;
use chrono::NaiveDate;

use crate::structs::Parameter;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid month index {0}: expected 0-11")]
    InvalidMonth(u32),
    #[error("Dataset has no {0} series")]
    MissingSeries(Parameter),
    #[error("Malformed date key: {0:?} (expected YYYYMMDD)")]
    MalformedDateKey(String),
    #[error("At least one condition must be selected")]
    NoConditions,
    #[error("Date {date} is before today ({today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },
    #[error("Date {date} is beyond the prediction horizon ({limit})")]
    DateBeyondHorizon { date: NaiveDate, limit: NaiveDate },
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet Error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow Error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("Data Error: {0}")]
    Data(String),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

use crate::error::{EngineError, Result};
use crate::extract::read_power_json;
use crate::structs::{
    ConditionKind, ConditionResults, EngineConfig, MonthlyStat, Parameter, RawDataset,
    TREND_WINDOW_YEARS, YearlyTrend,
};
use crate::summary::generate_summary_with;
use crate::transform::{
    compute_monthly_stats_with, compute_probabilities_with, compute_yearly_trends_with,
};
use chrono::{Datelike, Months, NaiveDate};
use log::{debug, warn};
use serde::Serialize;
use std::path::Path;

/// How far ahead of today a request may target.
pub const PREDICTION_HORIZON_MONTHS: u32 = 6;

const SOURCE: &str = "NASA POWER API";
const MODEL: &str = "Threshold frequency analysis of historical daily observations";
const PREDICTION_METHOD: &str = "Statistical trend analysis with climate patterns";

/// A request for condition probabilities at one place and date.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: NaiveDate,
    pub conditions: Vec<ConditionKind>,
}

impl PredictionRequest {
    /// Checks that conditions were chosen and `date` lies between `today` and
    /// six months later, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoConditions`, `EngineError::DateInPast` or
    /// `EngineError::DateBeyondHorizon`.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if self.conditions.is_empty() {
            return Err(EngineError::NoConditions);
        }
        if self.date < today {
            return Err(EngineError::DateInPast {
                date: self.date,
                today,
            });
        }

        let limit = today
            .checked_add_months(Months::new(PREDICTION_HORIZON_MONTHS))
            .unwrap_or(NaiveDate::MAX);
        if self.date > limit {
            return Err(EngineError::DateBeyondHorizon {
                date: self.date,
                limit,
            });
        }
        Ok(())
    }

    /// Zero-based month of the requested date.
    pub fn target_month(&self) -> u32 {
        self.date.month0()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub summary: String,
    pub confidence: String,
    pub model: &'static str,
    pub days_until_trip: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub source: &'static str,
    pub historical_years: i32,
    pub prediction_method: &'static str,
    /// Number of daily temperature keys in the dataset.
    pub data_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_range: Option<String>,
}

/// Everything computed for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub location: Location,
    pub date: NaiveDate,
    pub probabilities: ConditionResults,
    pub monthly_stats: Vec<MonthlyStat>,
    pub trends: Vec<YearlyTrend>,
    pub prediction: Prediction,
    pub metadata: Metadata,
}

/// Runs every calculation for `request` against `dataset`.
///
/// The request is not validated here; callers that need the date window
/// enforced call [`PredictionRequest::validate`] first. The trend window ends
/// at `today`'s year.
///
/// # Errors
///
/// Propagates contract violations from
/// [`compute_probabilities_with`](crate::transform::compute_probabilities_with).
pub fn build_report(
    dataset: &RawDataset,
    request: &PredictionRequest,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<Report> {
    let probabilities = compute_probabilities_with(
        dataset,
        request.target_month(),
        &request.conditions,
        config,
    )?;
    debug!(
        "{}: {} of {} requested conditions had observations",
        request.location_name,
        probabilities.len(),
        request.conditions.len()
    );

    let monthly_stats = compute_monthly_stats_with(dataset, config);
    let trends = compute_yearly_trends_with(dataset, today.year(), config);
    let summary = generate_summary_with(
        &probabilities,
        request.date,
        &request.location_name,
        config,
    );

    Ok(Report {
        location: Location {
            name: request.location_name.clone(),
            latitude: request.latitude,
            longitude: request.longitude,
        },
        date: request.date,
        probabilities,
        monthly_stats,
        trends,
        prediction: Prediction {
            summary,
            confidence: format!(
                "Based on {} years of {} historical data and statistical analysis",
                TREND_WINDOW_YEARS, SOURCE
            ),
            model: MODEL,
            days_until_trip: (request.date - today).num_days(),
        },
        metadata: Metadata {
            source: SOURCE,
            historical_years: TREND_WINDOW_YEARS,
            prediction_method: PREDICTION_METHOD,
            data_points: dataset.data_points(Parameter::Temperature),
            data_range: dataset
                .date_range()
                .map(|(first, last)| format!("{} to {}", first, last)),
        },
    })
}

/// Reads a NASA POWER response file and builds the report for `request`.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed, or if the dataset
/// violates the calculation contract (see [`build_report`]).
pub fn process_data(
    file_path: &Path,
    request: &PredictionRequest,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<Report> {
    let dataset = read_power_json(file_path)?;
    if dataset.is_empty() {
        warn!("{}: no daily observations", file_path.display());
    }
    debug!(
        "{}: {} temperature keys",
        file_path.display(),
        dataset.data_points(Parameter::Temperature)
    );
    build_report(&dataset, request, today, config)
}

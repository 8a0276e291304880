use crate::error::{EngineError, Result};
use chrono::{Datelike, NaiveDate};
use log::{Log, Metadata, Record as LogRecord};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, fs::File, io::BufReader, path::Path, str::FromStr};

pub const HOT_THRESHOLD_C: f64 = 32.0;
pub const COLD_THRESHOLD_C: f64 = 0.0;
pub const WET_THRESHOLD_MM: f64 = 20.0;
/// 20 mph.
pub const WINDY_THRESHOLD_MS: f64 = 8.94;
pub const UNCOMFORTABLE_THRESHOLD_PCT: f64 = 70.0;

/// Share of qualifying days above which Hot, Wet and Windy are labelled likely.
pub const LIKELY_RATIO: f64 = 0.3;
pub const HUMIDITY_LIKELY_RATIO: f64 = 0.5;
/// Cold is labelled likely as soon as a single day qualifies.
pub const ANY_DAY_RATIO: f64 = 0.0;

/// Probability (percent) a condition must exceed to be mentioned in a summary.
pub const SUMMARY_THRESHOLD: f64 = 40.0;

/// Number of years covered by the yearly trend series.
pub const TREND_WINDOW_YEARS: i32 = 10;

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Simple logger implementation
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &LogRecord) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Measured quantity in the daily series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    Temperature,
    Precipitation,
    WindSpeed,
    Humidity,
}

impl Parameter {
    pub const ALL: [Parameter; 4] = [
        Parameter::Temperature,
        Parameter::Precipitation,
        Parameter::WindSpeed,
        Parameter::Humidity,
    ];

    /// NASA POWER parameter code.
    pub fn api_code(self) -> &'static str {
        match self {
            Parameter::Temperature => "T2M",
            Parameter::Precipitation => "PRECTOTCORR",
            Parameter::WindSpeed => "WS10M",
            Parameter::Humidity => "RH2M",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Parameter::Temperature => "Temperature",
            Parameter::Precipitation => "Precipitation",
            Parameter::WindSpeed => "WindSpeed",
            Parameter::Humidity => "Humidity",
        };
        f.write_str(name)
    }
}

impl FromStr for Parameter {
    type Err = EngineError;

    /// Accepts either the NASA POWER code or the parameter name.
    fn from_str(s: &str) -> Result<Self> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.api_code() == s || p.to_string() == s)
            .ok_or_else(|| EngineError::Data(format!("Unknown parameter: {}", s)))
    }
}

/// Weather condition evaluated against a fixed threshold on one parameter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    Hot,
    Cold,
    Wet,
    Windy,
    Uncomfortable,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 5] = [
        ConditionKind::Hot,
        ConditionKind::Cold,
        ConditionKind::Wet,
        ConditionKind::Windy,
        ConditionKind::Uncomfortable,
    ];

    pub fn parameter(self) -> Parameter {
        match self {
            ConditionKind::Hot | ConditionKind::Cold => Parameter::Temperature,
            ConditionKind::Wet => Parameter::Precipitation,
            ConditionKind::Windy => Parameter::WindSpeed,
            ConditionKind::Uncomfortable => Parameter::Humidity,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            ConditionKind::Hot | ConditionKind::Cold => "°C",
            ConditionKind::Wet => "mm/day",
            ConditionKind::Windy => "m/s",
            ConditionKind::Uncomfortable => "%",
        }
    }

    /// Phrase used when the condition is named in a summary sentence.
    pub fn phrase(self) -> &'static str {
        match self {
            ConditionKind::Hot => "hot temperatures",
            ConditionKind::Cold => "cold conditions",
            ConditionKind::Wet => "significant rainfall",
            ConditionKind::Windy => "windy weather",
            ConditionKind::Uncomfortable => "high humidity",
        }
    }

    /// Strict comparison against the threshold: a value equal to it never qualifies.
    pub fn qualifies(self, value: f64, threshold: f64) -> bool {
        match self {
            ConditionKind::Cold => value < threshold,
            ConditionKind::Hot
            | ConditionKind::Wet
            | ConditionKind::Windy
            | ConditionKind::Uncomfortable => value > threshold,
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionKind::Hot => "hot",
            ConditionKind::Cold => "cold",
            ConditionKind::Wet => "wet",
            ConditionKind::Windy => "windy",
            ConditionKind::Uncomfortable => "uncomfortable",
        };
        f.write_str(name)
    }
}

/// Validated `YYYYMMDD` key of a daily observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Parses an 8-digit `YYYYMMDD` key.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MalformedDateKey` if the key is not exactly eight
    /// ASCII digits or does not name a real calendar day.
    pub fn parse(key: &str) -> Result<Self> {
        let malformed = || EngineError::MalformedDateKey(key.to_string());
        if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let year: i32 = key[0..4].parse().map_err(|_| malformed())?;
        let month: u32 = key[4..6].parse().map_err(|_| malformed())?;
        let day: u32 = key[6..8].parse().map_err(|_| malformed())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(DateKey)
            .ok_or_else(malformed)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Zero-based month (0 = January).
    pub fn month0(self) -> u32 {
        self.0.month0()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

/// One parameter's daily observations in date order; `None` marks a day
/// without an observation.
pub type Series = BTreeMap<DateKey, Option<f64>>;

/// Multi-year daily observations for each measured parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDataset {
    series: BTreeMap<Parameter, Series>,
}

impl RawDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the series for `parameter` with the given `(key, value)` entries.
    ///
    /// Keys may arrive in any order. Non-finite values are stored as missing.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MalformedDateKey` on the first key that fails to
    /// parse; the dataset is left unchanged in that case.
    pub fn insert_series<I, K>(&mut self, parameter: Parameter, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Option<f64>)>,
        K: AsRef<str>,
    {
        let series = entries
            .into_iter()
            .map(|(key, value)| {
                let key = DateKey::parse(key.as_ref())?;
                Ok((key, value.filter(|v| v.is_finite())))
            })
            .collect::<Result<Series>>()?;
        self.series.insert(parameter, series);
        Ok(())
    }

    pub fn series(&self, parameter: Parameter) -> Option<&Series> {
        self.series.get(&parameter)
    }

    /// Number of date keys (observed or not) recorded for `parameter`.
    pub fn data_points(&self, parameter: Parameter) -> usize {
        self.series.get(&parameter).map_or(0, |s| s.len())
    }

    /// Earliest and latest date key across every series.
    pub fn date_range(&self) -> Option<(DateKey, DateKey)> {
        let first = self.series.values().filter_map(|s| s.keys().next()).min()?;
        let last = self
            .series
            .values()
            .filter_map(|s| s.keys().next_back())
            .max()?;
        Some((*first, *last))
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(|s| s.is_empty())
    }
}

/// Extremal value reported alongside a condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Extreme {
    #[serde(rename = "maxValue")]
    Max(f64),
    #[serde(rename = "minValue")]
    Min(f64),
}

/// Statistics for one condition over the target month of every available year.
///
/// Numeric fields are rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionResult {
    pub probability: f64,
    pub avg_value: f64,
    #[serde(flatten)]
    pub extreme: Option<Extreme>,
    pub unit: &'static str,
    pub prediction: String,
}

/// Conditions with at least one observation; absent keys had no samples.
pub type ConditionResults = BTreeMap<ConditionKind, ConditionResult>;

/// Seasonal profile entry: probability (percent) of each condition for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStat {
    pub month: &'static str,
    pub hot: f64,
    pub cold: f64,
    pub wet: f64,
    pub windy: f64,
    pub uncomfortable: f64,
}

/// Whole-year probabilities for one year of the trend window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTrend {
    pub year: i32,
    pub hot: f64,
    pub cold: f64,
    pub wet: f64,
    pub predicted: bool,
}

/// Threshold and prediction labels for a single condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRule {
    pub threshold: f64,
    /// The "likely" label applies when qualifying days exceed this share of samples.
    pub likely_ratio: f64,
    pub likely_label: String,
    pub unlikely_label: String,
}

impl ConditionRule {
    fn new(threshold: f64, likely_ratio: f64, likely: &str, unlikely: &str) -> Self {
        Self {
            threshold,
            likely_ratio,
            likely_label: likely.to_string(),
            unlikely_label: unlikely.to_string(),
        }
    }

    pub fn prediction(&self, qualifying: usize, total: usize) -> &str {
        if qualifying as f64 > total as f64 * self.likely_ratio {
            &self.likely_label
        } else {
            &self.unlikely_label
        }
    }
}

/// Configuration for the probability engine
///
/// A rule given in a config file must be complete; omitted rules and the
/// omitted summary threshold keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub hot: ConditionRule,
    pub cold: ConditionRule,
    pub wet: ConditionRule,
    pub windy: ConditionRule,
    pub uncomfortable: ConditionRule,
    pub summary_threshold: f64,
}

impl EngineConfig {
    /// Loads overrides from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or is not a valid config.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn rule(&self, kind: ConditionKind) -> &ConditionRule {
        match kind {
            ConditionKind::Hot => &self.hot,
            ConditionKind::Cold => &self.cold,
            ConditionKind::Wet => &self.wet,
            ConditionKind::Windy => &self.windy,
            ConditionKind::Uncomfortable => &self.uncomfortable,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hot: ConditionRule::new(
                HOT_THRESHOLD_C,
                LIKELY_RATIO,
                "High temperature conditions likely",
                "Normal temperature expected",
            ),
            cold: ConditionRule::new(
                COLD_THRESHOLD_C,
                ANY_DAY_RATIO,
                "Freezing conditions possible",
                "No freezing conditions expected",
            ),
            wet: ConditionRule::new(
                WET_THRESHOLD_MM,
                LIKELY_RATIO,
                "Heavy rainfall conditions possible",
                "Light to moderate rainfall expected",
            ),
            windy: ConditionRule::new(
                WINDY_THRESHOLD_MS,
                LIKELY_RATIO,
                "Strong wind conditions possible",
                "Moderate wind conditions expected",
            ),
            uncomfortable: ConditionRule::new(
                UNCOMFORTABLE_THRESHOLD_PCT,
                HUMIDITY_LIKELY_RATIO,
                "High humidity conditions likely",
                "Comfortable humidity levels expected",
            ),
            summary_threshold: SUMMARY_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_parses_valid_keys() {
        let key = DateKey::parse("20240315").unwrap();
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month0(), 2);
        assert_eq!(key.to_string(), "20240315");
    }

    #[test]
    fn date_key_rejects_malformed_keys() {
        for bad in ["2024031", "202403150", "2024-3-15", "2024AB15", "20241315", "20240230", ""] {
            assert!(
                matches!(DateKey::parse(bad), Err(EngineError::MalformedDateKey(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn insert_series_is_atomic_on_bad_key() {
        let mut dataset = RawDataset::new();
        dataset
            .insert_series(Parameter::Temperature, [("20200101", Some(1.0))])
            .unwrap();

        let err = dataset
            .insert_series(
                Parameter::Temperature,
                [("20200102", Some(2.0)), ("2020x103", Some(3.0))],
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedDateKey(k) if k == "2020x103"));
        assert_eq!(dataset.data_points(Parameter::Temperature), 1);
    }

    #[test]
    fn non_finite_values_are_stored_as_missing() {
        let mut dataset = RawDataset::new();
        dataset
            .insert_series(Parameter::Humidity, [("20200101", Some(f64::NAN))])
            .unwrap();
        let series = dataset.series(Parameter::Humidity).unwrap();
        assert_eq!(series.values().next(), Some(&None));
    }

    #[test]
    fn date_range_spans_all_series() {
        let mut dataset = RawDataset::new();
        assert_eq!(dataset.date_range(), None);
        dataset
            .insert_series(Parameter::Temperature, [("20200105", Some(1.0)), ("20200301", None)])
            .unwrap();
        dataset
            .insert_series(Parameter::Precipitation, [("20191231", Some(0.0))])
            .unwrap();

        let (first, last) = dataset.date_range().unwrap();
        assert_eq!(first.to_string(), "20191231");
        assert_eq!(last.to_string(), "20200301");
    }

    #[test]
    fn parameter_from_code_or_name() {
        assert_eq!("T2M".parse::<Parameter>().unwrap(), Parameter::Temperature);
        assert_eq!("WindSpeed".parse::<Parameter>().unwrap(), Parameter::WindSpeed);
        assert!("QV2M".parse::<Parameter>().is_err());
    }

    #[test]
    fn cold_prediction_triggers_on_any_day() {
        let config = EngineConfig::default();
        assert_eq!(config.cold.prediction(1, 1000), "Freezing conditions possible");
        assert_eq!(config.cold.prediction(0, 1000), "No freezing conditions expected");
        assert_eq!(config.hot.prediction(3, 10), "Normal temperature expected");
        assert_eq!(config.hot.prediction(4, 10), "High temperature conditions likely");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"summary_threshold": 25.0}"#).unwrap();
        assert_eq!(config.summary_threshold, 25.0);
        assert_eq!(config.hot, EngineConfig::default().hot);
    }
}

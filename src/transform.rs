use crate::error::{EngineError, Result};
use crate::structs::{
    ConditionKind, ConditionResult, ConditionResults, DateKey, EngineConfig, Extreme,
    MONTH_ABBREVIATIONS, MonthlyStat, Parameter, RawDataset, Series, TREND_WINDOW_YEARS,
    YearlyTrend,
};
use log::debug;

/// Computes condition statistics for one calendar month across every year in the dataset.
///
/// Uses the default thresholds and labels; see [`compute_probabilities_with`].
pub fn compute_probabilities(
    dataset: &RawDataset,
    target_month: u32,
    conditions: &[ConditionKind],
) -> Result<ConditionResults> {
    compute_probabilities_with(dataset, target_month, conditions, &EngineConfig::default())
}

/// Computes condition statistics for one calendar month across every year in the dataset.
///
/// For each requested condition, every observed value of the bound parameter
/// whose date falls in `target_month` (any year) is collected. Missing
/// observations are excluded from every statistic. A condition with no
/// observed values is left out of the result rather than reported as zero.
///
/// # Arguments
///
/// * `dataset` - Daily observations keyed by parameter
/// * `target_month` - Zero-based month (0 = January, 11 = December)
/// * `conditions` - Conditions to evaluate; duplicates are harmless
/// * `config` - Thresholds and prediction labels
///
/// # Errors
///
/// Returns `EngineError::InvalidMonth` if `target_month > 11`, and
/// `EngineError::MissingSeries` if a requested condition's parameter has no
/// series in the dataset at all.
pub fn compute_probabilities_with(
    dataset: &RawDataset,
    target_month: u32,
    conditions: &[ConditionKind],
    config: &EngineConfig,
) -> Result<ConditionResults> {
    if target_month > 11 {
        return Err(EngineError::InvalidMonth(target_month));
    }

    conditions
        .iter()
        .map(|&kind| -> Result<Option<(ConditionKind, ConditionResult)>> {
            let parameter = kind.parameter();
            let series = dataset
                .series(parameter)
                .ok_or(EngineError::MissingSeries(parameter))?;
            Ok(analyze_month(Some(series), kind, target_month, config).map(|r| (kind, r)))
        })
        .filter_map(Result::transpose)
        .collect()
}

/// Builds the 12-month seasonal profile with default thresholds.
pub fn compute_monthly_stats(dataset: &RawDataset) -> Vec<MonthlyStat> {
    compute_monthly_stats_with(dataset, &EngineConfig::default())
}

/// Builds the 12-month seasonal profile, January first.
///
/// Every month evaluates all five conditions. A condition without samples,
/// including one whose parameter series is absent, contributes `0`.
pub fn compute_monthly_stats_with(dataset: &RawDataset, config: &EngineConfig) -> Vec<MonthlyStat> {
    MONTH_ABBREVIATIONS
        .iter()
        .zip(0u32..)
        .map(|(&month, month0)| {
            let results: ConditionResults = ConditionKind::ALL
                .iter()
                .filter_map(|&kind| {
                    let series = dataset.series(kind.parameter());
                    analyze_month(series, kind, month0, config).map(|r| (kind, r))
                })
                .collect();
            if results.is_empty() {
                debug!("No observations for {}", month);
            }

            let probability = |kind: ConditionKind| results.get(&kind).map_or(0.0, |r| r.probability);
            MonthlyStat {
                month,
                hot: probability(ConditionKind::Hot),
                cold: probability(ConditionKind::Cold),
                wet: probability(ConditionKind::Wet),
                windy: probability(ConditionKind::Windy),
                uncomfortable: probability(ConditionKind::Uncomfortable),
            }
        })
        .collect()
}

/// Computes the yearly trend window with default thresholds.
pub fn compute_yearly_trends(dataset: &RawDataset, reference_year: i32) -> Vec<YearlyTrend> {
    compute_yearly_trends_with(dataset, reference_year, &EngineConfig::default())
}

/// Computes Hot, Cold and Wet probabilities over whole calendar years.
///
/// Covers the ten years ending at `reference_year`, ascending. Unlike the
/// monthly figures, each year pools all of its days. A year with no
/// observations for a parameter reports `0` for the conditions bound to it.
pub fn compute_yearly_trends_with(
    dataset: &RawDataset,
    reference_year: i32,
    config: &EngineConfig,
) -> Vec<YearlyTrend> {
    let first_year = reference_year - (TREND_WINDOW_YEARS - 1);
    debug!("Computing yearly trends for {}-{}", first_year, reference_year);

    (first_year..=reference_year)
        .map(|year| {
            let in_year = |key: DateKey| key.year() == year;
            let temps = select_values(dataset.series(Parameter::Temperature), in_year);
            let precip = select_values(dataset.series(Parameter::Precipitation), in_year);

            YearlyTrend {
                year,
                hot: probability_or_zero(ConditionKind::Hot, &temps, config),
                cold: probability_or_zero(ConditionKind::Cold, &temps, config),
                wet: probability_or_zero(ConditionKind::Wet, &precip, config),
                predicted: false,
            }
        })
        .collect()
}

/// Running totals over one condition's samples.
#[derive(Debug, Clone, Copy)]
struct Tally {
    count: usize,
    qualifying: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Tally {
    fn of(kind: ConditionKind, values: &[f64], threshold: f64) -> Self {
        let start = Tally {
            count: 0,
            qualifying: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        };
        values.iter().fold(start, |t, &v| Tally {
            count: t.count + 1,
            qualifying: t.qualifying + usize::from(kind.qualifies(v, threshold)),
            sum: t.sum + v,
            min: t.min.min(v),
            max: t.max.max(v),
        })
    }

    fn probability(&self) -> f64 {
        round_to_tenth(self.qualifying as f64 / self.count as f64 * 100.0)
    }
}

fn analyze_month(
    series: Option<&Series>,
    kind: ConditionKind,
    month0: u32,
    config: &EngineConfig,
) -> Option<ConditionResult> {
    let values = select_values(series, |key| key.month0() == month0);
    let result = analyze_condition(kind, &values, config);
    if result.is_none() {
        debug!(
            "Omitting {}: no {} observations for month index {}",
            kind,
            kind.parameter(),
            month0
        );
    }
    result
}

/// Summarises one condition's samples, or `None` when there are none.
fn analyze_condition(
    kind: ConditionKind,
    values: &[f64],
    config: &EngineConfig,
) -> Option<ConditionResult> {
    if values.is_empty() {
        return None;
    }

    let rule = config.rule(kind);
    let tally = Tally::of(kind, values, rule.threshold);
    let extreme = match kind {
        ConditionKind::Hot | ConditionKind::Wet | ConditionKind::Windy => {
            Some(Extreme::Max(round_to_tenth(tally.max)))
        }
        ConditionKind::Cold => Some(Extreme::Min(round_to_tenth(tally.min))),
        ConditionKind::Uncomfortable => None,
    };

    Some(ConditionResult {
        probability: tally.probability(),
        avg_value: round_to_tenth(tally.sum / tally.count as f64),
        extreme,
        unit: kind.unit(),
        prediction: rule.prediction(tally.qualifying, tally.count).to_string(),
    })
}

fn probability_or_zero(kind: ConditionKind, values: &[f64], config: &EngineConfig) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Tally::of(kind, values, config.rule(kind).threshold).probability()
}

/// Observed values (in date order) whose key satisfies `keep`.
fn select_values(series: Option<&Series>, keep: impl Fn(DateKey) -> bool) -> Vec<f64> {
    series
        .into_iter()
        .flatten()
        .filter(|(key, _)| keep(**key))
        .filter_map(|(_, value)| *value)
        .collect()
}

/// Rounds half away from zero to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

use crate::structs::{ConditionResults, EngineConfig};
use chrono::{Datelike, NaiveDate};

/// Writes a one-sentence outlook for `location` in the month of `target_date`.
///
/// Uses the default summary threshold; see [`generate_summary_with`].
pub fn generate_summary(results: &ConditionResults, target_date: NaiveDate, location: &str) -> String {
    generate_summary_with(results, target_date, location, &EngineConfig::default())
}

/// Writes a one-sentence outlook for `location` in the month of `target_date`.
///
/// Conditions whose probability exceeds `config.summary_threshold` are named
/// in enumeration order (hot, cold, wet, windy, uncomfortable). When none
/// qualifies the fixed pleasant-weather sentence is returned.
pub fn generate_summary_with(
    results: &ConditionResults,
    target_date: NaiveDate,
    location: &str,
    config: &EngineConfig,
) -> String {
    let month = target_date.format("%B");
    let year = target_date.year();

    let phrases: Vec<&str> = results
        .iter()
        .filter(|(_, result)| result.probability > config.summary_threshold)
        .map(|(kind, _)| kind.phrase())
        .collect();

    if phrases.is_empty() {
        return format!(
            "Pleasant weather expected in {} {} for {}. Moderate temperatures with comfortable conditions.",
            month, year, location
        );
    }

    format!(
        "In {} {}, expect {} for {}. Plan accordingly for your trip.",
        month,
        year,
        phrases.join(", "),
        location
    )
}

use crate::error::Result;
use crate::report::Report;
use crate::structs::{Extreme, MonthlyStat};
use arrow_array::{Float64Array, RecordBatch, StringArray, UInt32Array};
use arrow_schema::{DataType, Field, Schema};
use csv::Writer;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::{fs::File, path::Path, sync::Arc};

/// Writes the per-condition probabilities of a report to a CSV file.
///
/// One row per condition that had observations, in condition order. The
/// extremal column is empty for conditions without one.
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_probabilities_csv(report: &Report, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record([
        "Condition",
        "Probability",
        "Average_Value",
        "Extreme_Kind",
        "Extreme_Value",
        "Unit",
        "Prediction",
    ])?;

    for (kind, result) in &report.probabilities {
        let (extreme_kind, extreme_value) = match result.extreme {
            Some(Extreme::Max(v)) => ("max", format!("{:.1}", v)),
            Some(Extreme::Min(v)) => ("min", format!("{:.1}", v)),
            None => ("", String::new()),
        };
        writer.write_record(&[
            kind.to_string(),
            format!("{:.1}", result.probability),
            format!("{:.1}", result.avg_value),
            extreme_kind.to_string(),
            extreme_value,
            result.unit.to_string(),
            result.prediction.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes a full report to a pretty-formatted JSON file.
///
/// # Errors
/// Returns error if file cannot be created or serialization fails.
pub fn write_json(report: &Report, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

/// Writes the seasonal profile to a columnar Parquet file using Arrow format.
///
/// Rows follow the input order; `month_number` is 1-based.
///
/// # Errors
/// Returns error if file cannot be created, schema is invalid, or Arrow operations fail.
pub fn write_parquet(stats: &[MonthlyStat], output_path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("month", DataType::Utf8, false),
        Field::new("month_number", DataType::UInt32, false),
        Field::new("hot", DataType::Float64, false),
        Field::new("cold", DataType::Float64, false),
        Field::new("wet", DataType::Float64, false),
        Field::new("windy", DataType::Float64, false),
        Field::new("uncomfortable", DataType::Float64, false),
    ]));

    let months: StringArray = StringArray::from_iter_values(stats.iter().map(|s| s.month));
    let month_numbers: UInt32Array = (1..=stats.len() as u32).collect();
    let hot: Float64Array = stats.iter().map(|s| s.hot).collect();
    let cold: Float64Array = stats.iter().map(|s| s.cold).collect();
    let wet: Float64Array = stats.iter().map(|s| s.wet).collect();
    let windy: Float64Array = stats.iter().map(|s| s.windy).collect();
    let uncomfortable: Float64Array = stats.iter().map(|s| s.uncomfortable).collect();

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(months),
            Arc::new(month_numbers),
            Arc::new(hot),
            Arc::new(cold),
            Arc::new(wet),
            Arc::new(windy),
            Arc::new(uncomfortable),
        ],
    )?;

    let file = File::create(output_path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

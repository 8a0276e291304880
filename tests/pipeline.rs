use arrow_array::{Float64Array, StringArray};
use chrono::{Datelike, NaiveDate};
use lib::{
    ConditionKind, EngineConfig, EngineError, PredictionRequest, process_data, write_json,
    write_parquet, write_probabilities_csv,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::{self, File};
use std::path::Path;

/// Ten years of daily data: July is always 35 °C with 25 mm of rain, every
/// other day is 15 °C and dry, and January 1st is -3 °C. Wind and humidity
/// are missing in odd years.
fn power_document() -> String {
    let mut t2m = Vec::new();
    let mut precip = Vec::new();
    let mut wind = Vec::new();
    let mut humidity = Vec::new();

    for year in 2016..=2025 {
        let mut day = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        while day.year() == year {
            let key = day.format("%Y%m%d").to_string();
            let july = day.month() == 7;
            let temp = if day.ordinal() == 1 {
                -3.0
            } else if july {
                35.0
            } else {
                15.0
            };
            t2m.push(format!("\"{}\": {:.1}", key, temp));
            precip.push(format!("\"{}\": {:.1}", key, if july { 25.0 } else { 0.0 }));
            if year % 2 == 0 {
                wind.push(format!("\"{}\": 5.0", key));
                humidity.push(format!("\"{}\": 75.0", key));
            } else {
                wind.push(format!("\"{}\": null", key));
                humidity.push(format!("\"{}\": -999.0", key));
            }
            day = day.succ_opt().unwrap();
        }
    }

    let series = |values: &[String]| format!("{{{}}}", values.join(","));
    format!(
        r#"{{"header": {{"fill_value": -999.0}}, "properties": {{"parameter": {{"T2M": {}, "PRECTOTCORR": {}, "WS10M": {}, "RH2M": {}}}}}}}"#,
        series(&t2m),
        series(&precip),
        series(&wind),
        series(&humidity)
    )
}

fn request(conditions: &[ConditionKind]) -> PredictionRequest {
    PredictionRequest {
        location_name: "Springfield".to_string(),
        latitude: Some(39.8),
        longitude: Some(-89.6),
        date: NaiveDate::from_ymd_opt(2026, 7, 15).unwrap(),
        conditions: conditions.to_vec(),
    }
}

fn write_input(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("springfield.json");
    fs::write(&path, power_document()).unwrap();
    path
}

#[test]
fn july_report_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

    let report = process_data(
        &input,
        &request(&ConditionKind::ALL),
        today,
        &EngineConfig::default(),
    )
    .unwrap();

    let hot = &report.probabilities[&ConditionKind::Hot];
    assert_eq!(hot.probability, 100.0);
    assert_eq!(hot.avg_value, 35.0);
    assert_eq!(hot.prediction, "High temperature conditions likely");

    let cold = &report.probabilities[&ConditionKind::Cold];
    assert_eq!(cold.probability, 0.0);

    let windy = &report.probabilities[&ConditionKind::Windy];
    assert_eq!(windy.probability, 0.0);
    assert_eq!(windy.avg_value, 5.0);

    let humid = &report.probabilities[&ConditionKind::Uncomfortable];
    assert_eq!(humid.probability, 100.0);

    assert_eq!(
        report.prediction.summary,
        "In July 2026, expect hot temperatures, significant rainfall, high humidity for Springfield. Plan accordingly for your trip."
    );

    // January: 10 frozen days out of 310
    assert_eq!(report.monthly_stats[0].cold, 3.2);
    assert_eq!(report.monthly_stats[6].hot, 100.0);
    assert_eq!(report.monthly_stats[6].wet, 100.0);
    assert_eq!(report.monthly_stats[3].hot, 0.0);

    assert_eq!(report.trends.len(), 10);
    assert_eq!(report.trends[0].year, 2017);
    assert_eq!(report.trends[9].year, 2026);
    // 2024 is a leap year: 31 July days of 366
    assert_eq!(report.trends[7].year, 2024);
    assert_eq!(report.trends[7].hot, 8.5);
    assert_eq!(report.trends[7].cold, 0.3);
    assert_eq!(report.trends[7].wet, 8.5);
    assert_eq!((report.trends[9].hot, report.trends[9].wet), (0.0, 0.0));

    assert_eq!(report.metadata.data_range.as_deref(), Some("20160101 to 20251231"));
}

#[test]
fn outputs_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
    let report = process_data(
        &input,
        &request(&[ConditionKind::Cold, ConditionKind::Uncomfortable]),
        today,
        &EngineConfig::default(),
    )
    .unwrap();

    let json_path = dir.path().join("report.json");
    write_json(&report, &json_path).unwrap();
    let json: serde_json::Value = serde_json::from_reader(File::open(&json_path).unwrap()).unwrap();
    assert_eq!(json["location"]["name"], "Springfield");
    assert_eq!(json["probabilities"]["cold"]["minValue"], 35.0);
    assert!(json["probabilities"]["uncomfortable"].get("maxValue").is_none());
    assert_eq!(json["monthlyStats"].as_array().map(Vec::len), Some(12));

    let csv_path = dir.path().join("probabilities.csv");
    write_probabilities_csv(&report, &csv_path).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "cold");
    assert_eq!(&rows[0][3], "min");
    assert_eq!(&rows[1][0], "uncomfortable");
    assert_eq!(&rows[1][1], "100.0");
    assert_eq!(&rows[1][3], "");

    let parquet_path = dir.path().join("monthly.parquet");
    write_parquet(&report.monthly_stats, &parquet_path).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&parquet_path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 12);
    let months = batches[0]
        .column_by_name("month")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(months.value(6), "Jul");
    let hot = batches[0]
        .column_by_name("hot")
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(hot.value(6), 100.0);
}

#[test]
fn response_without_parameters_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.json");
    fs::write(&input, r#"{"messages": ["rate limited"]}"#).unwrap();

    let err = process_data(
        &input,
        &request(&[ConditionKind::Hot]),
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        &EngineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Data(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = process_data(
        &dir.path().join("absent.json"),
        &request(&[ConditionKind::Hot]),
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        &EngineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Io(_)));
}

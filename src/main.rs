use chrono::{Local, NaiveDate};
use clap::Parser;
use lib::{
    ConditionKind, EngineConfig, EngineError, PredictionRequest, Report, SimpleLogger,
    process_data, write_json, write_parquet, write_probabilities_csv,
};
use log::debug;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// NASA POWER daily point JSON files, one per location (e.g., chicago.json,lisbon.json)
    #[arg(short, long, value_delimiter = ',', required = true)]
    input_files: Vec<PathBuf>,

    /// Target date (YYYY-MM-DD); its month selects the historical days evaluated
    #[arg(short, long)]
    date: NaiveDate,

    /// Location label used in summaries. Defaults to each input file's name.
    #[arg(short, long)]
    location: Option<String>,

    /// Latitude reported with each result (optional)
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<f64>,

    /// Longitude reported with each result (optional)
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Conditions to evaluate (e.g., hot,wet)
    #[arg(short, long, value_enum, value_delimiter = ',', default_values_t = ConditionKind::ALL)]
    conditions: Vec<ConditionKind>,

    /// Output base name (will create dir containing .json, .csv, and .parquet files)
    #[arg(short, long, default_value = "output")]
    output: String,

    /// JSON file overriding thresholds, prediction labels, or the summary threshold
    #[arg(long)]
    config: Option<PathBuf>,

    /// Accept dates outside today..today+6 months
    #[arg(long, default_value_t = false)]
    skip_date_check: bool,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> Result<(), EngineError> {
    // Initialize timer and logger
    let total_start = Instant::now();
    log::set_logger(&LOGGER).map_err(|e| EngineError::Data(format!("Logger: {}", e)))?;

    // Acquire CLI args
    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }
    let today = Local::now().date_naive();

    // UI
    println!("Outlook! Historical weather condition probabilities");
    debug!(
        "Inputs: {} file(s) | Date: {} | Conditions: {:?}",
        args.input_files.len(),
        args.date,
        args.conditions
    );

    let config = match &args.config {
        Some(path) => {
            debug!("Loading engine configuration from {}", path.display());
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };
    debug!(
        "Thresholds | hot>{} cold<{} wet>{} windy>{} uncomfortable>{} | summary>{}",
        config.hot.threshold,
        config.cold.threshold,
        config.wet.threshold,
        config.windy.threshold,
        config.uncomfortable.threshold,
        config.summary_threshold
    );

    let base_request = PredictionRequest {
        location_name: String::new(),
        latitude: args.latitude,
        longitude: args.longitude,
        date: args.date,
        conditions: args.conditions.clone(),
    };
    match base_request.validate(today) {
        Err(EngineError::DateInPast { .. } | EngineError::DateBeyondHorizon { .. })
            if args.skip_date_check =>
        {
            debug!("Date {} outside the prediction window; continuing", args.date);
        }
        other => other?,
    }

    // Each file is an independent request
    println!("Processing {} dataset(s)...", args.input_files.len());
    let processing_start = Instant::now();
    let reports = args
        .input_files
        .par_iter()
        .map(|path| {
            let request = PredictionRequest {
                location_name: args
                    .location
                    .clone()
                    .unwrap_or_else(|| file_label(path)),
                ..base_request.clone()
            };
            process_data(path, &request, today, &config).map(|report| (file_label(path), report))
        })
        .collect::<Result<Vec<(String, Report)>, EngineError>>()?;
    let processing_time = processing_start.elapsed();
    println!(
        "Data processing completed in {:.2?} | Built {} report(s)",
        processing_time,
        reports.len()
    );

    // Create output directory
    let output_dir = PathBuf::from(format!("./output/{}", args.output));
    fs::create_dir_all(&output_dir)?;
    println!(
        "Created output directory: {} | Writing output files...",
        output_dir.display()
    );
    let io_start = Instant::now();

    for (name, report) in &reports {
        let json_path = output_dir.join(format!("{}.json", name));
        let csv_path = output_dir.join(format!("{}_probabilities.csv", name));
        let parquet_path = output_dir.join(format!("{}_monthly.parquet", name));

        write_json(report, &json_path)?;
        write_probabilities_csv(report, &csv_path)?;
        write_parquet(&report.monthly_stats, &parquet_path)?;
        debug!("  - {}", json_path.display());
        debug!("  - {}", csv_path.display());
        debug!("  - {}", parquet_path.display());

        println!("\n{}", report.prediction.summary);
        for (kind, result) in &report.probabilities {
            println!(
                "  {:<14} {:>5.1}%  avg {:.1}{}  {}",
                kind.to_string(),
                result.probability,
                result.avg_value,
                result.unit,
                result.prediction
            );
        }
    }

    let io_time = io_start.elapsed();
    println!("\nAll files took {:.2?}", io_time);
    println!("Wrote files to directory: {}", output_dir.display());

    let total_time = total_start.elapsed();
    debug!(
        "Performance breakdown: Processing={:.1}%, IO={:.1}%",
        (processing_time.as_secs_f64() / total_time.as_secs_f64()) * 100.0,
        (io_time.as_secs_f64() / total_time.as_secs_f64()) * 100.0
    );

    println!("\nTotal runtime: {:.2?}", total_time);
    Ok(())
}

/// File stem used for output names and as the default location label.
fn file_label(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("location")
        .to_string()
}

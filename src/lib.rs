pub mod error;
pub mod extract;
pub mod load;
pub mod report;
pub mod structs;
pub mod summary;
pub mod transform;

// Re-export public API
pub use error::{EngineError, Result};
pub use extract::{parse_power_json, read_power_json};
pub use load::{write_json, write_parquet, write_probabilities_csv};
pub use report::{PredictionRequest, Report, build_report, process_data};
pub use structs::{
    ConditionKind, ConditionResult, ConditionResults, ConditionRule, DateKey, EngineConfig,
    Extreme, MonthlyStat, Parameter, RawDataset, SimpleLogger, YearlyTrend,
};
pub use summary::{generate_summary, generate_summary_with};
pub use transform::{
    compute_monthly_stats, compute_monthly_stats_with, compute_probabilities,
    compute_probabilities_with, compute_yearly_trends, compute_yearly_trends_with,
};

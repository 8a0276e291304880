use crate::error::{EngineError, Result};
use crate::structs::{Parameter, RawDataset};
use log::debug;
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

/// Fill value NASA POWER uses for days without data when the header omits one.
const DEFAULT_FILL_VALUE: f64 = -999.0;

#[derive(Debug, Deserialize)]
struct PowerResponse {
    header: Option<PowerHeader>,
    properties: Option<PowerProperties>,
}

#[derive(Debug, Deserialize)]
struct PowerHeader {
    fill_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: Option<HashMap<String, HashMap<String, Option<f64>>>>,
}

/// Reads a saved NASA POWER daily point response into a dataset.
///
/// # Errors
///
/// Returns error if the file cannot be read or its contents are rejected by
/// [`parse_power_json`].
pub fn read_power_json(path: &Path) -> Result<RawDataset> {
    debug!("Reading NASA POWER response: {}", path.display());
    let text = fs::read_to_string(path)?;
    parse_power_json(&text)
}

/// Parses a NASA POWER daily point response.
///
/// Series are taken from `properties.parameter`, keyed by POWER code
/// (`T2M`, `PRECTOTCORR`, `WS10M`, `RH2M`). Both `null` and the header's
/// `fill_value` mark a day without an observation. Other parameter codes are
/// ignored.
///
/// # Errors
///
/// Returns `EngineError::Json` for invalid JSON, `EngineError::Data` when
/// `properties.parameter` is absent, and `EngineError::MalformedDateKey` when
/// a series contains a key that is not `YYYYMMDD`.
pub fn parse_power_json(text: &str) -> Result<RawDataset> {
    let response: PowerResponse = serde_json::from_str(text)?;
    let parameters = response
        .properties
        .and_then(|p| p.parameter)
        .ok_or_else(|| {
            EngineError::Data("Invalid response: missing properties.parameter".to_string())
        })?;
    let fill_value = response
        .header
        .and_then(|h| h.fill_value)
        .unwrap_or(DEFAULT_FILL_VALUE);

    let mut dataset = RawDataset::new();
    for (code, values) in parameters {
        let Ok(parameter) = code.parse::<Parameter>() else {
            debug!("Skipping unrecognised parameter {}", code);
            continue;
        };
        debug!("Loaded {} daily {} values", values.len(), parameter);
        dataset.insert_series(
            parameter,
            values
                .into_iter()
                .map(|(key, value)| (key, value.filter(|v| *v != fill_value))),
        )?;
    }

    Ok(dataset)
}

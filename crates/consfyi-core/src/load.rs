use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Diagnostics, MaterializeError};
use crate::model::{Series, SeriesRecord};

/// Structural schema every series record is checked against, versioned
/// alongside the pipeline.
const RECORD_SCHEMA: &str = include_str!("../schema.json");

/// Compiled record schema. Building it is part of run setup; a schema
/// that does not compile aborts before any record is read.
pub struct RecordValidator {
    validator: jsonschema::Validator,
}

impl RecordValidator {
    pub fn new() -> Result<Self, MaterializeError> {
        let schema: Value = serde_json::from_str(RECORD_SCHEMA)?;
        let validator = jsonschema::options()
            .should_validate_formats(true)
            .build(&schema)
            .map_err(|err| MaterializeError::Schema(err.to_string()))?;
        Ok(Self { validator })
    }

    /// Accumulates every schema violation for `value` into
    /// `diagnostics`. Returns true when the record is clean.
    fn check(&self, series_id: &str, value: &Value, diagnostics: &mut Diagnostics) -> bool {
        let mut ok = true;
        for error in self.validator.iter_errors(value) {
            ok = false;
            diagnostics.record(series_id, location(&error.instance_path.to_string()), error.to_string());
        }
        ok
    }
}

fn location(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Reads every `*.json` record under `input_dir` in lexicographic
/// filename order. Records that fail validation are skipped but their
/// errors are recorded; the caller decides batch success afterwards.
pub fn load_series(
    input_dir: &Path,
    validator: &RecordValidator,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SeriesRecord>, MaterializeError> {
    let mut file_names = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.ends_with(".json") {
            file_names.push(name);
        }
    }
    file_names.sort_unstable();

    let mut records = Vec::with_capacity(file_names.len());
    for name in file_names {
        let series_id = name.strip_suffix(".json").unwrap_or(&name).to_string();
        let text = fs::read_to_string(input_dir.join(&name))?;
        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                diagnostics.record(&series_id, "/", format!("invalid JSON: {err}"));
                continue;
            }
        };
        if !validator.check(&series_id, &value, diagnostics) {
            continue;
        }
        match serde_json::from_value::<Series>(value) {
            Ok(series) => {
                debug!(series = %series_id, events = series.events.len(), "loaded record");
                records.push(SeriesRecord {
                    id: series_id,
                    series,
                });
            }
            Err(err) => diagnostics.record(&series_id, "/", err.to_string()),
        }
    }
    Ok(records)
}

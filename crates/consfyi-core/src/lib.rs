//! Core library for the cons.fyi materialization pipeline.
//!
//! Reads a directory of per-series convention records, validates each
//! against the record schema, derives computed fields (timezone,
//! attendance carry-over, Chinese script variants), folds everything
//! into a global event index and writes the synchronized artifact set
//! consumed by the static site and by calendar clients.
//!
//! Validation errors accumulate across the whole input set; if any
//! were recorded the run fails before a single artifact file is
//! written.

pub mod derive;
pub mod emit;
pub mod error;
pub mod ics;
pub mod load;
pub mod logging;
pub mod model;
pub mod script;
pub mod window;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

pub use derive::{GlobalIndex, TimezoneResolver};
pub use error::{Diagnostics, MaterializeError, RecordError};
pub use model::{Event, Series, SeriesRecord, Translation};

use derive::merge_series;
use emit::OutputPaths;
use load::{RecordValidator, load_series};
use script::ScriptConverter;
use window::{active_events, last_events};

#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Directory holding one JSON record per series.
    pub input_dir: PathBuf,
    /// Directory the artifact set is written beneath.
    pub output_dir: PathBuf,
}

/// Runs the whole pipeline once: load, validate, merge, select, emit.
///
/// `now` is the run's capture instant; it stamps the calendar feed and
/// the freshness timestamp and anchors the active window.
pub fn run(
    options: &MaterializeOptions,
    timezones: &dyn TimezoneResolver,
    now: DateTime<Utc>,
) -> Result<(), MaterializeError> {
    let validator = RecordValidator::new()?;
    let converter = ScriptConverter::new()?;
    let paths = OutputPaths::prepare(&options.output_dir)?;

    let mut diagnostics = Diagnostics::default();
    let mut records = load_series(&options.input_dir, &validator, &mut diagnostics)?;
    let index = merge_series(&mut records, &converter, timezones, &mut diagnostics);

    if !diagnostics.is_empty() {
        return Err(MaterializeError::Validation {
            count: diagnostics.len(),
        });
    }

    let current = active_events(&index, now);
    let last = last_events(&records);
    emit::write_artifacts(&paths, &records, &index, &current, &last, now)?;

    info!(
        series = records.len(),
        events = index.len(),
        "materialization complete"
    );
    Ok(())
}

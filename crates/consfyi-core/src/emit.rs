use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::derive::GlobalIndex;
use crate::error::MaterializeError;
use crate::ics;
use crate::model::{Event, SeriesRecord};

/// Output directory layout for one run. Creating the directories is
/// setup and happens before any record is processed; artifact files
/// are only written once the whole batch validated cleanly.
pub struct OutputPaths {
    root: PathBuf,
    series_dir: PathBuf,
    events_dir: PathBuf,
}

impl OutputPaths {
    pub fn prepare(root: &Path) -> Result<Self, MaterializeError> {
        let series_dir = root.join("series");
        let events_dir = root.join("events");
        fs::create_dir_all(&series_dir)?;
        fs::create_dir_all(&events_dir)?;
        Ok(Self {
            root: root.to_path_buf(),
            series_dir,
            events_dir,
        })
    }
}

/// Writes the complete artifact set beneath the output root.
pub fn write_artifacts(
    paths: &OutputPaths,
    records: &[SeriesRecord],
    index: &GlobalIndex,
    current: &[&Event],
    last: &[&Event],
    now: DateTime<Utc>,
) -> Result<(), MaterializeError> {
    fs::write(
        paths.root.join("timestamp"),
        now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
    )?;

    for record in records {
        write_json_pretty(
            &paths.series_dir.join(format!("{}.json", record.id)),
            &record.series,
        )?;
    }
    for event in index.events() {
        write_json_pretty(&paths.events_dir.join(format!("{}.json", event.id)), event)?;
    }

    let mut series_ids: Vec<&str> = records.iter().map(|record| record.id.as_str()).collect();
    series_ids.sort_unstable();
    write_json(&paths.root.join("series.json"), &series_ids)?;

    // Global Index insertion order; not guaranteed sorted.
    let event_ids: Vec<&str> = index.ids().collect();
    write_json(&paths.root.join("events.json"), &event_ids)?;

    write_jsonl(&paths.root.join("current.jsonl"), current)?;
    write_jsonl(&paths.root.join("last.jsonl"), last)?;

    fs::write(
        paths.root.join("calendar.ics"),
        ics::render_calendar(current, now),
    )?;

    info!(
        series = records.len(),
        events = index.len(),
        current = current.len(),
        out = %paths.root.display(),
        "artifact set written"
    );
    Ok(())
}

fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), MaterializeError> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), MaterializeError> {
    fs::write(path, serde_json::to_string(value)?)?;
    Ok(())
}

fn write_jsonl(path: &Path, events: &[&Event]) -> Result<(), MaterializeError> {
    let mut text = String::new();
    for event in events {
        text.push_str(&serde_json::to_string(event)?);
        text.push('\n');
    }
    fs::write(path, text)?;
    Ok(())
}

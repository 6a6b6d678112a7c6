use std::collections::HashMap;

use tracing::debug;

use crate::error::Diagnostics;
use crate::model::{Event, SeriesRecord, Translation};
use crate::script::{Script, ScriptConverter, script_for_locale};

/// Pure offline coordinate-to-zone lookup. The production resolver
/// lives in the CLI crate; tests inject fixtures.
pub trait TimezoneResolver {
    fn resolve(&self, lat: f64, lng: f64) -> Option<String>;
}

/// Insertion-ordered mapping from event id to fully-derived event,
/// built by iterating every series exactly once.
///
/// A colliding id keeps its original position in the order while the
/// later event wins in the map; the collision itself is reported
/// through [`Diagnostics`] and fails the batch, so the last-writer
/// value is an implementation detail rather than a contract.
#[derive(Debug, Default)]
pub struct GlobalIndex {
    order: Vec<String>,
    by_id: HashMap<String, Event>,
}

impl GlobalIndex {
    fn insert(&mut self, event: Event) -> Option<Event> {
        let id = event.id.clone();
        let displaced = self.by_id.insert(id.clone(), event);
        if displaced.is_none() {
            self.order.push(id);
        }
        displaced
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.by_id.get(id)
    }

    /// Event ids in insertion order. Not sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Events in insertion order. Not sorted.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}

/// Derives the computed fields on every event and folds all series
/// into the global index, recording identity collisions without
/// aborting the pass.
pub fn merge_series(
    records: &mut [SeriesRecord],
    converter: &ScriptConverter,
    timezones: &dyn TimezoneResolver,
    diagnostics: &mut Diagnostics,
) -> GlobalIndex {
    let mut index = GlobalIndex::default();
    for record in records.iter_mut() {
        derive_series(record, converter, timezones);
        for event in &record.series.events {
            if let Some(displaced) = index.insert(event.clone()) {
                let last_seen = displaced
                    .series_id
                    .unwrap_or_else(|| "unknown".to_string());
                diagnostics.record(
                    format!("{}/{}", record.id, event.id),
                    "/id",
                    format!("not unique across all series, last seen in {last_seen}"),
                );
            }
        }
        debug!(series = %record.id, events = record.series.events.len(), "merged series");
    }
    index
}

fn derive_series(
    record: &mut SeriesRecord,
    converter: &ScriptConverter,
    timezones: &dyn TimezoneResolver,
) {
    let events = &mut record.series.events;

    // The list is stored newest-first, so the occurrence that preceded
    // event i is the stored element at i + 1. The oldest event has no
    // successor and keeps no previous attendance.
    for i in 0..events.len() {
        if let Some(attendance) = events.get(i + 1).and_then(|previous| previous.attendance) {
            events[i].previous_attendance = Some(attendance);
        }
    }

    for event in events.iter_mut() {
        event.series_id = Some(record.id.clone());
        if let Some((lat, lng)) = event.lat_lng {
            event.timezone = timezones.resolve(lat, lng);
        }
        derive_script_variant(event, converter);
    }
}

/// Adds the sibling Chinese-script rendition of an event's text fields
/// when its locale or existing translations involve a Chinese variant.
fn derive_script_variant(event: &mut Event, converter: &ScriptConverter) {
    let locale_script = event.locale.as_deref().and_then(script_for_locale);
    let input = locale_script.or_else(|| {
        [Script::Hans, Script::Hant]
            .into_iter()
            .find(|script| event.translations.contains_key(script.locale_tag()))
    });
    let Some(input) = input else {
        return;
    };
    let output = input.opposite();

    // Source text prefers an explicit overlay under the input script;
    // the base fields only qualify when the event itself is in Chinese.
    let overlay = event.translations.get(input.locale_tag());
    let base_is_chinese = locale_script.is_some();
    let name = overlay
        .and_then(|t| t.name.clone())
        .or_else(|| base_is_chinese.then(|| event.name.clone()));
    let venue = overlay
        .and_then(|t| t.venue.clone())
        .or_else(|| base_is_chinese.then(|| event.venue.clone()));
    let address = overlay
        .and_then(|t| t.address.clone())
        .or_else(|| if base_is_chinese { event.address.clone() } else { None });

    let derived = Translation {
        name: name.as_deref().and_then(|text| converter.convert(text, output)),
        venue: venue.as_deref().and_then(|text| converter.convert(text, output)),
        address: address
            .as_deref()
            .and_then(|text| converter.convert(text, output)),
    };

    // Re-derivation wins over a previously stored target entry.
    if !derived.is_empty() {
        event
            .translations
            .insert(output.locale_tag().to_string(), derived);
    }
}

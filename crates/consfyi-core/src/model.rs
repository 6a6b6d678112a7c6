use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Partial per-locale overlay for an event's text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Translation {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.venue.is_none() && self.address.is_none()
    }
}

/// One dated occurrence of a recurring convention.
///
/// `series_id`, `timezone` and `previous_attendance` are derived during
/// the merge pass and never appear in source records; they stay `None`
/// (and are skipped on serialization) until derivation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub url: String,
    pub venue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, Translation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canceled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat_lng: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_attendance: Option<u64>,
}

impl Event {
    pub fn is_canceled(&self) -> bool {
        self.canceled.unwrap_or(false)
    }

    /// Total order used by the current and last views: start date, then
    /// end date, then identifier as the deterministic tie-breaker.
    pub fn sort_key(&self) -> (NaiveDate, NaiveDate, &str) {
        (self.start_date, self.end_date, self.id.as_str())
    }
}

/// A recurring convention and its occurrence history, stored
/// newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub url: String,
    pub events: Vec<Event>,
}

/// A series together with its identity, the source file's basename.
#[derive(Debug, Clone)]
pub struct SeriesRecord {
    pub id: String,
    pub series: Series,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_event(id: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": "Furcon",
            "url": "https://furcon.example/",
            "venue": "Expo Hall",
            "startDate": "2024-03-01",
            "endDate": "2024-03-03",
        }))
        .expect("minimal event parses")
    }

    #[test]
    fn source_event_round_trips_without_derived_fields() {
        let event = minimal_event("furcon-2024");
        let value = serde_json::to_value(&event).expect("serialize");
        let object = value.as_object().expect("object");
        assert!(!object.contains_key("seriesId"));
        assert!(!object.contains_key("timezone"));
        assert!(!object.contains_key("previousAttendance"));
        assert!(!object.contains_key("translations"));

        let back: Event = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, event);
    }

    #[test]
    fn lat_lng_serializes_as_pair() {
        let mut event = minimal_event("furcon-2024");
        event.lat_lng = Some((25.033, 121.565));
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["latLng"], serde_json::json!([25.033, 121.565]));
    }

    #[test]
    fn sort_key_breaks_ties_by_id() {
        let a = minimal_event("a-2024");
        let b = minimal_event("b-2024");
        assert!(a.sort_key() < b.sort_key());
    }
}

use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::derive::GlobalIndex;
use crate::model::{Event, SeriesRecord};

/// Instant at which an event leaves the active window: local noon the
/// day after it ends, in the event's timezone, plus a 7-day grace
/// period. Events without a derived timezone fall back to UTC.
pub fn cutoff(event: &Event) -> Option<DateTime<Utc>> {
    let tz: Tz = event
        .timezone
        .as_deref()
        .and_then(|name| name.parse().ok())
        .unwrap_or(Tz::UTC);
    let day_after = event.end_date.checked_add_days(Days::new(1))?;
    let noon = day_after.and_time(NaiveTime::from_hms_opt(12, 0, 0)?);
    let local = tz.from_local_datetime(&noon).earliest()?;
    local.with_timezone(&Utc).checked_add_days(Days::new(7))
}

/// An event is current while `now` is strictly before its cutoff and
/// it has not been canceled.
pub fn is_active(event: &Event, now: DateTime<Utc>) -> bool {
    if event.is_canceled() {
        return false;
    }
    match cutoff(event) {
        Some(cutoff) => now < cutoff,
        None => false,
    }
}

/// The currently-relevant subset of the global index, sorted by
/// (startDate, endDate, id).
pub fn active_events(index: &GlobalIndex, now: DateTime<Utc>) -> Vec<&Event> {
    let mut events: Vec<&Event> = index.events().filter(|event| is_active(event, now)).collect();
    events.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    events
}

/// The most recent stored occurrence of each series (the head of its
/// newest-first list), independent of the active window, in the same
/// order.
pub fn last_events(records: &[SeriesRecord]) -> Vec<&Event> {
    let mut events: Vec<&Event> = records
        .iter()
        .filter_map(|record| record.series.events.first())
        .collect();
    events.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(id: &str, start: &str, end: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": "Furcon",
            "url": "https://furcon.example/",
            "venue": "Expo Hall",
            "startDate": start,
            "endDate": end,
        }))
        .expect("event parses")
    }

    #[test]
    fn cutoff_is_noon_after_end_plus_grace() {
        let event = event("furcon-2024", "2024-03-01", "2024-03-03");
        let cutoff = cutoff(&event).expect("cutoff");
        assert_eq!(
            cutoff,
            Utc.with_ymd_and_hms(2024, 3, 11, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn cutoff_respects_the_event_timezone() {
        let mut event = event("furcon-2024", "2024-03-01", "2024-03-03");
        event.timezone = Some("Asia/Taipei".to_string());
        let cutoff = cutoff(&event).expect("cutoff");
        // Noon in Taipei is 04:00 UTC.
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 3, 11, 4, 0, 0).unwrap());
    }

    #[test]
    fn window_boundary_is_strict() {
        let event = event("furcon-2024", "2024-03-01", "2024-03-03");
        let cutoff = cutoff(&event).expect("cutoff");
        assert!(is_active(&event, cutoff - Duration::seconds(1)));
        assert!(!is_active(&event, cutoff));
        assert!(!is_active(&event, cutoff + Duration::seconds(1)));
    }

    #[test]
    fn canceled_events_are_never_active() {
        let mut event = event("furcon-2024", "2024-03-01", "2024-03-03");
        event.canceled = Some(true);
        let cutoff = cutoff(&event).expect("cutoff");
        assert!(!is_active(&event, cutoff - Duration::days(30)));
    }

    #[test]
    fn last_view_takes_the_head_of_each_series_sorted() {
        use crate::model::{Series, SeriesRecord};

        let make = |id: &str, head: Event, rest: Vec<Event>| SeriesRecord {
            id: id.to_string(),
            series: Series {
                name: id.to_string(),
                url: "https://example.test/".to_string(),
                events: std::iter::once(head).chain(rest).collect(),
            },
        };

        let mut records = vec![
            make(
                "zeta",
                event("zeta-2024", "2024-06-01", "2024-06-02"),
                vec![event("zeta-2023", "2023-06-01", "2023-06-02")],
            ),
            make("alpha", event("alpha-2024", "2024-05-01", "2024-05-02"), vec![]),
            make("empty", event("drop-me", "2024-01-01", "2024-01-02"), vec![]),
        ];
        // A series with no stored occurrences contributes nothing.
        records[2].series.events.clear();

        let last = last_events(&records);
        let ids: Vec<&str> = last.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, ["alpha-2024", "zeta-2024"]);
    }
}

use chrono::{DateTime, Days, Utc};

use crate::model::Event;

/// Maximum octets per physical line, mandated by RFC 5545 §3.1.
const FOLD_LIMIT: usize = 75;

const PRODID: &str = "-//cons.fyi//EN";
const CALNAME: &str = "cons.fyi";

/// Backslash-escapes backslashes, commas and semicolons and turns
/// literal newlines into the two-character `\n` sequence (RFC 5545
/// §3.3.11).
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            _ => out.push(c),
        }
    }
    out
}

/// Folds one content line so no physical line exceeds 75 octets of
/// UTF-8, counting the single-space prefix on continuation lines.
/// Splits only at character boundaries, never inside a code point.
pub fn fold_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut octets = 0;
    for c in line.chars() {
        let width = c.len_utf8();
        if octets + width > FOLD_LIMIT {
            out.push_str("\r\n ");
            octets = 1;
        }
        out.push(c);
        octets += width;
    }
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold_line(line));
    out.push_str("\r\n");
}

/// Renders the full VCALENDAR feed: one all-day VEVENT per active
/// event, DTEND exclusive, every VEVENT stamped with the run's shared
/// capture instant.
pub fn render_calendar(events: &[&Event], dtstamp: DateTime<Utc>) -> String {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{PRODID}"));
    push_line(&mut out, &format!("X-WR-CALNAME:{CALNAME}"));

    let stamp = dtstamp.format("%Y%m%dT%H%M%SZ").to_string();
    for event in events {
        let start = event.start_date.format("%Y%m%d");
        let end = event
            .end_date
            .checked_add_days(Days::new(1))
            .unwrap_or(event.end_date)
            .format("%Y%m%d");
        let mut location = event.venue.clone();
        if let Some(address) = &event.address {
            location.push_str(", ");
            location.push_str(address);
        }

        push_line(&mut out, "BEGIN:VEVENT");
        push_line(&mut out, &format!("UID:{}", event.id));
        push_line(&mut out, &format!("SUMMARY:{}", escape_text(&event.name)));
        push_line(&mut out, &format!("DTSTART;VALUE=DATE:{start}"));
        push_line(&mut out, &format!("DTEND;VALUE=DATE:{end}"));
        push_line(&mut out, &format!("DTSTAMP:{stamp}"));
        push_line(&mut out, &format!("URL:{}", escape_text(&event.url)));
        push_line(&mut out, &format!("LOCATION:{}", escape_text(&location)));
        if let Some((lat, lng)) = event.lat_lng {
            push_line(&mut out, &format!("GEO:{lat:.6};{lng:.6}"));
        }
        push_line(&mut out, "END:VEVENT");
    }
    push_line(&mut out, "END:VCALENDAR");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn unescape_text(input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut chars = input.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            }
        }
        out
    }

    fn unfold(input: &str) -> String {
        input.replace("\r\n ", "")
    }

    #[test]
    fn escape_round_trips() {
        let input = "Back\\slash, semi;colon\nand newline";
        let escaped = escape_text(input);
        assert_eq!(escaped, "Back\\\\slash\\, semi\\;colon\\nand newline");
        assert_eq!(unescape_text(&escaped), input);
    }

    #[test]
    fn short_lines_are_not_folded() {
        assert_eq!(fold_line("SUMMARY:Furcon"), "SUMMARY:Furcon");
    }

    #[test]
    fn folded_lines_stay_within_the_octet_limit() {
        let line = format!("SUMMARY:{}", "x".repeat(300));
        let folded = fold_line(&line);
        for physical in folded.split("\r\n") {
            assert!(physical.len() <= 75, "physical line too long: {physical}");
        }
        assert_eq!(unfold(&folded), line);
    }

    #[test]
    fn folding_never_splits_a_code_point() {
        // Three-octet characters do not divide 75 evenly.
        let line = format!("LOCATION:{}", "會".repeat(80));
        let folded = fold_line(&line);
        for physical in folded.split("\r\n") {
            assert!(physical.len() <= 75);
            assert!(physical.chars().all(|c| c == ' ' || c == '會' || c.is_ascii()));
        }
        assert_eq!(unfold(&folded), line);
    }

    #[test]
    fn calendar_renders_one_all_day_vevent() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": "furcon-2024",
            "name": "Furcon 2024",
            "url": "https://furcon.example/2024",
            "venue": "Expo Hall",
            "address": "1 Expo Way",
            "startDate": "2024-03-01",
            "endDate": "2024-03-03",
            "latLng": [25.033, 121.565],
        }))
        .expect("event parses");
        let dtstamp = Utc.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap();

        let feed = render_calendar(&[&event], dtstamp);
        assert!(feed.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(feed.ends_with("END:VCALENDAR\r\n"));
        assert!(feed.contains("DTSTART;VALUE=DATE:20240301\r\n"));
        assert!(feed.contains("DTEND;VALUE=DATE:20240304\r\n"));
        assert!(feed.contains("DTSTAMP:20240302T083000Z\r\n"));
        assert!(feed.contains("LOCATION:Expo Hall\\, 1 Expo Way\r\n"));
        assert!(feed.contains("GEO:25.033000;121.565000\r\n"));
        assert_eq!(feed.matches("BEGIN:VEVENT").count(), 1);
    }

    #[test]
    fn every_physical_line_respects_the_limit() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": "longcon-2024",
            "name": "A".repeat(200),
            "url": "https://longcon.example/2024",
            "venue": "V".repeat(120),
            "startDate": "2024-03-01",
            "endDate": "2024-03-03",
        }))
        .expect("event parses");
        let dtstamp = Utc.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap();

        let feed = render_calendar(&[&event], dtstamp);
        for physical in feed.split("\r\n") {
            assert!(physical.len() <= 75, "physical line too long: {physical}");
        }
    }
}

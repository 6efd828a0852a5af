//! ICS parsing.
//!
//! Line-oriented reader for calendar-interchange text: unfolds continuation
//! lines, walks BEGIN:VEVENT / END:VEVENT blocks and extracts the handful of
//! properties the back-office consumes. One corrupt block never blocks the
//! rest of the file; it is dropped and parsing continues.

use crate::event::{CalendarEvent, EventTime};
use chrono::{NaiveDate, NaiveDateTime};

/// Parse calendar text into events, one per VEVENT block, in source order.
///
/// A block without a usable DTSTART is skipped. A file with zero VEVENT
/// blocks yields an empty vector, not an error.
pub fn parse_calendar(content: &str) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    let mut current: Option<VEventBuilder> = None;
    // Depth of sub-components (VALARM etc.) whose properties must not
    // clobber the enclosing event's.
    let mut nested = 0usize;

    for line in unfold(content) {
        let Some(prop) = ContentLine::parse(&line) else {
            continue;
        };

        if prop.name == "BEGIN" {
            if prop.value.trim().eq_ignore_ascii_case("VEVENT") {
                // A BEGIN inside an unterminated block drops the incomplete one.
                current = Some(VEventBuilder::default());
                nested = 0;
            } else if current.is_some() {
                nested += 1;
            }
        } else if prop.name == "END" {
            if prop.value.trim().eq_ignore_ascii_case("VEVENT") && nested == 0 {
                if let Some(builder) = current.take() {
                    if let Some(event) = builder.build() {
                        events.push(event);
                    }
                }
            } else if nested > 0 {
                nested -= 1;
            }
        } else if nested == 0 {
            if let Some(builder) = current.as_mut() {
                builder.set(prop);
            }
        }
    }

    events
}

/// Rejoin folded lines: a physical line starting with a space or tab
/// continues the previous logical line, leading whitespace stripped.
fn unfold(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in content.lines() {
        if (raw.starts_with(' ') || raw.starts_with('\t')) && !lines.is_empty() {
            if let Some(last) = lines.last_mut() {
                last.push_str(&raw[1..]);
            }
        } else {
            lines.push(raw.to_string());
        }
    }
    lines
}

/// One unfolded `NAME;PARAM=value:value` content line.
struct ContentLine {
    name: String,
    params: Vec<(String, String)>,
    value: String,
}

impl ContentLine {
    fn parse(line: &str) -> Option<ContentLine> {
        // The name/value separator is the first colon outside quotes
        // (parameter values may be quoted and contain colons).
        let mut in_quotes = false;
        let mut split_at = None;
        for (i, ch) in line.char_indices() {
            match ch {
                '"' => in_quotes = !in_quotes,
                ':' if !in_quotes => {
                    split_at = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let colon = split_at?;
        let (head, value) = (&line[..colon], &line[colon + 1..]);

        let mut parts = head.split(';');
        let name = parts.next()?.trim().to_ascii_uppercase();
        if name.is_empty() {
            return None;
        }
        let params = parts
            .filter_map(|p| {
                let (key, val) = p.split_once('=')?;
                Some((
                    key.trim().to_ascii_uppercase(),
                    val.trim().trim_matches('"').to_string(),
                ))
            })
            .collect();

        Some(ContentLine {
            name,
            params,
            value: value.to_string(),
        })
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct VEventBuilder {
    uid: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
}

impl VEventBuilder {
    fn set(&mut self, prop: ContentLine) {
        match prop.name.as_str() {
            "UID" => self.uid = Some(prop.value.trim().to_string()),
            "SUMMARY" => self.summary = Some(unescape_text(&prop.value)),
            "DESCRIPTION" => self.description = Some(unescape_text(&prop.value)),
            "LOCATION" => self.location = Some(unescape_text(&prop.value)),
            "DTSTART" => self.start = parse_date_time(&prop),
            "DTEND" => self.end = parse_date_time(&prop),
            _ => {}
        }
    }

    /// `None` when the block has no usable DTSTART.
    fn build(self) -> Option<CalendarEvent> {
        let start = self.start?;
        Some(CalendarEvent {
            uid: self.uid.filter(|u| !u.is_empty()),
            summary: self.summary.unwrap_or_default(),
            description: self.description,
            location: self.location,
            start,
            end: self.end,
        })
    }
}

/// Parse a DTSTART/DTEND value, honoring `VALUE=DATE` and `TZID=` parameters.
///
/// Accepted forms: `YYYYMMDD`, `YYYYMMDDTHHMMSS` and `YYYYMMDDTHHMMSSZ`.
fn parse_date_time(prop: &ContentLine) -> Option<EventTime> {
    let value = prop.value.trim();

    let is_date = prop
        .param("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE"));
    if is_date || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())) {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .map(EventTime::Date);
    }

    if let Some(stripped) = value.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S")
            .ok()
            .map(|dt| EventTime::Utc(dt.and_utc()));
    }

    match NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S") {
        Ok(dt) => Some(match prop.param("TZID") {
            Some(tzid) => EventTime::Zoned {
                datetime: dt,
                tzid: tzid.to_string(),
            },
            None => EventTime::Floating(dt),
        }),
        // Last resort for producers that omit VALUE=DATE on date values.
        Err(_) => NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .map(EventTime::Date),
    }
}

/// Undo text escaping: `\,` `\;` `\n`/`\N` `\\`. Unknown escapes pass
/// through untouched.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

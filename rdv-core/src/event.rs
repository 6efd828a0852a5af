//! Transient calendar event types.
//!
//! A `CalendarEvent` is what the parser hands to the mapper: it lives for
//! the duration of one import request and is never persisted. Appointments
//! (the persistent side) live in `appointment`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A single parsed VEVENT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// The event's UID property, used downstream for de-duplication.
    pub uid: Option<String>,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: Option<EventTime>,
}

/// A DTSTART/DTEND value as it appears on the wire.
///
/// Date-only values come from `VALUE=DATE` properties (all-day events);
/// the three date-time variants preserve whether the source was UTC
/// (`Z` suffix), zoned (`TZID=` parameter) or floating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    Floating(NaiveDateTime),
    Utc(DateTime<Utc>),
    Zoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// Calendar date of this timestamp.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::Floating(dt) => dt.date(),
            EventTime::Utc(dt) => dt.naive_utc().date(),
            EventTime::Zoned { datetime, .. } => datetime.date(),
        }
    }

    /// Time-of-day, or `None` for an all-day (date-only) value.
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            EventTime::Date(_) => None,
            EventTime::Floating(dt) => Some(dt.time()),
            EventTime::Utc(dt) => Some(dt.naive_utc().time()),
            EventTime::Zoned { datetime, .. } => Some(datetime.time()),
        }
    }

    /// Whether this is a date-only (all-day) value.
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }
}

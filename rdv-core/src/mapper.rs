//! Event-to-appointment mapping.
//!
//! Calendar events arrive with free-text summaries and locations; the rules
//! here turn them into the structured appointment fields the back-office
//! stores. Extraction is best-effort with documented fallbacks and never
//! fails for a structurally valid event.

use std::sync::LazyLock;

use regex::Regex;

use crate::appointment::{Appointment, AppointmentStatus};
use crate::event::CalendarEvent;

/// Recognized summary prefixes, stripped before cabinet extraction.
static SUMMARY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:RDV|Rendez[ -]?vous|Intervention)\s*[:\-]\s*(.+)$").unwrap()
});

/// French postal code followed by a city name (stops at the next comma).
static POSTAL_CITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})\s+([^,]+)").unwrap());

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap()
});

/// French phone numbers: 0X or +33 X followed by four digit pairs.
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\+33[\s.]?|0)[1-9](?:[\s.\-]?\d{2}){4}").unwrap());

/// Convert one parsed event into an appointment ready for persistence.
///
/// Missing optional fields degrade to empty strings or `None`, never to an
/// error. The status is always the workflow's initial state, whatever the
/// source event claimed.
pub fn map_event(event: &CalendarEvent) -> Appointment {
    let (cabinet, type_rdv) = extract_cabinet_type(&event.summary, event.location.as_deref());
    let (adresse, code_postal, ville) = split_location(event.location.as_deref().unwrap_or(""));

    let notes = event.description.clone().unwrap_or_default();
    let telephone = PHONE
        .find(&notes)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let email = EMAIL
        .find(&notes)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Appointment {
        id: None,
        cabinet,
        type_rdv,
        date_rdv: event.start.date(),
        heure_rdv: event.start.time(),
        adresse,
        code_postal,
        ville,
        telephone,
        email,
        statut: AppointmentStatus::initial(),
        notes,
        ics_uid: event.uid.clone(),
    }
}

/// Extract (cabinet, appointment type) from a free-text summary.
///
/// Ordered rules:
/// 1. A recognized prefix (`RDV:`, `Rendez-vous -`, `Intervention:`) is
///    stripped.
/// 2. Text before the first ` - ` separator is the cabinet, text after is
///    the appointment type.
/// 3. Fallback: the whole remaining summary is the cabinet and the type
///    stays empty. An empty summary falls back to the location's first
///    comma-separated segment.
pub fn extract_cabinet_type(summary: &str, location: Option<&str>) -> (String, String) {
    let stripped = SUMMARY_PREFIX
        .captures(summary)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(summary)
        .trim();

    if let Some((cabinet, type_rdv)) = stripped.split_once(" - ") {
        let cabinet = cabinet.trim();
        if !cabinet.is_empty() {
            return (cabinet.to_string(), type_rdv.trim().to_string());
        }
    }

    if stripped.is_empty() {
        if let Some(loc) = location {
            let first = loc.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                return (first.to_string(), String::new());
            }
        }
    }

    (stripped.to_string(), String::new())
}

/// Split a free-text location into (street, postal code, city).
///
/// The postal code anchors the split: everything before it is the street,
/// the word run after it (up to the next comma) is the city. Without a
/// postal code the whole location becomes the street.
fn split_location(location: &str) -> (String, String, String) {
    let location = location.trim();
    if location.is_empty() {
        return (String::new(), String::new(), String::new());
    }

    if let Some(caps) = POSTAL_CITY.captures(location) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let adresse = location[..start]
            .trim_end()
            .trim_end_matches(',')
            .trim_end()
            .to_string();
        return (adresse, caps[1].to_string(), caps[2].trim().to_string());
    }

    (location.to_string(), String::new(), String::new())
}

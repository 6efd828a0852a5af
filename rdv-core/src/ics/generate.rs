//! ICS generation.
//!
//! Produces one VEVENT inside VCALENDAR framing for a stored appointment,
//! with the escaping and 75-octet line folding that the parser undoes.

use crate::appointment::{Appointment, AppointmentStatus};
use chrono::{Duration, Utc};
use uuid::Uuid;

const PRODID: &str = "-//RDV//Back-office//FR";

/// Default appointment duration when no explicit end exists.
const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Maximum physical line length, in octets, before folding.
const MAX_LINE_OCTETS: usize = 75;

/// Generate calendar text for one appointment.
///
/// Timed appointments get `DTEND` = start + one hour; all-day appointments
/// (no `heure_rdv`) use `VALUE=DATE` with `DTEND` on the next day.
pub fn generate_ics(appointment: &Appointment) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("BEGIN:VCALENDAR".to_string());
    lines.push("VERSION:2.0".to_string());
    lines.push(format!("PRODID:{}", PRODID));
    lines.push("BEGIN:VEVENT".to_string());
    lines.push(format!("UID:{}", appointment_uid(appointment)));
    lines.push(format!(
        "DTSTAMP:{}",
        Utc::now().format("%Y%m%dT%H%M%SZ")
    ));

    match appointment.heure_rdv {
        Some(time) => {
            let start = appointment.date_rdv.and_time(time);
            let end = start + Duration::minutes(DEFAULT_DURATION_MINUTES);
            lines.push(format!("DTSTART:{}", start.format("%Y%m%dT%H%M%S")));
            lines.push(format!("DTEND:{}", end.format("%Y%m%dT%H%M%S")));
        }
        None => {
            let next_day = appointment.date_rdv + Duration::days(1);
            lines.push(format!(
                "DTSTART;VALUE=DATE:{}",
                appointment.date_rdv.format("%Y%m%d")
            ));
            lines.push(format!("DTEND;VALUE=DATE:{}", next_day.format("%Y%m%d")));
        }
    }

    lines.push(format!("SUMMARY:{}", escape_text(&summary_line(appointment))));

    let location = location_line(appointment);
    if !location.is_empty() {
        lines.push(format!("LOCATION:{}", escape_text(&location)));
    }

    if !appointment.notes.is_empty() {
        lines.push(format!("DESCRIPTION:{}", escape_text(&appointment.notes)));
    }

    // Only emit non-default status
    if appointment.statut == AppointmentStatus::Cancelled {
        lines.push("STATUS:CANCELLED".to_string());
    }

    lines.push("END:VEVENT".to_string());
    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in lines {
        out.push_str(&fold_line(&line));
        out.push_str("\r\n");
    }
    out
}

/// Download filename: `RDV_<cabinet>_<YYYY-MM-DD>.ics`, non-alphanumeric
/// cabinet characters replaced with underscores.
pub fn export_filename(appointment: &Appointment) -> String {
    let cabinet: String = appointment
        .cabinet
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!(
        "RDV_{}_{}.ics",
        cabinet,
        appointment.date_rdv.format("%Y-%m-%d")
    )
}

/// Stable UID for an appointment.
///
/// Imported appointments keep their source UID verbatim, so a re-export is
/// the same logical event as the original. Otherwise the UID is a UUIDv5
/// over the storage id (or the cabinet/date/time key before persistence),
/// making repeated downloads of the same appointment identical.
fn appointment_uid(appointment: &Appointment) -> String {
    if let Some(uid) = &appointment.ics_uid {
        return uid.clone();
    }
    let key = match appointment.id {
        Some(id) => format!("rdv-{}", id),
        None => format!(
            "{}|{}|{}",
            appointment.cabinet,
            appointment.date_rdv,
            appointment
                .heure_rdv
                .map(|t| t.to_string())
                .unwrap_or_default()
        ),
    };
    format!("{}@rdv", Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()))
}

fn summary_line(appointment: &Appointment) -> String {
    if appointment.type_rdv.is_empty() {
        appointment.cabinet.clone()
    } else {
        format!("{} - {}", appointment.cabinet, appointment.type_rdv)
    }
}

fn location_line(appointment: &Appointment) -> String {
    let city = match (
        appointment.code_postal.is_empty(),
        appointment.ville.is_empty(),
    ) {
        (false, false) => format!("{} {}", appointment.code_postal, appointment.ville),
        (false, true) => appointment.code_postal.clone(),
        (true, false) => appointment.ville.clone(),
        (true, true) => String::new(),
    };
    match (appointment.adresse.is_empty(), city.is_empty()) {
        (false, false) => format!("{}, {}", appointment.adresse, city),
        (false, true) => appointment.adresse.clone(),
        (true, _) => city,
    }
}

/// Escape text values: `\` `,` `;` and newlines. The inverse of the
/// parser's unescaping.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Fold a logical line at 75 octets, continuation lines prefixed with a
/// single space. Splits only on UTF-8 character boundaries.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + 8);
    let mut width = 0;
    for ch in line.chars() {
        let octets = ch.len_utf8();
        if width + octets > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1; // the leading space counts against the limit
        }
        out.push(ch);
        width += octets;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::parse_calendar;
    use crate::mapper::map_event;
    use chrono::{NaiveDate, NaiveTime};

    fn make_appointment() -> Appointment {
        Appointment {
            id: Some(42),
            cabinet: "Cabinet Dupont".to_string(),
            type_rdv: "Maintenance".to_string(),
            date_rdv: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            heure_rdv: Some(NaiveTime::from_hms_opt(9, 30, 0).unwrap()),
            adresse: "12 rue des Lilas".to_string(),
            code_postal: "75011".to_string(),
            ville: "Paris".to_string(),
            telephone: String::new(),
            email: String::new(),
            statut: AppointmentStatus::Planned,
            notes: String::new(),
            ics_uid: None,
        }
    }

    #[test]
    fn test_single_vevent_with_vcalendar_framing() {
        let ics = generate_ics(&make_appointment());

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("VERSION:2.0"));
        assert!(ics.contains("PRODID:"));
    }

    #[test]
    fn test_dtend_is_start_plus_one_hour() {
        let ics = generate_ics(&make_appointment());

        assert!(ics.contains("DTSTART:20240115T093000"));
        assert!(ics.contains("DTEND:20240115T103000"));
    }

    #[test]
    fn test_all_day_appointment_uses_value_date() {
        let mut appointment = make_appointment();
        appointment.heure_rdv = None;

        let ics = generate_ics(&appointment);

        assert!(ics.contains("DTSTART;VALUE=DATE:20240115"));
        assert!(ics.contains("DTEND;VALUE=DATE:20240116"));
    }

    #[test]
    fn test_uid_is_deterministic_per_appointment() {
        let appointment = make_appointment();

        let first = generate_ics(&appointment);
        let second = generate_ics(&appointment);

        let uid_of = |ics: &str| {
            ics.lines()
                .find(|l| l.starts_with("UID:"))
                .map(|l| l.to_string())
                .expect("should have UID line")
        };
        assert_eq!(uid_of(&first), uid_of(&second));
    }

    #[test]
    fn test_imported_appointment_keeps_source_uid() {
        let mut appointment = make_appointment();
        appointment.ics_uid = Some("evt-123@upstream".to_string());

        let ics = generate_ics(&appointment);

        assert!(ics.contains("UID:evt-123@upstream"));
    }

    #[test]
    fn test_commas_and_semicolons_are_escaped_and_reparse() {
        let mut appointment = make_appointment();
        appointment.cabinet = "Durand, Fils; Cie".to_string();
        appointment.type_rdv = String::new();

        let ics = generate_ics(&appointment);

        assert!(
            ics.contains(r"SUMMARY:Durand\, Fils\; Cie"),
            "SUMMARY should be escaped. ICS:\n{}",
            ics
        );

        let events = parse_calendar(&ics);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Durand, Fils; Cie");
    }

    #[test]
    fn test_notes_newlines_escape_and_reparse() {
        let mut appointment = make_appointment();
        appointment.notes = "Ligne 1\nLigne 2".to_string();

        let ics = generate_ics(&appointment);

        assert!(ics.contains(r"DESCRIPTION:Ligne 1\nLigne 2"));
        let events = parse_calendar(&ics);
        assert_eq!(events[0].description.as_deref(), Some("Ligne 1\nLigne 2"));
    }

    #[test]
    fn test_long_lines_are_folded_at_75_octets() {
        let mut appointment = make_appointment();
        appointment.notes = "Intervention de maintenance préventive sur l'ensemble des \
                             équipements du cabinet, avec vérification complète du parc."
            .to_string();

        let ics = generate_ics(&appointment);

        for line in ics.lines() {
            assert!(
                line.len() <= MAX_LINE_OCTETS,
                "physical line exceeds 75 octets: {:?} ({} octets)",
                line,
                line.len()
            );
        }

        // The folded description must survive a parse round-trip
        let events = parse_calendar(&ics);
        assert_eq!(events[0].description.as_deref(), Some(appointment.notes.as_str()));
    }

    #[test]
    fn test_cancelled_status_is_emitted() {
        let mut appointment = make_appointment();
        appointment.statut = AppointmentStatus::Cancelled;

        let ics = generate_ics(&appointment);

        assert!(ics.contains("STATUS:CANCELLED"));
        assert!(!generate_ics(&make_appointment()).contains("STATUS:"));
    }

    #[test]
    fn test_export_filename_replaces_non_alphanumerics() {
        let mut appointment = make_appointment();
        appointment.cabinet = "Cabinet Dupont & Fils".to_string();

        assert_eq!(
            export_filename(&appointment),
            "RDV_Cabinet_Dupont___Fils_2024-01-15.ics"
        );
    }

    #[test]
    fn test_roundtrip_parser_mapper_generator() {
        let source = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n\
                      BEGIN:VEVENT\r\nUID:src-1\r\n\
                      SUMMARY:Cabinet Dupont - Maintenance\r\n\
                      DTSTART:20240115T093000\r\n\
                      END:VEVENT\r\nEND:VCALENDAR\r\n";

        let events = parse_calendar(source);
        let appointment = map_event(&events[0]);
        let regenerated = generate_ics(&appointment);
        let reparsed = parse_calendar(&regenerated);

        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed[0].summary, "Cabinet Dupont - Maintenance");
        assert_eq!(reparsed[0].start.date(), events[0].start.date());
        assert_eq!(reparsed[0].start.time(), events[0].start.time());
        assert_eq!(reparsed[0].uid.as_deref(), Some("src-1"));
    }
}

//! Batch import of calendar files.
//!
//! Parses every VEVENT in an uploaded file, maps each one to an appointment
//! and inserts the ones the store has not seen before. The result is an
//! aggregate summary covering every event, so a partially-duplicated upload
//! still succeeds at the request level.

use serde::Serialize;

use crate::error::{RdvError, RdvResult};
use crate::ics::parse_calendar;
use crate::mapper::map_event;
use crate::store::AppointmentStore;

/// Outcome of one event within an import batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportOutcome {
    Imported,
    Skipped,
    Error,
}

/// Per-event line of the import report.
#[derive(Debug, Clone, Serialize)]
pub struct ImportDetail {
    /// The event's summary, so the report is readable without UIDs.
    pub summary: String,
    pub outcome: ImportOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Aggregate import report returned to the caller.
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
    pub details: Vec<ImportDetail>,
}

impl ImportSummary {
    fn record(&mut self, summary: &str, outcome: ImportOutcome, reason: Option<String>) {
        match outcome {
            ImportOutcome::Imported => self.imported += 1,
            ImportOutcome::Skipped => self.skipped += 1,
            ImportOutcome::Error => self.errors += 1,
        }
        self.details.push(ImportDetail {
            summary: summary.to_string(),
            outcome,
            reason,
        });
    }
}

/// Import every event of `content` into `store`.
///
/// Duplicate detection is two-tier: an `ics_uid` match against an existing
/// appointment wins, then a content match on cabinet + date + time. Both
/// tiers report `skipped` with a reason, never an error. A storage failure
/// on one event is recorded and does not abort the rest of the batch.
///
/// Returns `RdvError::NoEvents` when the file contains no VEVENT block at
/// all; that is a caller-visible rejection, not an empty success.
pub fn import_calendar(
    content: &str,
    store: &mut dyn AppointmentStore,
) -> RdvResult<ImportSummary> {
    let events = parse_calendar(content);
    if events.is_empty() {
        return Err(RdvError::NoEvents);
    }

    let mut summary = ImportSummary::default();
    for event in &events {
        let appointment = map_event(event);

        // Tier 1: external identifier.
        if let Some(uid) = &appointment.ics_uid {
            match store.find_by_ics_uid(uid) {
                Ok(Some(_)) => {
                    summary.record(
                        &event.summary,
                        ImportOutcome::Skipped,
                        Some(format!("already imported (UID {})", uid)),
                    );
                    continue;
                }
                Ok(None) => {}
                Err(err) => {
                    summary.record(&event.summary, ImportOutcome::Error, Some(err.to_string()));
                    continue;
                }
            }
        }

        // Tier 2: content match.
        match store.find_by_slot(
            &appointment.cabinet,
            appointment.date_rdv,
            appointment.heure_rdv,
        ) {
            Ok(Some(_)) => {
                summary.record(
                    &event.summary,
                    ImportOutcome::Skipped,
                    Some(format!(
                        "existing appointment for {} on {}",
                        appointment.cabinet, appointment.date_rdv
                    )),
                );
                continue;
            }
            Ok(None) => {}
            Err(err) => {
                summary.record(&event.summary, ImportOutcome::Error, Some(err.to_string()));
                continue;
            }
        }

        match store.insert(appointment) {
            Ok(_) => summary.record(&event.summary, ImportOutcome::Imported, None),
            Err(err) => {
                summary.record(&event.summary, ImportOutcome::Error, Some(err.to_string()))
            }
        }
    }

    Ok(summary)
}

//! The appointment domain entity.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// An appointment ("rendez-vous") as handed to the storage layer.
///
/// Field names follow the back-office schema. `heure_rdv` is `None` for
/// all-day appointments imported from date-only calendar events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Storage-assigned identifier; `None` until persisted.
    pub id: Option<i64>,
    /// Client site (medical practice) the appointment belongs to.
    pub cabinet: String,
    /// Appointment type (maintenance, installation, ...); free text.
    pub type_rdv: String,
    pub date_rdv: NaiveDate,
    pub heure_rdv: Option<NaiveTime>,
    pub adresse: String,
    pub code_postal: String,
    pub ville: String,
    pub telephone: String,
    pub email: String,
    pub statut: AppointmentStatus,
    pub notes: String,
    /// External identifier carried over from an imported calendar event.
    /// Unique across appointments when present; `None` means duplicate
    /// detection falls back to the cabinet+date+time content check.
    pub ics_uid: Option<String>,
}

/// Appointment workflow status.
///
/// Transitions (mark-done, mark-invoiced, revert-to-planned) are triggered
/// by the surrounding application; the calendar subsystem only ever emits
/// the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Planned,
    Done,
    Invoiced,
    Cancelled,
}

impl AppointmentStatus {
    /// Every imported appointment enters the workflow here.
    pub fn initial() -> Self {
        AppointmentStatus::Planned
    }
}

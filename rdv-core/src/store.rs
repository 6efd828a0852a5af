//! Storage seam for appointments.

use chrono::{NaiveDate, NaiveTime};

use crate::appointment::Appointment;
use crate::error::RdvResult;

/// The persistence boundary of the calendar subsystem.
///
/// The surrounding application backs this with its relational database; the
/// bundled server and the tests use [`MemoryStore`]. Callers run the
/// duplicate lookups and the insert under a single serialization point so
/// two concurrent imports cannot both insert the same `ics_uid`.
pub trait AppointmentStore {
    fn get(&self, id: i64) -> RdvResult<Option<Appointment>>;

    /// Look up an appointment by its imported external identifier.
    fn find_by_ics_uid(&self, uid: &str) -> RdvResult<Option<Appointment>>;

    /// Content lookup: same cabinet on the same date at the same time.
    fn find_by_slot(
        &self,
        cabinet: &str,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> RdvResult<Option<Appointment>>;

    /// Persist an appointment and return its assigned identifier.
    fn insert(&mut self, appointment: Appointment) -> RdvResult<i64>;
}

/// In-memory appointment store.
#[derive(Debug)]
pub struct MemoryStore {
    appointments: Vec<Appointment>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            appointments: Vec::new(),
            next_id: 1,
        }
    }

    pub fn all(&self) -> &[Appointment] {
        &self.appointments
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppointmentStore for MemoryStore {
    fn get(&self, id: i64) -> RdvResult<Option<Appointment>> {
        Ok(self
            .appointments
            .iter()
            .find(|a| a.id == Some(id))
            .cloned())
    }

    fn find_by_ics_uid(&self, uid: &str) -> RdvResult<Option<Appointment>> {
        Ok(self
            .appointments
            .iter()
            .find(|a| a.ics_uid.as_deref() == Some(uid))
            .cloned())
    }

    fn find_by_slot(
        &self,
        cabinet: &str,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> RdvResult<Option<Appointment>> {
        Ok(self
            .appointments
            .iter()
            .find(|a| a.cabinet == cabinet && a.date_rdv == date && a.heure_rdv == time)
            .cloned())
    }

    fn insert(&mut self, mut appointment: Appointment) -> RdvResult<i64> {
        let id = self.next_id;
        self.next_id += 1;
        appointment.id = Some(id);
        self.appointments.push(appointment);
        Ok(id)
    }
}

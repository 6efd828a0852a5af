//! Core types for the RDV back-office calendar subsystem.
//!
//! This crate provides everything between "raw .ics text" and "appointment
//! handed to storage":
//! - `event` — transient parsed calendar events
//! - `ics` — parsing and generation of calendar-interchange text
//! - `mapper` — event-to-appointment conversion rules
//! - `import` — batch import with per-event outcomes and duplicate detection
//! - `store` — the storage seam the surrounding application plugs into

pub mod appointment;
pub mod error;
pub mod event;
pub mod ics;
pub mod import;
pub mod mapper;
pub mod store;

pub use appointment::{Appointment, AppointmentStatus};
pub use error::{RdvError, RdvResult};
pub use event::{CalendarEvent, EventTime};
pub use import::{ImportDetail, ImportOutcome, ImportSummary};
pub use store::{AppointmentStore, MemoryStore};

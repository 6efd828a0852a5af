//! Error types for the RDV calendar subsystem.

use thiserror::Error;

/// Errors that can occur in calendar import/export operations.
#[derive(Error, Debug)]
pub enum RdvError {
    /// The uploaded file contained no VEVENT blocks at all. Distinct from a
    /// successful import where every event was skipped.
    #[error("no events found in file")]
    NoEvents,

    #[error("appointment not found: {0}")]
    AppointmentNotFound(i64),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calendar subsystem operations.
pub type RdvResult<T> = Result<T, RdvError>;

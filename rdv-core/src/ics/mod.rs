//! ICS text parsing and generation.
//!
//! This module handles reading and writing calendar-interchange text
//! (RFC 5545): line folding/unfolding, text escaping, and the date/time
//! value forms the back-office cares about.

mod generate;
mod parse;

pub use generate::{export_filename, generate_ics};
pub use parse::parse_calendar;

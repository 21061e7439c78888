//! Remote calendar adapter.
//!
//! Wraps the remote calendar API: builds recurrence rules and event bodies
//! from medicine fields, and performs create / update / delete, returning
//! opaque event identifiers. Authentication comes from a service credential
//! file read on every operation.

pub mod auth;
pub mod client;
pub mod recurrence;


pub use auth::ServiceCredential;
pub use client::{CalendarClient, EventRequest, DEFAULT_TIMES_PER_DAY};
pub use recurrence::{build_rrule, parse_time_of_day};

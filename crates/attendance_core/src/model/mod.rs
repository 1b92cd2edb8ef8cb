//! Domain model for class days, attendance marks and students.
//!
//! # Responsibility
//! - Define the records shared by the ledger, the calendar and the projector.
//! - Normalize wire dates to calendar-date keys before any comparison.
//!
//! # Invariants
//! - Dates are `NaiveDate` values already reduced to the deployment zone.
//! - `StudentRef` is opaque to everything in this crate.

pub mod attendance;
pub mod calendar_date;
pub mod class_day;
pub mod student;
pub mod validation;

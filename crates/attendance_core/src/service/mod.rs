//! Eligibility use-cases and pure derivations.
//!
//! # Responsibility
//! - `projection`: pure feasibility classification over ledger snapshots.
//! - `calendar_view`: month grid and class-day status table.
//! - `eligibility_service`: orchestration over repository traits.

pub mod calendar_view;
pub mod eligibility_service;
pub mod projection;

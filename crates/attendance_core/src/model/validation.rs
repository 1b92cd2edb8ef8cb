//! Input validation errors shared by model constructors and services.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Malformed or missing caller input. Never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Date input was empty or whitespace only.
    MissingDate,
    /// Date input could not be parsed as a calendar date or date-time.
    InvalidDate(String),
    /// Status input was not one of `P|A|present|absent`.
    InvalidStatus(String),
    /// A required text field was empty after trimming.
    EmptyField(&'static str),
    /// Month outside `1..=12` (or a year chrono cannot represent).
    InvalidMonth(u32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDate => write!(f, "date is required"),
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`"),
            Self::InvalidStatus(value) => {
                write!(f, "invalid attendance status `{value}`; expected P|A")
            }
            Self::EmptyField(field) => write!(f, "{field} cannot be empty"),
            Self::InvalidMonth(month) => write!(f, "invalid month `{month}`"),
        }
    }
}

impl Error for ValidationError {}

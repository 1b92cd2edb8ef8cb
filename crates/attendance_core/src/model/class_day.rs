//! Class-day domain model.
//!
//! # Responsibility
//! - Describe one scheduled session on the shared class calendar.
//! - Carry the policy for repeated dates.
//!
//! # Invariants
//! - `id` is stable and never reused.
//! - Class days are never mutated after creation.

use super::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a class day.
pub type ClassDayId = Uuid;

/// One scheduled session on the class calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDay {
    pub id: ClassDayId,
    /// Calendar date of the session in the deployment zone.
    pub date: NaiveDate,
    /// Short free-text title, e.g. `Lecture 4`.
    pub label: Option<String>,
    pub description: Option<String>,
}

impl ClassDay {
    /// Creates a class day with a generated id.
    ///
    /// Blank label/description values are stored as `None`.
    pub fn new(date: NaiveDate, label: Option<&str>, description: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            label: non_blank(label),
            description: non_blank(description),
        }
    }

    /// Checks text fields written by import paths that bypass [`ClassDay::new`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.label.as_deref().is_some_and(|value| value.trim().is_empty()) {
            return Err(ValidationError::EmptyField("label"));
        }
        if self
            .description
            .as_deref()
            .is_some_and(|value| value.trim().is_empty())
        {
            return Err(ValidationError::EmptyField("description"));
        }
        Ok(())
    }
}

/// How the calendar treats a class day added for a date that already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateClassDayPolicy {
    /// Calendar date is a natural key; a repeated add returns the existing day.
    #[default]
    NaturalKey,
    /// Every add creates a new entry and counts toward total class days.
    Permissive,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{ClassDay, DuplicateClassDayPolicy};
    use chrono::NaiveDate;

    #[test]
    fn new_drops_blank_text() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let day = ClassDay::new(date, Some("  "), Some(" Intro "));
        assert_eq!(day.label, None);
        assert_eq!(day.description.as_deref(), Some("Intro"));
        assert!(day.validate().is_ok());
    }

    #[test]
    fn policy_defaults_to_natural_key() {
        assert_eq!(
            DuplicateClassDayPolicy::default(),
            DuplicateClassDayPolicy::NaturalKey
        );
        let parsed: DuplicateClassDayPolicy = serde_json::from_str("\"permissive\"").unwrap();
        assert_eq!(parsed, DuplicateClassDayPolicy::Permissive);
    }
}

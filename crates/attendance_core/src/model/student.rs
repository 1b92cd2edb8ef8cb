//! Student roster model.

use super::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable student identifier. Also used as the ledger's `StudentRef`.
pub type StudentId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub roll_no: String,
}

impl Student {
    /// Creates a student with a generated id and trimmed fields.
    ///
    /// # Errors
    /// - `EmptyField` when `name` or `roll_no` is blank.
    pub fn new(name: &str, roll_no: &str) -> Result<Self, ValidationError> {
        let student = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            roll_no: roll_no.trim().to_string(),
        };
        student.validate()?;
        Ok(student)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if self.roll_no.trim().is_empty() {
            return Err(ValidationError::EmptyField("roll_no"));
        }
        Ok(())
    }
}

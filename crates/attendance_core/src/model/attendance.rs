//! Attendance ledger records and the per-student lookup index.
//!
//! # Responsibility
//! - Define the `(student, date) -> status` record owned by the ledger.
//! - Index one student's records by calendar date for calendar and
//!   projection lookups.
//!
//! # Invariants
//! - At most one effective status exists per `(student_ref, date)`. The index
//!   still tolerates legacy duplicates: every record is counted, and a
//!   `Present` mark wins over an `Absent` one when resolving a single date.
//!
//! # See also
//! - `service::projection` for the eligibility arithmetic over this index.

use super::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use uuid::Uuid;

/// Opaque student identity as seen by the ledger.
pub type StudentRef = Uuid;

/// Recorded status for one class date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Parses wire status values: `P`, `A`, `present`, `absent` (any case).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "p" | "present" => Ok(Self::Present),
            "a" | "absent" => Ok(Self::Absent),
            _ => Err(ValidationError::InvalidStatus(trimmed.to_string())),
        }
    }

    /// Single-letter storage code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Present => "P",
            Self::Absent => "A",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(Self::Present),
            "A" => Some(Self::Absent),
            _ => None,
        }
    }

    pub fn is_present(self) -> bool {
        self == Self::Present
    }
}

/// One student's status on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_ref: StudentRef,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn new(student_ref: StudentRef, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            student_ref,
            date,
            status,
        }
    }
}

/// Record counts over some slice of the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkCounts {
    /// Records with any status.
    pub recorded: u32,
    /// Records with `Present` status.
    pub present: u32,
}

impl MarkCounts {
    fn add(&mut self, other: MarkCounts) {
        self.recorded += other.recorded;
        self.present += other.present;
    }
}

/// Date-keyed view over one student's attendance records.
#[derive(Debug, Clone, Default)]
pub struct AttendanceIndex {
    by_date: BTreeMap<NaiveDate, MarkCounts>,
    totals: MarkCounts,
}

impl AttendanceIndex {
    /// Builds the index from a materialized record slice.
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let mut index = Self::default();
        for record in records {
            index.insert(record.date, record.status);
        }
        index
    }

    fn insert(&mut self, date: NaiveDate, status: AttendanceStatus) {
        let mark = MarkCounts {
            recorded: 1,
            present: u32::from(status.is_present()),
        };
        self.by_date.entry(date).or_default().add(mark);
        self.totals.add(mark);
    }

    /// Number of records, whatever their status.
    pub fn attended(&self) -> u32 {
        self.totals.recorded
    }

    /// Number of `Present` records.
    pub fn present(&self) -> u32 {
        self.totals.present
    }

    pub fn totals(&self) -> MarkCounts {
        self.totals
    }

    /// Effective status on `date`; `Present` wins over duplicate `Absent` marks.
    pub fn status_on(&self, date: NaiveDate) -> Option<AttendanceStatus> {
        self.by_date.get(&date).map(|counts| {
            if counts.present > 0 {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Absent
            }
        })
    }

    pub fn is_present(&self, date: NaiveDate) -> bool {
        self.by_date
            .get(&date)
            .is_some_and(|counts| counts.present > 0)
    }

    pub fn is_absent(&self, date: NaiveDate) -> bool {
        self.by_date
            .get(&date)
            .is_some_and(|counts| counts.recorded > counts.present)
    }

    /// Counts records dated strictly after `cutoff`.
    pub fn window_after(&self, cutoff: NaiveDate) -> MarkCounts {
        let mut window = MarkCounts::default();
        for counts in self
            .by_date
            .range((Bound::Excluded(cutoff), Bound::Unbounded))
            .map(|(_, counts)| *counts)
        {
            window.add(counts);
        }
        window
    }
}

#[cfg(test)]
mod tests {
    use super::{AttendanceIndex, AttendanceRecord, AttendanceStatus, MarkCounts};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn status_parse_accepts_codes_and_words() {
        assert_eq!(AttendanceStatus::parse("P"), Ok(AttendanceStatus::Present));
        assert_eq!(AttendanceStatus::parse(" absent "), Ok(AttendanceStatus::Absent));
        assert_eq!(
            AttendanceStatus::parse("late"),
            Err(ValidationError::InvalidStatus("late".to_string()))
        );
        assert_eq!(AttendanceStatus::from_code("A"), Some(AttendanceStatus::Absent));
        assert_eq!(AttendanceStatus::from_code("a"), None);
    }

    #[test]
    fn index_counts_every_record_and_prefers_present() {
        let student = Uuid::new_v4();
        let records = vec![
            AttendanceRecord::new(student, day(1), AttendanceStatus::Absent),
            AttendanceRecord::new(student, day(1), AttendanceStatus::Present),
            AttendanceRecord::new(student, day(2), AttendanceStatus::Absent),
        ];
        let index = AttendanceIndex::from_records(&records);

        assert_eq!(index.attended(), 3);
        assert_eq!(index.present(), 1);
        assert_eq!(index.status_on(day(1)), Some(AttendanceStatus::Present));
        assert!(index.is_present(day(1)));
        assert!(index.is_absent(day(1)));
        assert_eq!(index.status_on(day(2)), Some(AttendanceStatus::Absent));
        assert_eq!(index.status_on(day(3)), None);
    }

    #[test]
    fn window_after_excludes_cutoff_date() {
        let student = Uuid::new_v4();
        let records: Vec<_> = (1..=5)
            .map(|d| AttendanceRecord::new(student, day(d), AttendanceStatus::Present))
            .collect();
        let index = AttendanceIndex::from_records(&records);

        assert_eq!(
            index.window_after(day(3)),
            MarkCounts {
                recorded: 2,
                present: 2
            }
        );
        assert_eq!(index.window_after(day(5)), MarkCounts::default());
    }
}

//! Attendance calendar views.
//!
//! # Responsibility
//! - Build the month grid a student dashboard renders.
//! - Build the per-class-day status table used when correcting marks.
//! - Surface ledger records that match no class day.
//!
//! # Invariants
//! - Marks appear only on class days; off-schedule records are never drawn
//!   on the grid even though the projector counts them.
//! - Grids start on Sunday.

use crate::model::attendance::{AttendanceIndex, AttendanceRecord, AttendanceStatus};
use crate::model::class_day::ClassDay;
use crate::model::validation::ValidationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One day on the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_class_day: bool,
    /// Recorded status; only set on class days.
    pub mark: Option<AttendanceStatus>,
}

/// A month of attendance for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthView {
    pub year: i32,
    /// 1-based month number.
    pub month: u32,
    /// Empty cells before the 1st when weeks start on Sunday.
    pub leading_blanks: u32,
    pub days: Vec<CalendarCell>,
}

impl MonthView {
    /// `(year, month)` of the previous month.
    pub fn previous(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    /// `(year, month)` of the next month.
    pub fn next(&self) -> (i32, u32) {
        if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }
}

/// One row of the class-day status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDayStatus {
    pub class_day: ClassDay,
    /// `None` when nothing has been recorded for that date.
    pub status: Option<AttendanceStatus>,
}

/// Builds the month grid for `year`/`month`.
///
/// # Errors
/// - `InvalidMonth` when `month` is outside `1..=12` or the year is out of
///   chrono's range.
pub fn month_view(
    year: i32,
    month: u32,
    class_days: &[ClassDay],
    index: &AttendanceIndex,
    today: NaiveDate,
) -> Result<MonthView, ValidationError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(ValidationError::InvalidMonth(month))?;
    let scheduled: BTreeSet<NaiveDate> = class_days.iter().map(|day| day.date).collect();

    let days = first
        .iter_days()
        .take_while(|date| date.month() == month)
        .map(|date| {
            let is_class_day = scheduled.contains(&date);
            let mark = if !is_class_day {
                None
            } else if index.is_present(date) {
                Some(AttendanceStatus::Present)
            } else if index.is_absent(date) {
                Some(AttendanceStatus::Absent)
            } else {
                None
            };
            CalendarCell {
                date,
                is_today: date == today,
                is_class_day,
                mark,
            }
        })
        .collect();

    Ok(MonthView {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
    })
}

/// Pairs every class day, in calendar order, with its recorded status.
pub fn class_day_statuses(class_days: &[ClassDay], index: &AttendanceIndex) -> Vec<ClassDayStatus> {
    let mut rows: Vec<ClassDayStatus> = class_days
        .iter()
        .map(|day| ClassDayStatus {
            class_day: day.clone(),
            status: index.status_on(day.date),
        })
        .collect();
    rows.sort_by_key(|row| row.class_day.date);
    rows
}

/// Records whose date matches no class day.
pub fn stray_records<'a>(
    class_days: &[ClassDay],
    records: &'a [AttendanceRecord],
) -> Vec<&'a AttendanceRecord> {
    let scheduled: BTreeSet<NaiveDate> = class_days.iter().map(|day| day.date).collect();
    records
        .iter()
        .filter(|record| !scheduled.contains(&record.date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{class_day_statuses, month_view, stray_records};
    use crate::model::attendance::{AttendanceIndex, AttendanceRecord, AttendanceStatus};
    use crate::model::class_day::ClassDay;
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn fixture() -> (Vec<ClassDay>, Vec<AttendanceRecord>) {
        let student = Uuid::new_v4();
        let class_days = vec![
            ClassDay::new(date(2, 12), Some("Lecture 3"), None),
            ClassDay::new(date(2, 5), Some("Lecture 1"), None),
            ClassDay::new(date(2, 7), Some("Lecture 2"), None),
        ];
        let records = vec![
            AttendanceRecord::new(student, date(2, 5), AttendanceStatus::Present),
            AttendanceRecord::new(student, date(2, 7), AttendanceStatus::Absent),
            AttendanceRecord::new(student, date(2, 10), AttendanceStatus::Present),
        ];
        (class_days, records)
    }

    #[test]
    fn month_view_marks_only_class_days() {
        let (class_days, records) = fixture();
        let index = AttendanceIndex::from_records(&records);
        let view = month_view(2024, 2, &class_days, &index, date(2, 7)).unwrap();

        assert_eq!(view.days.len(), 29);
        // 2024-02-01 is a Thursday.
        assert_eq!(view.leading_blanks, 4);

        let cell = |d: u32| &view.days[(d - 1) as usize];
        assert_eq!(cell(5).mark, Some(AttendanceStatus::Present));
        assert_eq!(cell(7).mark, Some(AttendanceStatus::Absent));
        assert!(cell(7).is_today);
        assert!(!cell(10).is_class_day);
        assert_eq!(cell(10).mark, None);
        assert!(cell(12).is_class_day);
        assert_eq!(cell(12).mark, None);
    }

    #[test]
    fn month_view_navigation_wraps_years() {
        let index = AttendanceIndex::default();
        let january = month_view(2024, 1, &[], &index, date(1, 1)).unwrap();
        assert_eq!(january.previous(), (2023, 12));
        assert_eq!(january.next(), (2024, 2));

        let december = month_view(2024, 12, &[], &index, date(1, 1)).unwrap();
        assert_eq!(december.next(), (2025, 1));
    }

    #[test]
    fn month_view_rejects_invalid_month() {
        let index = AttendanceIndex::default();
        assert_eq!(
            month_view(2024, 13, &[], &index, date(1, 1)),
            Err(ValidationError::InvalidMonth(13))
        );
    }

    #[test]
    fn status_table_is_sorted_and_reports_missing_marks() {
        let (class_days, records) = fixture();
        let index = AttendanceIndex::from_records(&records);
        let rows = class_day_statuses(&class_days, &index);

        let summary: Vec<_> = rows
            .iter()
            .map(|row| (row.class_day.date, row.status))
            .collect();
        assert_eq!(
            summary,
            vec![
                (date(2, 5), Some(AttendanceStatus::Present)),
                (date(2, 7), Some(AttendanceStatus::Absent)),
                (date(2, 12), None),
            ]
        );
    }

    #[test]
    fn stray_records_lists_off_schedule_marks() {
        let (class_days, records) = fixture();
        let stray = stray_records(&class_days, &records);
        assert_eq!(stray.len(), 1);
        assert_eq!(stray[0].date, date(2, 10));
    }
}

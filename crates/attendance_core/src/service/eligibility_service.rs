//! Attendance eligibility use-case service.
//!
//! # Responsibility
//! - Parse wire inputs (dates, statuses) before they reach storage.
//! - Route every attendance write through the single upsert-by-date path.
//! - Recompute projections and calendar views from fresh repository reads.
//!
//! # Invariants
//! - No derived state is cached; each read reflects the latest ledger.
//! - Storage errors propagate unchanged; nothing is retried here.
//! - Log lines carry student refs and dates only, never names.

use crate::config::EngineConfig;
use crate::model::attendance::{AttendanceIndex, AttendanceRecord, AttendanceStatus, StudentRef};
use crate::model::calendar_date::{calendar_date_of, parse_calendar_date};
use crate::model::class_day::{ClassDay, DuplicateClassDayPolicy};
use crate::model::validation::ValidationError;
use crate::repo::attendance_repo::AttendanceLedger;
use crate::repo::class_day_repo::ClassDayRepository;
use crate::repo::RepoError;
use crate::service::calendar_view::{self, ClassDayStatus, MonthView};
use crate::service::projection::{self, EligibilityProjection};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for eligibility use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller input was malformed or missing.
    Validation(ValidationError),
    /// Storage collaborator failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Facade over the class calendar and the attendance ledger.
pub struct EligibilityService<C: ClassDayRepository, L: AttendanceLedger> {
    calendar: C,
    ledger: L,
    config: EngineConfig,
}

impl<C: ClassDayRepository, L: AttendanceLedger> EligibilityService<C, L> {
    pub fn new(calendar: C, ledger: L, config: EngineConfig) -> Self {
        Self {
            calendar,
            ledger,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full class calendar, date ascending.
    pub fn list_class_days(&self) -> ServiceResult<Vec<ClassDay>> {
        Ok(self.calendar.list_class_days()?)
    }

    /// Adds a class day from a wire date.
    ///
    /// Under `NaturalKey` a repeated date returns the existing class day
    /// instead of creating a second one.
    pub fn add_class_day(
        &self,
        date: &str,
        label: Option<&str>,
        description: Option<&str>,
    ) -> ServiceResult<ClassDay> {
        let date = parse_calendar_date(date, &self.config.zone())?;
        let candidate = ClassDay::new(date, label, description);

        let stored = match self.config.duplicate_class_days {
            DuplicateClassDayPolicy::NaturalKey => {
                self.calendar.insert_class_day_if_date_absent(&candidate)?
            }
            DuplicateClassDayPolicy::Permissive => self.calendar.insert_class_day(&candidate)?,
        };

        if stored.id == candidate.id {
            info!("event=class_day_add module=service status=ok date={date}");
        } else {
            info!(
                "event=class_day_add module=service status=duplicate date={date} existing_id={}",
                stored.id
            );
        }
        Ok(stored)
    }

    /// Whether `date` is on the class calendar.
    pub fn is_class_day(&self, date: NaiveDate) -> ServiceResult<bool> {
        Ok(self.calendar.has_class_day_on(date)?)
    }

    /// Whether the deployment-local date of `now` is a class day; marking
    /// through `record_initial` is only offered when this holds.
    pub fn is_class_day_today(&self, now: DateTime<Utc>) -> ServiceResult<bool> {
        self.is_class_day(self.config.today(now))
    }

    /// Records a status for the deployment-local date of `at`.
    ///
    /// Shares the upsert path, so calling it twice on one day corrects the
    /// mark rather than adding a second record.
    pub fn record_initial(
        &self,
        student_ref: StudentRef,
        status: &str,
        at: DateTime<Utc>,
    ) -> ServiceResult<AttendanceRecord> {
        let status = AttendanceStatus::parse(status)?;
        let date = calendar_date_of(at, &self.config.zone());
        self.write_mark(AttendanceRecord::new(student_ref, date, status))
    }

    /// Sets the status for `(student_ref, date)`, creating the record if needed.
    pub fn upsert_by_date(
        &self,
        student_ref: StudentRef,
        date: &str,
        status: &str,
    ) -> ServiceResult<AttendanceRecord> {
        let date = parse_calendar_date(date, &self.config.zone())?;
        let status = AttendanceStatus::parse(status)?;
        self.write_mark(AttendanceRecord::new(student_ref, date, status))
    }

    pub fn list_for_student(&self, student_ref: StudentRef) -> ServiceResult<Vec<AttendanceRecord>> {
        Ok(self.ledger.list_for_student(student_ref)?)
    }

    /// Projects eligibility as of `today`.
    pub fn project_for_student(
        &self,
        student_ref: StudentRef,
        today: NaiveDate,
    ) -> ServiceResult<EligibilityProjection> {
        let records = self.ledger.list_for_student(student_ref)?;
        let class_days = self.calendar.list_class_days()?;

        let stray = calendar_view::stray_records(&class_days, &records).len();
        if stray > 0 {
            debug!(
                "event=eligibility_project module=service student_ref={student_ref} stray_records={stray}"
            );
        }

        let total_class_days = self.calendar.count_class_days()?;
        let projection = projection::project(
            &records,
            total_class_days,
            today,
            &self.config.eligibility,
        );
        info!(
            "event=eligibility_project module=service status=ok student_ref={student_ref} verdict={} attended={} present={} total={}",
            projection.verdict.name(),
            projection.tally.attended,
            projection.tally.present,
            total_class_days
        );
        Ok(projection)
    }

    /// Projects eligibility as of the deployment-local date of `now`.
    pub fn project_for_student_at(
        &self,
        student_ref: StudentRef,
        now: DateTime<Utc>,
    ) -> ServiceResult<EligibilityProjection> {
        self.project_for_student(student_ref, self.config.today(now))
    }

    /// Month grid for one student.
    pub fn month_view(
        &self,
        student_ref: StudentRef,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> ServiceResult<MonthView> {
        let class_days = self.calendar.list_class_days()?;
        let records = self.ledger.list_for_student(student_ref)?;
        let index = AttendanceIndex::from_records(&records);
        Ok(calendar_view::month_view(
            year,
            month,
            &class_days,
            &index,
            today,
        )?)
    }

    /// Class-day status table for one student.
    pub fn class_day_statuses(&self, student_ref: StudentRef) -> ServiceResult<Vec<ClassDayStatus>> {
        let class_days = self.calendar.list_class_days()?;
        let records = self.ledger.list_for_student(student_ref)?;
        let index = AttendanceIndex::from_records(&records);
        Ok(calendar_view::class_day_statuses(&class_days, &index))
    }

    fn write_mark(&self, record: AttendanceRecord) -> ServiceResult<AttendanceRecord> {
        match self.ledger.upsert_by_date(&record) {
            Ok(stored) => {
                info!(
                    "event=attendance_upsert module=service status=ok student_ref={} date={} mark={}",
                    stored.student_ref,
                    stored.date,
                    stored.status.code()
                );
                Ok(stored)
            }
            Err(err) => {
                warn!(
                    "event=attendance_upsert module=service status=error student_ref={} date={} error={err}",
                    record.student_ref, record.date
                );
                Err(err.into())
            }
        }
    }
}

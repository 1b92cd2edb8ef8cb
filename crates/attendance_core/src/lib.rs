//! Attendance eligibility engine.
//!
//! Tracks per-student attendance against the class calendar and projects
//! whether a student can still reach the attendance target.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, EngineConfig, UtcOffset};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attendance::{
    AttendanceIndex, AttendanceRecord, AttendanceStatus, MarkCounts, StudentRef,
};
pub use model::calendar_date::{calendar_date_of, parse_calendar_date};
pub use model::class_day::{ClassDay, ClassDayId, DuplicateClassDayPolicy};
pub use model::student::{Student, StudentId};
pub use model::validation::ValidationError;
pub use repo::attendance_repo::{AttendanceLedger, SqliteAttendanceLedger};
pub use repo::class_day_repo::{ClassDayRepository, SqliteClassDayRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::calendar_view::{CalendarCell, ClassDayStatus, MonthView};
pub use service::eligibility_service::{EligibilityService, ServiceError, ServiceResult};
pub use service::projection::{
    project, AttendanceTally, EligibilityPolicy, EligibilityProjection, Verdict,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

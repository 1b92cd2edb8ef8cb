//! Attendance ledger contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist one status per `(student_ref, calendar date)`.
//! - Serve per-student snapshots to the projector and calendar views.
//!
//! # Invariants
//! - `upsert_by_date` is a single `INSERT .. ON CONFLICT DO UPDATE` statement;
//!   concurrent upserts for the same key cannot both insert.
//! - Ledger rows are never deleted.

use super::{ensure_tables, parse_stored_date, parse_uuid, RepoError, RepoResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, StudentRef};
use crate::model::calendar_date::format_date_key;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for the attendance ledger.
pub trait AttendanceLedger {
    /// Writes `record.status` for `(record.student_ref, record.date)`,
    /// overwriting any existing status for that key.
    fn upsert_by_date(&self, record: &AttendanceRecord) -> RepoResult<AttendanceRecord>;
    /// Looks up the record stored for one student and date.
    fn get_record(
        &self,
        student_ref: StudentRef,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>>;
    /// Returns every record for `student_ref`.
    fn list_for_student(&self, student_ref: StudentRef) -> RepoResult<Vec<AttendanceRecord>>;
}

/// SQLite-backed attendance ledger.
pub struct SqliteAttendanceLedger<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceLedger<'conn> {
    /// Constructs a ledger from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["attendance"])?;
        Ok(Self { conn })
    }
}

impl AttendanceLedger for SqliteAttendanceLedger<'_> {
    fn upsert_by_date(&self, record: &AttendanceRecord) -> RepoResult<AttendanceRecord> {
        let date_key = format_date_key(record.date);
        self.conn.execute(
            "INSERT INTO attendance (student_ref, class_date, status)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (student_ref, class_date) DO UPDATE SET
                status = excluded.status,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                record.student_ref.to_string(),
                date_key,
                record.status.code()
            ],
        )?;

        self.get_record(record.student_ref, record.date)?
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "attendance for `{}` on `{date_key}` missing after upsert",
                    record.student_ref
                ))
            })
    }

    fn get_record(
        &self,
        student_ref: StudentRef,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_ref, class_date, status
             FROM attendance
             WHERE student_ref = ?1
               AND class_date = ?2;",
        )?;
        let raw = stmt
            .query_row(
                params![student_ref.to_string(), format_date_key(date)],
                read_raw_row,
            )
            .optional()?;
        raw.map(RawAttendance::into_record).transpose()
    }

    fn list_for_student(&self, student_ref: StudentRef) -> RepoResult<Vec<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_ref, class_date, status
             FROM attendance
             WHERE student_ref = ?1
             ORDER BY class_date ASC;",
        )?;
        let mut rows = stmt.query([student_ref.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(read_raw_row(row)?.into_record()?);
        }
        Ok(records)
    }
}

struct RawAttendance {
    student_ref: String,
    class_date: String,
    status: String,
}

impl RawAttendance {
    fn into_record(self) -> RepoResult<AttendanceRecord> {
        let status = AttendanceStatus::from_code(&self.status).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid status `{}` in attendance.status",
                self.status
            ))
        })?;
        Ok(AttendanceRecord {
            student_ref: parse_uuid(&self.student_ref, "attendance.student_ref")?,
            date: parse_stored_date(&self.class_date, "attendance.class_date")?,
            status,
        })
    }
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawAttendance> {
    Ok(RawAttendance {
        student_ref: row.get("student_ref")?,
        class_date: row.get("class_date")?,
        status: row.get("status")?,
    })
}

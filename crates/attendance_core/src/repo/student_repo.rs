//! Student roster repository.
//!
//! # Responsibility
//! - CRUD over the `students` table.
//! - Exact name + roll-number lookup for the serving layer's identity check.
//!
//! # Invariants
//! - Write paths call `Student::validate()` before SQL mutations.
//! - Deleting a student leaves its ledger rows in place.
//! - Listing puts `"2"` before `"10"`; non-numeric rolls follow in text order.

use super::{ensure_tables, parse_uuid, RepoError, RepoResult};
use crate::model::student::{Student, StudentId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::cmp::Ordering;

const STUDENT_SELECT_SQL: &str = "SELECT uuid, name, roll_no FROM students";

pub trait StudentRepository {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// All students ordered by roll number; numeric rolls compare by value.
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    fn update_student(&self, student: &Student) -> RepoResult<()>;
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
    /// Exact match on trimmed `name` and `roll_no`.
    fn find_by_name_and_roll(&self, name: &str, roll_no: &str) -> RepoResult<Option<Student>>;
}

pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["students"])?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId> {
        student.validate()?;

        self.conn.execute(
            "INSERT INTO students (uuid, name, roll_no) VALUES (?1, ?2, ?3);",
            params![
                student.id.to_string(),
                student.name.trim(),
                student.roll_no.trim()
            ],
        )?;
        Ok(student.id)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let student = stmt
            .query_row([id.to_string()], read_raw_row)
            .optional()?;
        student.map(RawStudent::into_student).transpose()
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY roll_no ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(read_raw_row(row)?.into_student()?);
        }
        students.sort_by(|left, right| compare_roll_numbers(&left.roll_no, &right.roll_no));
        Ok(students)
    }

    fn update_student(&self, student: &Student) -> RepoResult<()> {
        student.validate()?;

        let changed = self.conn.execute(
            "UPDATE students
             SET
                name = ?1,
                roll_no = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?3;",
            params![
                student.name.trim(),
                student.roll_no.trim(),
                student.id.to_string()
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(student.id));
        }
        Ok(())
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn find_by_name_and_roll(&self, name: &str, roll_no: &str) -> RepoResult<Option<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL}
             WHERE name = ?1
               AND roll_no = ?2
             ORDER BY uuid ASC
             LIMIT 1;"
        ))?;
        let student = stmt
            .query_row(params![name.trim(), roll_no.trim()], read_raw_row)
            .optional()?;
        student.map(RawStudent::into_student).transpose()
    }
}

/// Numeric rolls sort by value and ahead of free-form rolls, which sort as text.
fn compare_roll_numbers(left: &str, right: &str) -> Ordering {
    match (left.parse::<u64>(), right.parse::<u64>()) {
        (Ok(l), Ok(r)) => l.cmp(&r).then_with(|| left.cmp(right)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

struct RawStudent {
    uuid: String,
    name: String,
    roll_no: String,
}

impl RawStudent {
    fn into_student(self) -> RepoResult<Student> {
        let student = Student {
            id: parse_uuid(&self.uuid, "students.uuid")?,
            name: self.name,
            roll_no: self.roll_no,
        };
        student.validate()?;
        Ok(student)
    }
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawStudent> {
    Ok(RawStudent {
        uuid: row.get("uuid")?,
        name: row.get("name")?,
        roll_no: row.get("roll_no")?,
    })
}

#[cfg(test)]
mod tests {
    use super::compare_roll_numbers;
    use std::cmp::Ordering;

    #[test]
    fn numeric_rolls_compare_by_value_before_text_rolls() {
        assert_eq!(compare_roll_numbers("2", "10"), Ordering::Less);
        assert_eq!(compare_roll_numbers("10", "CS-01"), Ordering::Less);
        assert_eq!(compare_roll_numbers("CS-02", "CS-01"), Ordering::Greater);
        assert_eq!(compare_roll_numbers("01", "1"), Ordering::Less);
    }
}

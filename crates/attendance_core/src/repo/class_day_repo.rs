//! Class calendar provider contract and SQLite implementation.
//!
//! # Responsibility
//! - Store and list the shared set of class days.
//! - Apply natural-key insertion when duplicate dates are not wanted.
//!
//! # Invariants
//! - Listing is ordered by date ascending, then insertion order.
//! - Class days are append-only; there is no update or delete path.

use super::{ensure_tables, parse_stored_date, parse_uuid, RepoError, RepoResult};
use crate::model::calendar_date::format_date_key;
use crate::model::class_day::ClassDay;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

const CLASS_DAY_SELECT_SQL: &str = "SELECT
    uuid,
    class_date,
    label,
    description
FROM class_days";

/// Repository interface for the class calendar.
pub trait ClassDayRepository {
    /// Appends a class day unconditionally.
    fn insert_class_day(&self, day: &ClassDay) -> RepoResult<ClassDay>;
    /// Inserts `day` unless its date already exists; returns the stored day
    /// for that date either way.
    fn insert_class_day_if_date_absent(&self, day: &ClassDay) -> RepoResult<ClassDay>;
    /// Full calendar ordered by date ascending.
    fn list_class_days(&self) -> RepoResult<Vec<ClassDay>>;
    /// Same count as `list_class_days().len()`.
    fn count_class_days(&self) -> RepoResult<u32>;
    /// Whether any class day falls on `date`.
    fn has_class_day_on(&self, date: NaiveDate) -> RepoResult<bool>;
}

/// SQLite-backed class calendar.
pub struct SqliteClassDayRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClassDayRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["class_days"])?;
        Ok(Self { conn })
    }

    fn first_on_date(&self, date: NaiveDate) -> RepoResult<Option<ClassDay>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CLASS_DAY_SELECT_SQL}
             WHERE class_date = ?1
             ORDER BY seq ASC
             LIMIT 1;"
        ))?;
        let raw = stmt
            .query_row([format_date_key(date)], read_raw_row)
            .optional()?;
        raw.map(RawClassDay::into_class_day).transpose()
    }
}

impl ClassDayRepository for SqliteClassDayRepository<'_> {
    fn insert_class_day(&self, day: &ClassDay) -> RepoResult<ClassDay> {
        day.validate()?;

        self.conn.execute(
            "INSERT INTO class_days (uuid, class_date, label, description)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                day.id.to_string(),
                format_date_key(day.date),
                day.label.as_deref(),
                day.description.as_deref(),
            ],
        )?;

        Ok(day.clone())
    }

    fn insert_class_day_if_date_absent(&self, day: &ClassDay) -> RepoResult<ClassDay> {
        day.validate()?;

        let date_key = format_date_key(day.date);
        self.conn.execute(
            "INSERT INTO class_days (uuid, class_date, label, description)
             SELECT ?1, ?2, ?3, ?4
             WHERE NOT EXISTS (
                SELECT 1 FROM class_days WHERE class_date = ?2
             );",
            params![
                day.id.to_string(),
                date_key,
                day.label.as_deref(),
                day.description.as_deref(),
            ],
        )?;

        self.first_on_date(day.date)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "class day for `{date_key}` missing after insert"
            ))
        })
    }

    fn list_class_days(&self) -> RepoResult<Vec<ClassDay>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CLASS_DAY_SELECT_SQL} ORDER BY class_date ASC, seq ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut days = Vec::new();
        while let Some(row) = rows.next()? {
            days.push(read_raw_row(row)?.into_class_day()?);
        }
        Ok(days)
    }

    fn count_class_days(&self) -> RepoResult<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM class_days;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn has_class_day_on(&self, date: NaiveDate) -> RepoResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM class_days WHERE class_date = ?1);",
            [format_date_key(date)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

struct RawClassDay {
    uuid: String,
    class_date: String,
    label: Option<String>,
    description: Option<String>,
}

impl RawClassDay {
    fn into_class_day(self) -> RepoResult<ClassDay> {
        let day = ClassDay {
            id: parse_uuid(&self.uuid, "class_days.uuid")?,
            date: parse_stored_date(&self.class_date, "class_days.class_date")?,
            label: self.label,
            description: self.description,
        };
        day.validate()?;
        Ok(day)
    }
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawClassDay> {
    Ok(RawClassDay {
        uuid: row.get("uuid")?,
        class_date: row.get("class_date")?,
        label: row.get("label")?,
        description: row.get("description")?,
    })
}

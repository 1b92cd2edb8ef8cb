//! Ordered schema scripts for the attendance store.
//!
//! Version 1 creates the roster and the class calendar; version 2 adds the
//! ledger keyed by `(student_ref, class_date)`, which is what makes
//! upsert-by-date a single statement. The applied version lives in
//! `PRAGMA user_version` and only moves forward.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "class_calendar",
        sql: include_str!("0001_class_calendar.sql"),
    },
    Migration {
        version: 2,
        name: "attendance_ledger",
        sql: include_str!("0002_attendance_ledger.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to [`latest_version`] in one transaction.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store is ahead of this build.
/// - `Migration` naming the script that failed; earlier scripts in the same
///   call are rolled back with it.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let pending = pending_after(current)?;
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending {
        tx.execute_batch(migration.sql)
            .and_then(|()| {
                tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            })
            .map_err(|source| {
                error!(
                    "event=db_migrate module=db status=error version={} name={}",
                    migration.version, migration.name
                );
                DbError::Migration {
                    version: migration.version,
                    source,
                }
            })?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;
    Ok(())
}

fn pending_after(current: u32) -> DbResult<&'static [Migration]> {
    let latest = latest_version();
    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    let applied = MIGRATIONS
        .iter()
        .take_while(|migration| migration.version <= current)
        .count();
    Ok(&MIGRATIONS[applied..])
}

//! CLI probe for the attendance engine.
//!
//! # Responsibility
//! - Without arguments, print the linked core version.
//! - With `<db_path> <student_id> [config.json]`, project one student for
//!   today and print the projection as JSON.
//! - When `ATTENDANCE_LOG_DIR` is set, write engine logs there.

use attendance_core::db::open_db;
use attendance_core::{
    default_log_level, init_logging, EligibilityService, EngineConfig, SqliteAttendanceLedger,
    SqliteClassDayRepository,
};
use std::error::Error;
use std::process::ExitCode;
use uuid::Uuid;

const USAGE: &str = "usage: attendance_cli [<db_path> <student_id> [config.json]]";
const LOG_DIR_ENV: &str = "ATTENDANCE_LOG_DIR";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        println!("attendance_core version={}", attendance_core::core_version());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<String, Box<dyn Error>> {
    let (db_path, student_id, config_path) = match args {
        [db_path, student_id] => (db_path, student_id, None),
        [db_path, student_id, config_path] => (db_path, student_id, Some(config_path)),
        _ => return Err(USAGE.into()),
    };

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        init_logging(default_log_level(), &log_dir)?;
    }

    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let student_ref = Uuid::parse_str(student_id.trim())
        .map_err(|err| format!("invalid student id `{student_id}`: {err}"))?;

    let conn = open_db(db_path)?;
    let service = EligibilityService::new(
        SqliteClassDayRepository::try_new(&conn)?,
        SqliteAttendanceLedger::try_new(&conn)?,
        config,
    );
    let projection = service.project_for_student_at(student_ref, chrono::Utc::now())?;
    log::debug!(
        "event=cli_project module=cli status=ok verdict={}",
        projection.verdict.name()
    );
    Ok(serde_json::to_string_pretty(&projection)?)
}

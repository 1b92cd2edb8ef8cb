use attendance_core::db::open_db_in_memory;
use attendance_core::{
    AttendanceStatus, DuplicateClassDayPolicy, EligibilityService, EngineConfig, ServiceError,
    SqliteAttendanceLedger, SqliteClassDayRepository, ValidationError, Verdict,
};
use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::Connection;
use uuid::Uuid;

type SqliteService<'conn> =
    EligibilityService<SqliteClassDayRepository<'conn>, SqliteAttendanceLedger<'conn>>;

fn service(conn: &Connection, config: EngineConfig) -> SqliteService<'_> {
    EligibilityService::new(
        SqliteClassDayRepository::try_new(conn).unwrap(),
        SqliteAttendanceLedger::try_new(conn).unwrap(),
        config,
    )
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

#[test]
fn add_class_day_dedupes_by_default_and_can_be_permissive() {
    let conn = open_db_in_memory().unwrap();
    let natural = service(&conn, EngineConfig::default());
    let first = natural.add_class_day("2024-03-01", Some("Lecture"), None).unwrap();
    let again = natural
        .add_class_day("2024-03-01T10:00:00Z", Some("Lecture"), None)
        .unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(natural.list_class_days().unwrap().len(), 1);

    let permissive = service(
        &conn,
        EngineConfig {
            duplicate_class_days: DuplicateClassDayPolicy::Permissive,
            ..EngineConfig::default()
        },
    );
    permissive.add_class_day("2024-03-01", None, None).unwrap();
    assert_eq!(permissive.list_class_days().unwrap().len(), 2);
}

#[test]
fn add_class_day_rejects_missing_and_bad_dates() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, EngineConfig::default());

    assert!(matches!(
        service.add_class_day("", None, None),
        Err(ServiceError::Validation(ValidationError::MissingDate))
    ));
    assert!(matches!(
        service.add_class_day("03/01/2024", None, None),
        Err(ServiceError::Validation(ValidationError::InvalidDate(_)))
    ));
    assert!(service.list_class_days().unwrap().is_empty());
}

#[test]
fn record_initial_and_upsert_share_one_record_per_day() {
    let conn = open_db_in_memory().unwrap();
    let config = EngineConfig::from_json_str(r#"{ "utc_offset": "+05:00" }"#).unwrap();
    let service = service(&conn, config);
    let student = Uuid::new_v4();

    // 20:30 UTC is already the next day at +05:00.
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 20, 30, 0).unwrap();
    let initial = service.record_initial(student, "P", at).unwrap();
    assert_eq!(initial.date, date(3, 2));

    let again = service.record_initial(student, "A", at).unwrap();
    assert_eq!(again.status, AttendanceStatus::Absent);

    let corrected = service
        .upsert_by_date(student, "2024-03-01T21:00:00Z", "present")
        .unwrap();
    assert_eq!(corrected.date, date(3, 2));

    let records = service.list_for_student(student).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendanceStatus::Present);
}

#[test]
fn upsert_twice_leaves_one_record_with_that_status() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, EngineConfig::default());
    let student = Uuid::new_v4();

    service.upsert_by_date(student, "2024-03-05", "A").unwrap();
    service.upsert_by_date(student, "2024-03-05", "A").unwrap();

    let records = service.list_for_student(student).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendanceStatus::Absent);
}

#[test]
fn invalid_status_is_rejected_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, EngineConfig::default());
    let student = Uuid::new_v4();

    let err = service
        .upsert_by_date(student, "2024-03-05", "late")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::InvalidStatus(_))
    ));
    assert!(service.list_for_student(student).unwrap().is_empty());
}

#[test]
fn projection_reflects_latest_ledger_state() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, EngineConfig::default());
    let student = Uuid::new_v4();
    let today = date(3, 25);

    for day in 1..=20 {
        service
            .add_class_day(&format!("2024-03-{day:02}"), None, None)
            .unwrap();
    }
    assert_eq!(
        service.project_for_student(student, today).unwrap().verdict,
        Verdict::InsufficientData
    );

    for day in 1..=10 {
        let status = if day <= 6 { "P" } else { "A" };
        service
            .upsert_by_date(student, &format!("2024-03-{day:02}"), status)
            .unwrap();
    }
    let projection = service.project_for_student(student, today).unwrap();
    assert_eq!(
        projection.verdict,
        Verdict::AtRisk {
            recent_pct: 60.0,
            needed_present: 9,
            remaining: 10,
        }
    );

    for day in 7..=10 {
        service
            .upsert_by_date(student, &format!("2024-03-{day:02}"), "P")
            .unwrap();
    }
    let projection = service.project_for_student(student, today).unwrap();
    assert_eq!(projection.verdict, Verdict::OnTrack { current_pct: 100.0 });
}

#[test]
fn stray_records_count_toward_attendance() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, EngineConfig::default());
    let student = Uuid::new_v4();

    service.add_class_day("2024-03-04", None, None).unwrap();
    service.add_class_day("2024-03-05", None, None).unwrap();
    service.upsert_by_date(student, "2024-03-04", "P").unwrap();
    service.upsert_by_date(student, "2024-03-09", "P").unwrap();

    let projection = service.project_for_student(student, date(3, 10)).unwrap();
    assert_eq!(projection.tally.attended, 2);
    assert_eq!(projection.tally.remaining, 0);

    let statuses = service.class_day_statuses(student).unwrap();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].status, Some(AttendanceStatus::Present));
    assert_eq!(statuses[1].status, None);
}

#[test]
fn month_view_reads_calendar_and_ledger() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, EngineConfig::default());
    let student = Uuid::new_v4();

    service.add_class_day("2024-03-04", Some("Lecture"), None).unwrap();
    service.upsert_by_date(student, "2024-03-04", "A").unwrap();

    let view = service.month_view(student, 2024, 3, date(3, 4)).unwrap();
    assert_eq!(view.days.len(), 31);
    let monday = &view.days[3];
    assert!(monday.is_class_day && monday.is_today);
    assert_eq!(monday.mark, Some(AttendanceStatus::Absent));

    assert!(matches!(
        service.month_view(student, 2024, 0, date(3, 4)),
        Err(ServiceError::Validation(ValidationError::InvalidMonth(0)))
    ));
}

#[test]
fn class_day_today_follows_the_deployment_zone() {
    let conn = open_db_in_memory().unwrap();
    let ist = EngineConfig::from_json_str(r#"{ "utc_offset": "+05:30" }"#).unwrap();
    let local = service(&conn, ist);
    local.add_class_day("2024-03-02", Some("Lab"), None).unwrap();

    // 20:00Z on the 1st is already 01:30 on the 2nd at +05:30.
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
    assert!(local.is_class_day_today(now).unwrap());
    assert!(local.is_class_day(date(3, 2)).unwrap());
    assert!(!local.is_class_day(date(3, 1)).unwrap());

    let utc = service(&conn, EngineConfig::default());
    assert!(!utc.is_class_day_today(now).unwrap());
}

#[test]
fn projection_total_counts_every_class_day() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, EngineConfig::default());
    let student = Uuid::new_v4();

    for day in ["2024-04-01", "2024-04-02", "2024-04-03"] {
        service.add_class_day(day, None, None).unwrap();
    }
    service.upsert_by_date(student, "2024-04-01", "P").unwrap();
    // Off-schedule mark still counts as attended.
    service.upsert_by_date(student, "2024-04-06", "P").unwrap();

    let projection = service.project_for_student(student, date(4, 6)).unwrap();
    assert_eq!(projection.tally.total_class_days, 3);
    assert_eq!(projection.tally.attended, 2);
    assert_eq!(projection.tally.remaining, 1);
}

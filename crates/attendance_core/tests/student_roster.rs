use attendance_core::db::open_db_in_memory;
use attendance_core::{
    RepoError, SqliteStudentRepository, Student, StudentRepository, ValidationError,
};
use uuid::Uuid;

#[test]
fn create_get_and_list_by_roll_number() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let second = Student::new("Meera", "CS-02").unwrap();
    let first = Student::new(" Arjun ", "CS-01").unwrap();
    repo.create_student(&second).unwrap();
    let id = repo.create_student(&first).unwrap();

    let loaded = repo.get_student(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Arjun");

    let rolls: Vec<_> = repo
        .list_students()
        .unwrap()
        .into_iter()
        .map(|student| student.roll_no)
        .collect();
    assert_eq!(rolls, vec!["CS-01", "CS-02"]);
}

#[test]
fn list_orders_numeric_roll_numbers_by_value() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    for (name, roll) in [("Kiran", "10"), ("Divya", "CS-07"), ("Arjun", "2"), ("Meera", "1")] {
        repo.create_student(&Student::new(name, roll).unwrap()).unwrap();
    }

    let rolls: Vec<_> = repo
        .list_students()
        .unwrap()
        .into_iter()
        .map(|student| student.roll_no)
        .collect();
    assert_eq!(rolls, vec!["1", "2", "10", "CS-07"]);
}

#[test]
fn find_by_name_and_roll_requires_both_to_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let student = Student::new("Arjun", "CS-01").unwrap();
    repo.create_student(&student).unwrap();

    assert_eq!(
        repo.find_by_name_and_roll(" Arjun ", "CS-01").unwrap(),
        Some(student)
    );
    assert_eq!(repo.find_by_name_and_roll("Arjun", "CS-02").unwrap(), None);
    assert_eq!(repo.find_by_name_and_roll("Meera", "CS-01").unwrap(), None);
}

#[test]
fn update_and_delete_report_missing_students() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let mut student = Student::new("Arjun", "CS-01").unwrap();
    repo.create_student(&student).unwrap();
    student.roll_no = "CS-11".to_string();
    repo.update_student(&student).unwrap();
    assert_eq!(
        repo.get_student(student.id).unwrap().unwrap().roll_no,
        "CS-11"
    );

    repo.delete_student(student.id).unwrap();
    assert!(repo.get_student(student.id).unwrap().is_none());

    let missing = Uuid::new_v4();
    assert!(matches!(
        repo.delete_student(missing),
        Err(RepoError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        repo.update_student(&student),
        Err(RepoError::NotFound(id)) if id == student.id
    ));
}

#[test]
fn blank_fields_are_rejected_before_sql() {
    assert_eq!(
        Student::new("  ", "CS-01").unwrap_err(),
        ValidationError::EmptyField("name")
    );

    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let mut student = Student::new("Arjun", "CS-01").unwrap();
    student.roll_no = String::new();
    assert!(matches!(
        repo.create_student(&student),
        Err(RepoError::Validation(ValidationError::EmptyField("roll_no")))
    ));
}

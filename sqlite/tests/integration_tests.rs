//! Integration tests for the checkin-roster-sqlite crate.

use std::path::{Path, PathBuf};

use checkin_roster_core::{RosterError, RosterLayout};
use checkin_roster_sqlite::{
    Importer, LATEST_SCHEMA_VERSION, Migration, SqliteError, StudentStore, open_store,
};
use rusqlite::Connection;

/// Header row of the registration form export, all four child slots.
fn full_header(layout: &RosterLayout) -> Vec<String> {
    let g = &layout.guardian;
    let mut header = vec![
        g.primary_name.clone(),
        g.primary_phone.clone(),
        g.primary_wechat.clone(),
        g.primary_email.clone(),
        g.secondary_name.clone(),
    ];
    for slot in 1..=layout.max_children {
        header.push(layout.child_name_header(slot));
        header.push(layout.child_grade_header(slot));
    }
    header
}

fn write_roster(dir: &Path, header: &[String], rows: &[&[&str]]) -> PathBuf {
    let path = dir.join("roster.csv");
    let mut wtr = csv::Writer::from_path(&path).unwrap();
    wtr.write_record(header).unwrap();
    for row in rows {
        wtr.write_record(*row).unwrap();
    }
    wtr.flush().unwrap();
    path
}

/// One family: 张三 / 李华 with Tom (Grade 7) and Amy (K1-3).
fn sample_roster(dir: &Path) -> PathBuf {
    let layout = RosterLayout::default();
    write_roster(
        dir,
        &full_header(&layout),
        &[&[
            "张三", "555-1234", "zhangsan_wx", "", "李华", "Tom", "Grade 7", "Amy", "K1-3", "", "",
            "", "",
        ]],
    )
}

// =============================================================================
// End-to-end import
// =============================================================================

#[test]
fn test_import_end_to_end_example() {
    let dir = tempfile::tempdir().unwrap();
    let source = sample_roster(dir.path());
    let db = dir.path().join("checkin.db");

    let report = Importer::new(RosterLayout::default())
        .run(&source, &db)
        .unwrap();
    assert!(!report.dry_run);
    assert_eq!(report.rows_read, 1);
    assert_eq!(report.students_inserted, 2);
    assert_eq!(report.slots_skipped, 0);

    let conn = Connection::open(&db).unwrap();
    let store = StudentStore::new(&conn);
    let students = store.all_students().unwrap();
    assert_eq!(students.len(), 2);

    let tom = &students[0];
    assert_eq!(tom.name, "Tom");
    assert_eq!(tom.grade.as_deref(), Some("7+"));
    assert_eq!(tom.father_name.as_deref(), Some("张三"));
    assert_eq!(tom.mother_name.as_deref(), Some("李华"));
    assert_eq!(tom.phone_number.as_deref(), Some("555-1234"));
    assert_eq!(tom.wechat_id.as_deref(), Some("zhangsan_wx"));
    assert_eq!(tom.email, None);
    assert_eq!(tom.authorized_pickup_person, None);

    let amy = &students[1];
    assert_eq!(amy.name, "Amy");
    assert_eq!(amy.grade.as_deref(), Some("K-3"));
    assert_eq!(amy.father_name, tom.father_name);
    assert_eq!(amy.phone_number, tom.phone_number);
}

#[test]
fn test_reimport_duplicates_rows() {
    let dir = tempfile::tempdir().unwrap();
    let source = sample_roster(dir.path());
    let db = dir.path().join("checkin.db");
    let importer = Importer::new(RosterLayout::default());

    let first = importer.run(&source, &db).unwrap();
    let second = importer.run(&source, &db).unwrap();
    assert_eq!(first.migrations.applied.len() as u32, LATEST_SCHEMA_VERSION);
    assert!(second.migrations.is_empty());

    let conn = Connection::open(&db).unwrap();
    let store = StudentStore::new(&conn);
    assert_eq!(store.count_students().unwrap(), 2 * 2);

    let ids: Vec<i64> = store
        .all_students()
        .unwrap()
        .into_iter()
        .filter_map(|s| s.id)
        .collect();
    assert_eq!(ids, [1, 2, 3, 4]);
}

#[test]
fn test_sparse_slots_keep_slot_order() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RosterLayout::default();
    let source = write_roster(
        dir.path(),
        &full_header(&layout),
        &[
            &[
                "Sam Zhang", "", "", "", "", "First", "4~6", "", "", "Third", "PreK", "", "",
            ],
            &[
                "Li Wei", "", "", "", "", "", "", "HalfSlot", "", "", "", "Fourth", "Nursery",
            ],
        ],
    );
    let db = dir.path().join("checkin.db");

    let report = Importer::new(layout).run(&source, &db).unwrap();
    assert_eq!(report.rows_read, 2);
    assert_eq!(report.slots_skipped, 1);

    let names: Vec<&str> = report.students.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["First", "Third", "Fourth"]);
    let grades: Vec<&str> = report
        .students
        .iter()
        .filter_map(|s| s.grade.as_deref())
        .collect();
    assert_eq!(grades, ["4-6", "PreK", "Nursery"]);
}

#[test]
fn test_authorized_pickup_column_is_read_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RosterLayout::default();
    let mut header = full_header(&layout);
    header.push(layout.guardian.authorized_pickup.clone());
    let source = write_roster(
        dir.path(),
        &header,
        &[&[
            "张三", "", "", "", "", "Tom", "7", "", "", "", "", "", "", " Grandma Wang ",
        ]],
    );
    let db = dir.path().join("checkin.db");

    let report = Importer::new(layout).run(&source, &db).unwrap();
    assert_eq!(
        report.students[0].authorized_pickup_person.as_deref(),
        Some("Grandma Wang")
    );
}

#[test]
fn test_custom_slot_count() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RosterLayout::default().with_max_children(6);
    let header = full_header(&layout);
    let mut row = vec!["P"; header.len()];
    row[header.len() - 2] = "Sixth";
    row[header.len() - 1] = "4-6";
    let source = write_roster(dir.path(), &header, &[row.as_slice()]);
    let db = dir.path().join("checkin.db");

    let report = Importer::new(layout).run(&source, &db).unwrap();
    // Every slot holds "P"/"P" except the sixth.
    assert_eq!(report.students_inserted, 6);
    assert_eq!(report.students[5].name, "Sixth");
    assert_eq!(report.students[5].grade.as_deref(), Some("4-6"));
}

// =============================================================================
// Schema evolution
// =============================================================================

#[test]
fn test_import_migrates_legacy_students_table() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("checkin.db");
    {
        // Layout created by the check-in service before contact columns existed.
        let conn = Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TABLE students (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                grade TEXT NOT NULL,
                father_name TEXT,
                mother_name TEXT
            );
            INSERT INTO students (name, grade) VALUES ('Existing', '4-6');",
        )
        .unwrap();
    }

    let source = sample_roster(dir.path());
    let report = Importer::new(RosterLayout::default())
        .run(&source, &db)
        .unwrap();
    assert!(
        report
            .migrations
            .columns_added
            .contains(&"students.authorized_pickup_person".to_string())
    );
    assert!(
        report
            .migrations
            .columns_added
            .contains(&"students.phone_number".to_string())
    );

    let conn = Connection::open(&db).unwrap();
    let store = StudentStore::new(&conn);
    let students = store.all_students().unwrap();
    assert_eq!(students.len(), 3);
    assert_eq!(students[0].name, "Existing");
    assert_eq!(students[0].id, Some(1));
    assert_eq!(students[0].authorized_pickup_person, None);
    assert_eq!(students[0].phone_number, None);
    assert_eq!(students[1].name, "Tom");
}

#[test]
fn test_import_after_students_table_recreated() {
    let dir = tempfile::tempdir().unwrap();
    let source = sample_roster(dir.path());
    let db = dir.path().join("checkin.db");
    let importer = Importer::new(RosterLayout::default());
    importer.run(&source, &db).unwrap();

    {
        let conn = Connection::open(&db).unwrap();
        conn.execute_batch(
            "DROP TABLE checkouts;
            DROP TABLE students;
            CREATE TABLE students (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                grade TEXT NOT NULL,
                father_name TEXT,
                mother_name TEXT
            );",
        )
        .unwrap();
    }

    let report = importer.run(&source, &db).unwrap();
    assert!(report.migrations.applied.is_empty());
    assert!(
        report
            .migrations
            .columns_added
            .contains(&"students.wechat_id".to_string())
    );
    assert_eq!(report.students_inserted, 2);

    let conn = Connection::open(&db).unwrap();
    let students = StudentStore::new(&conn).all_students().unwrap();
    assert_eq!(students[0].wechat_id.as_deref(), Some("zhangsan_wx"));
}

#[test]
fn test_migration_status_after_import() {
    let dir = tempfile::tempdir().unwrap();
    let source = sample_roster(dir.path());
    let db = dir.path().join("checkin.db");
    Importer::new(RosterLayout::default())
        .run(&source, &db)
        .unwrap();

    let migration = Migration::new(open_store(&db).unwrap()).unwrap();
    let status = migration.status().unwrap();
    assert_eq!(status.schema_version, Some(LATEST_SCHEMA_VERSION));
    assert!(status.pending.is_empty());
    assert!(status.students_exists);
    assert!(status.checkouts_exists);
    assert_eq!(status.student_count, 2);
    assert_eq!(status.checkout_count, 0);
}

// =============================================================================
// Failure modes
// =============================================================================

#[test]
fn test_missing_required_column_aborts_before_store() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RosterLayout::default();
    let header = vec![layout.child_name_header(1), layout.child_grade_header(1)];
    let source = write_roster(dir.path(), &header, &[&["Tom", "7"]]);
    let db = dir.path().join("checkin.db");

    let err = Importer::new(layout).run(&source, &db).unwrap_err();
    assert!(matches!(
        err,
        SqliteError::Roster(RosterError::MissingColumns(_))
    ));
    assert!(!db.exists());
}

#[test]
fn test_missing_source_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Importer::new(RosterLayout::default())
        .run(dir.path().join("nope.csv"), dir.path().join("checkin.db"))
        .unwrap_err();
    assert!(matches!(
        err,
        SqliteError::Roster(RosterError::FileError { .. })
    ));
}

#[test]
fn test_non_utf8_source_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("roster.csv");
    let layout = RosterLayout::default();
    let mut bytes = format!("{}\n", layout.guardian.primary_name).into_bytes();
    bytes.extend_from_slice(b"\xff\xfe\xfd\n");
    std::fs::write(&source, bytes).unwrap();

    let err = Importer::new(layout)
        .run(&source, dir.path().join("checkin.db"))
        .unwrap_err();
    assert!(matches!(
        err,
        SqliteError::Roster(RosterError::FormatError(_))
    ));
}

#[test]
fn test_unwritable_destination() {
    let dir = tempfile::tempdir().unwrap();
    let source = sample_roster(dir.path());
    let err = Importer::new(RosterLayout::default())
        .run(&source, dir.path().join("missing").join("checkin.db"))
        .unwrap_err();
    assert!(matches!(err, SqliteError::OpenError { .. }));
}

#[test]
fn test_dry_run_never_creates_store() {
    let dir = tempfile::tempdir().unwrap();
    let source = sample_roster(dir.path());
    let db = dir.path().join("checkin.db");

    let report = Importer::new(RosterLayout::default())
        .dry_run(true)
        .run(&source, &db)
        .unwrap();
    assert!(report.dry_run);
    assert_eq!(report.students.len(), 2);
    assert_eq!(report.students_inserted, 0);
    assert!(report.students.iter().all(|s| s.id.is_none()));
    assert!(!db.exists());
}

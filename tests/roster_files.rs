//! Imports from workbook files on disk into a file-backed database.

use rust_xlsxwriter::Workbook as XlsxWriter;
use tempfile::TempDir;

use rusty_roster::database::StudentStore;
use rusty_roster::spreadsheet::Workbook;
use rusty_roster::validation::{ErrorPolicy, Schema, Validator};
use rusty_roster::{ImportMode, ImportOutcome, RosterService};

fn write_roster(dir: &TempDir, name: &str, rows: &[[&str; 4]]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut workbook = XlsxWriter::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Roster").unwrap();
    for (row, values) in rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row as u32, col as u16, *value).unwrap();
            }
        }
    }
    workbook.save(&path).unwrap();
    path
}

#[test]
fn validates_workbook_opened_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_roster(
        &dir,
        "students.xlsx",
        &[["Name", "Age", "Email", "GraduationYear"], ["Ann", "20", "ann@x.com", "2025"]],
    );

    let workbook = Workbook::open(&path).unwrap();
    assert_eq!(workbook.name, "students.xlsx");
    assert_eq!(workbook.first_sheet().unwrap().name, "Roster");

    let schema = Schema::students();
    let result = Validator::new(&schema).validate(&workbook);
    assert!(result.is_valid(), "{:?}", result.errors);
    let row = &result.rows[0];
    assert_eq!(row.text("Name"), Some("Ann"));
    assert_eq!(row.integer("Age"), Some(20));
    assert_eq!(row.text("Email"), Some("ann@x.com"));
    assert_eq!(row.integer("GraduationYear"), Some(2025));
}

#[test]
fn imports_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("roster.duckdb");
    let roster = write_roster(
        &dir,
        "students.xlsx",
        &[
            ["Name", "Age", "Email", "GraduationYear"],
            ["Ann", "20", "ann@x.com", "2025"],
            ["Bob", "30", "bob@x.com", "2026"],
        ],
    );

    {
        let service = RosterService::new(StudentStore::open(&database).unwrap(), ErrorPolicy::default());
        let outcome = service
            .import(std::fs::read(&roster).unwrap(), "students.xlsx", ImportMode::Insert { replace: false })
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Imported { inserted: 2, updated: 0 });
    }

    let store = StudentStore::open(&database).unwrap();
    assert_eq!(store.count().unwrap(), 2);
    let students = store.list().unwrap();
    assert_eq!(students[0].name, "Ann");
    assert_eq!(students[1].email, "bob@x.com");
}

#[test]
fn rejected_file_does_not_touch_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("roster.duckdb");
    let good = write_roster(
        &dir,
        "good.xlsx",
        &[["Name", "Age", "Email", "GraduationYear"], ["Ann", "20", "ann@x.com", "2025"]],
    );
    let bad = write_roster(
        &dir,
        "bad.xlsx",
        &[
            ["Name", "Age", "Email", "GraduationYear"],
            ["Bob", "30", "bob@x.com", "2026"],
            ["Cid", "4", "cid@x.com", "2026"],
        ],
    );

    let service = RosterService::new(StudentStore::open(&database).unwrap(), ErrorPolicy::default());
    service
        .import(std::fs::read(&good).unwrap(), "good.xlsx", ImportMode::Insert { replace: false })
        .unwrap();

    let outcome = service
        .import(std::fs::read(&bad).unwrap(), "bad.xlsx", ImportMode::Insert { replace: true })
        .unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Rejected {
            errors: vec!["Row 3: 'Age' must be at least 5.".to_string()]
        }
    );

    let students = service.students().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].name, "Ann");
}

//! Import, export and listing of student rosters.
//!
//! [`RosterService`] ties the spreadsheet reader, the validator and the
//! student store together. A workbook that fails validation never reaches the
//! store.

use crate::database::NewStudent;
use crate::database::Student;
use crate::database::StudentStore;
use crate::error::ResultMessage;
use crate::error::RosterError;
use crate::spreadsheet::writer::write_table;
use crate::spreadsheet::Workbook;
use crate::validation::ErrorPolicy;
use crate::validation::Schema;
use crate::validation::ValidationResult;
use crate::validation::Validator;
use std::sync::Mutex;
use std::sync::MutexGuard;
use tracing::info;
use tracing::warn;

pub const EXPORT_SHEET_NAME: &str = "Students";

/// How validated rows are written to the store.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImportMode {
    /// Append every row with a fresh id, optionally deleting all students first.
    Insert { replace: bool },
    /// Update rows whose `Id` exists, insert the rest.
    Upsert,
}

impl ImportMode {
    fn schema(&self) -> Schema {
        match self {
            ImportMode::Insert { .. } => Schema::students(),
            ImportMode::Upsert => Schema::students_with_id(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Validation failed; nothing was written.
    Rejected { errors: Vec<String> },
    Imported { inserted: usize, updated: usize },
}

pub struct RosterService {
    store: Mutex<StudentStore>,
    policy: ErrorPolicy,
}

impl RosterService {
    pub fn new(store: StudentStore, policy: ErrorPolicy) -> Self {
        Self {
            store: Mutex::new(store),
            policy,
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Parses and validates a workbook without touching the store.
    pub fn check(&self, bytes: Vec<u8>, name: &str, mode: ImportMode) -> Result<ValidationResult, RosterError> {
        let workbook = Workbook::from_bytes(name, bytes).with_prefix(&format!("Cannot read '{}'", name))?;
        let schema = mode.schema();
        Ok(Validator::with_policy(&schema, self.policy).validate(&workbook))
    }

    /// Validates a workbook and, when every row passes, writes it to the store.
    pub fn import(&self, bytes: Vec<u8>, name: &str, mode: ImportMode) -> Result<ImportOutcome, RosterError> {
        let result = self.check(bytes, name, mode)?;
        if !result.is_valid() {
            warn!(file = name, errors = result.errors.len(), "rejected roster upload");
            return Ok(ImportOutcome::Rejected { errors: result.errors });
        }

        let drafts = result
            .rows
            .iter()
            .map(NewStudent::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut store = self.lock()?;
        let (inserted, updated) = match mode {
            ImportMode::Insert { replace } => (store.insert_all(&drafts, replace)?, 0),
            ImportMode::Upsert => {
                let count = store.upsert_all(&drafts)?;
                (count.inserted, count.updated)
            }
        };
        info!(file = name, inserted, updated, "imported roster");
        Ok(ImportOutcome::Imported { inserted, updated })
    }

    /// All stored students as `.xlsx` bytes, one row per student.
    pub fn export(&self) -> Result<Vec<u8>, RosterError> {
        let students = self.students()?;
        let rows: Vec<_> = students.iter().map(Student::to_fields).collect();
        let bytes = write_table(EXPORT_SHEET_NAME, &Student::COLUMNS, rows.iter().map(|row| row.as_slice()))?;
        info!(students = students.len(), bytes = bytes.len(), "exported roster");
        Ok(bytes)
    }

    pub fn students(&self) -> Result<Vec<Student>, RosterError> {
        self.lock()?.list()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StudentStore>, RosterError> {
        self.store.lock().map_err(|_| RosterError::StoreUnavailable)
    }
}

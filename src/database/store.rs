use crate::database::student::NewStudent;
use crate::database::student::Student;
use crate::error::RosterError;
use duckdb::params;
use duckdb::Connection;
use duckdb::Transaction;
use serde::Serialize;
use std::path::Path;
use tracing::debug;
use tracing::info;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS students (
    id BIGINT PRIMARY KEY,
    name VARCHAR NOT NULL,
    age BIGINT NOT NULL,
    email VARCHAR NOT NULL,
    graduation_year BIGINT NOT NULL
)";

const INSERT: &str =
    "INSERT INTO students (id, name, age, email, graduation_year) VALUES (?, ?, ?, ?, ?)";

/// Row counts of an upsert batch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpsertCount {
    pub inserted: usize,
    pub updated: usize,
}

/// The `students` table of one DuckDB database.
pub struct StudentStore {
    conn: Connection,
}

impl StudentStore {
    /// Opens (or creates) a file-backed database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening student database");
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, RosterError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, RosterError> {
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self { conn })
    }

    /// Appends all drafts in one transaction, optionally clearing the table first.
    /// Draft ids are ignored; new ids continue after the current maximum.
    pub fn insert_all(&mut self, drafts: &[NewStudent], replace: bool) -> Result<usize, RosterError> {
        let tx = self.conn.transaction()?;
        if replace {
            let removed = tx.execute("DELETE FROM students", [])?;
            debug!(removed, "cleared students before insert");
        }
        let mut id = next_id(&tx)?;
        for draft in drafts {
            insert(&tx, id, draft)?;
            id += 1;
        }
        tx.commit()?;
        info!(inserted = drafts.len(), replace, "inserted students");
        Ok(drafts.len())
    }

    /// Inserts or updates each draft in one transaction.
    ///
    /// A positive id that exists updates that row, a positive id that does not
    /// exist is inserted as given, and anything else gets the next free id.
    pub fn upsert_all(&mut self, drafts: &[NewStudent]) -> Result<UpsertCount, RosterError> {
        let tx = self.conn.transaction()?;
        let mut count = UpsertCount::default();
        for draft in drafts {
            match draft.id.filter(|id| *id > 0) {
                Some(id) if exists(&tx, id)? => {
                    tx.execute(
                        "UPDATE students SET name = ?, age = ?, email = ?, graduation_year = ? WHERE id = ?",
                        params![draft.name, draft.age, draft.email, draft.graduation_year, id],
                    )?;
                    count.updated += 1;
                }
                Some(id) => {
                    insert(&tx, id, draft)?;
                    count.inserted += 1;
                }
                None => {
                    let id = next_id(&tx)?;
                    insert(&tx, id, draft)?;
                    count.inserted += 1;
                }
            }
        }
        tx.commit()?;
        info!(inserted = count.inserted, updated = count.updated, "upserted students");
        Ok(count)
    }

    /// All students ordered by id.
    pub fn list(&self) -> Result<Vec<Student>, RosterError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, age, email, graduation_year FROM students ORDER BY id")?;
        let students = stmt
            .query_map([], |row| {
                Ok(Student {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    age: row.get(2)?,
                    email: row.get(3)?,
                    graduation_year: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    pub fn count(&self) -> Result<usize, RosterError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn next_id(tx: &Transaction<'_>) -> Result<i64, RosterError> {
    Ok(tx.query_row(
        "SELECT CAST(COALESCE(MAX(id), 0) + 1 AS BIGINT) FROM students",
        [],
        |row| row.get(0),
    )?)
}

fn exists(tx: &Transaction<'_>, id: i64) -> Result<bool, RosterError> {
    let count: i64 = tx.query_row("SELECT COUNT(*) FROM students WHERE id = ?", params![id], |row| {
        row.get(0)
    })?;
    Ok(count > 0)
}

fn insert(tx: &Transaction<'_>, id: i64, draft: &NewStudent) -> Result<(), RosterError> {
    tx.execute(
        INSERT,
        params![id, draft.name, draft.age, draft.email, draft.graduation_year],
    )?;
    Ok(())
}

//! DuckDB-backed persistence of validated student rows.
pub mod store;
pub mod student;

pub use store::StudentStore;
pub use store::UpsertCount;
pub use student::NewStudent;
pub use student::Student;

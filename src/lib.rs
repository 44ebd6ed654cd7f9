//! # Rusty Roster
//!
//! Spreadsheet-driven student roster management: upload an Excel workbook,
//! validate every row against a column schema, persist the accepted rows in
//! DuckDB and export the table back to Excel.
//!
//! ## Features
//!
//! - **Pure Rust xlsx reader**: shared strings, inline strings, numbers,
//!   booleans and positional cells, read straight from the zip package
//! - **Schema validation**: required columns, length limits and integer bounds,
//!   with row-level messages such as `Row 3: 'Age' must be at most 100.`
//! - **Error policies**: halt at the first invalid row or collect every error
//! - **Insert and upsert imports**: one transaction per upload
//! - **Export**: all students as an `.xlsx` attachment
//! - **HTTP API and CLI**: axum server plus `import`, `check` and `export`
//!   commands sharing the same service
//!
//! ## Endpoints
//!
//! - `GET /health`
//! - `GET /api/students`
//! - `POST /api/students/upload?replace=true|false`
//! - `POST /api/students/upsert`
//! - `GET /api/students/export`
pub mod config;
pub mod database;
pub mod error;
pub mod helpers;
pub mod http_server;
pub mod logging;
pub mod service;
pub mod spreadsheet;
pub mod validation;

pub use error::RosterError;
pub use service::ImportMode;
pub use service::ImportOutcome;
pub use service::RosterService;

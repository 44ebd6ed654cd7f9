//! # Spreadsheet Processing Module
//!
//! Reads Excel 2007+ packages (`.xlsx`) into an in-memory [`Workbook`] of
//! [`Sheet`]s and writes tabular data back out as `.xlsx`.
pub mod cell;
pub(crate) mod reference;
pub mod sheet;
pub mod writer;
pub(crate) mod xlsx;

use crate::error::RosterError;
use crate::helpers::reader::SourceReader;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::path::Path;
use thiserror::Error;

pub use cell::Cell;
pub use cell::CellType;
pub use sheet::Record;
pub use sheet::Sheet;

/// Custom error types for spreadsheet operations.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Content is not an xlsx package
    #[error("Cannot detect spreadsheet format for '{0}'")]
    InvalidFileFormat(String),

    /// A required part of the package is absent
    #[error("Missing package part '{0}'")]
    MissingPart(String),

    /// A cell reference is malformed or lies outside the worksheet grid
    #[error("Invalid cell reference '{0}'")]
    InvalidCellReference(String),

    /// A row number is malformed or lies outside the worksheet grid
    #[error("Invalid row number '{0}'")]
    InvalidRowNumber(String),

    /// A cell refers to a shared string that does not exist
    #[error("Shared string index {0} is out of range")]
    InvalidSharedString(usize),
}

/// All worksheets of one spreadsheet file, in workbook order.
#[derive(Clone, Debug, Default)]
pub struct Workbook {
    /// File name of the spreadsheet
    pub name: String,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Wraps already-built sheets.
    pub fn new(name: &str, sheets: Vec<Sheet>) -> Self {
        Self {
            name: name.to_owned(),
            sheets,
        }
    }

    /// Parses an xlsx package from a reader.
    pub fn read(name: &str, reader: SourceReader) -> Result<Self, RosterError> {
        XlsxSpreadsheet::open(name, reader)?.read()
    }

    /// Parses uploaded xlsx bytes.
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<Self, RosterError> {
        Self::read(name, SourceReader::from_bytes(bytes))
    }

    /// Parses an xlsx file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::read(&name, SourceReader::open(path)?)
    }

    /// The worksheet that uploads are read from.
    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }
}

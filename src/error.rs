use thiserror::Error;

/// Main error type for the roster service.
/// Aggregates errors from the standard library, third-party crates and internal modules.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    DuckDBError(#[from] duckdb::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    XlsxWriterError(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0}")]
    ConfigError(#[from] toml::de::Error),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Validation module errors
    #[error("{0}")]
    SchemaError(#[from] crate::validation::schema::SchemaError),

    // Database module errors
    #[error("Validated row {row} has no value for '{column}'")]
    MissingField { row: usize, column: String },

    #[error("Student store is unavailable after a failed operation")]
    StoreUnavailable,

    #[error("Failed to initialise logging: {0}")]
    LoggingError(String),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RosterError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RosterError::WithContextError(format!("{}: {}", message, e)))
    }
}

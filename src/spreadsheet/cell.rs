use crate::spreadsheet::reference::index_to_reference;
use std::fmt::Display;

/// Types of cell data in spreadsheet files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table entries, already resolved to their text
    SharedString,
    /// Error values such as `#N/A`
    Error,
}

impl CellType {
    /// Maps the `t` attribute of an xlsx `<c>` element to a cell type.
    pub(crate) fn from_xlsx_attribute(value: Option<&str>) -> Self {
        match value {
            Some("inlineStr") | Some("str") => CellType::InlineString,
            Some("s") => CellType::SharedString,
            Some("d") => CellType::IsoDateTime,
            Some("b") => CellType::Boolean,
            Some("e") => CellType::Error,
            _ => CellType::Number,
        }
    }
}

/// Represents a single cell in a spreadsheet with position, type, and value.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    /// Cell data type
    pub kind: CellType,
    /// Cell value as string
    pub value: String,
}

impl Cell {
    /// Creates a text cell.
    pub fn text(row: usize, col: usize, value: impl Into<String>) -> Self {
        Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: value.into(),
        }
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            CellType::Empty => Ok(()),
            CellType::Boolean => write!(f, "{}", if self.value == "1" { "true" } else { "false" }),
            CellType::Number => write!(f, "{}", to_number_string(&self.value)),
            CellType::IsoDateTime => write!(f, "{}", self.value.replace('T', " ")),
            _ => write!(f, "{}", self.value),
        }
    }
}

/// Drops an all-zero fraction so integral numbers read back as integers (`2025.0` -> `2025`).
fn to_number_string(value: &str) -> &str {
    match value.find('.') {
        Some(index) if value[(index + 1)..].chars().all(|char| char == '0') => &value[..index],
        _ => value,
    }
}

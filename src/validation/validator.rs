//! Row validation of an uploaded worksheet against a [`Schema`].
//!
//! The validator maps the header row to schema columns, checks that every
//! required column is present, then checks each data row cell by cell. It never
//! fails on malformed data: every problem becomes a human-readable message in
//! [`ValidationResult::errors`].

use crate::spreadsheet::Record;
use crate::spreadsheet::Sheet;
use crate::spreadsheet::Workbook;
use crate::validation::schema::ColumnSchema;
use crate::validation::schema::Schema;
use crate::validation::value::ValidatedRow;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

pub const NO_WORKSHEETS: &str = "No worksheets found in the uploaded file.";
pub const NO_DATA: &str = "The worksheet contains no data.";
pub const NO_DATA_ROWS: &str = "No data rows found.";

/// What the validator does once a data row has failed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop at the first row that produced an error and report only that row's errors.
    #[default]
    HaltOnFirstError,
    /// Check every data row and report the errors of all of them.
    CollectAllErrors,
}

/// Outcome of validating one worksheet.
///
/// When `errors` is not empty, `rows` is incomplete and must be discarded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub rows: Vec<ValidatedRow>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            errors: vec![error.into()],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates worksheets against a schema. Holds no mutable state, so one
/// validator may be shared across requests.
#[derive(Clone, Copy, Debug)]
pub struct Validator<'a> {
    schema: &'a Schema,
    policy: ErrorPolicy,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self::with_policy(schema, ErrorPolicy::default())
    }

    pub fn with_policy(schema: &'a Schema, policy: ErrorPolicy) -> Self {
        Self { schema, policy }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Validates the first worksheet of a workbook.
    pub fn validate(&self, workbook: &Workbook) -> ValidationResult {
        match workbook.first_sheet() {
            Some(sheet) => self.validate_sheet(sheet),
            None => ValidationResult::failed(NO_WORKSHEETS),
        }
    }

    /// Validates one worksheet: header row first, then every data row.
    pub fn validate_sheet(&self, sheet: &Sheet) -> ValidationResult {
        let records = sheet.records();
        let Some((header, data)) = records.split_first() else {
            return ValidationResult::failed(NO_DATA);
        };

        let positions = self.header_positions(header);
        debug!(sheet = %sheet.name, mapped = positions.len(), "mapped header row");

        let errors: Vec<String> = self
            .schema
            .required_columns()
            .filter(|column| !positions.contains_key(&column.name().to_lowercase()))
            .map(missing_column)
            .collect();
        if !errors.is_empty() {
            debug!(sheet = %sheet.name, missing = errors.len(), "rejected header row");
            return ValidationResult {
                rows: Vec::new(),
                errors,
            };
        }

        if data.is_empty() {
            return ValidationResult::failed(NO_DATA_ROWS);
        }

        let mut result = ValidationResult::default();
        for record in data {
            let mut row = ValidatedRow::new(record.number());
            let mut is_valid = true;
            for column in self.schema.columns() {
                let Some(&position) = positions.get(&column.name().to_lowercase()) else {
                    // Required columns were checked against the header above.
                    if !column.is_required() {
                        continue;
                    }
                    result.errors.push(missing_column(column));
                    return result;
                };
                if !check_cell(column, record, position, &mut row, &mut result.errors) {
                    is_valid = false;
                }
            }

            if is_valid {
                result.rows.push(row);
            }
            if !is_valid && self.policy == ErrorPolicy::HaltOnFirstError {
                debug!(sheet = %sheet.name, row = record.number(), "halted at first invalid row");
                return result;
            }
        }
        result
    }

    /// Maps lower-cased schema column names to their position in the header.
    /// Unknown header columns are ignored; on duplicates the first one wins.
    fn header_positions(&self, header: &Record<'_>) -> HashMap<String, usize> {
        let mut positions = HashMap::new();
        for position in 0..header.len() {
            let name = header.text(position).to_lowercase();
            if self.schema.column(&name).is_some() {
                positions.entry(name).or_insert(position);
            }
        }
        positions
    }
}

fn missing_column(column: &ColumnSchema) -> String {
    format!("Missing required column '{}'.", column.name())
}

/// Checks one cell against its column, storing the typed value in `row`.
/// Returns false when the cell produced an error.
fn check_cell(
    column: &ColumnSchema,
    record: &Record<'_>,
    position: usize,
    row: &mut ValidatedRow,
    errors: &mut Vec<String>,
) -> bool {
    let number = record.number();
    let name = column.name();
    let value = record.text(position);

    if value.is_empty() {
        if column.is_required() {
            errors.push(format!("Row {number}: '{name}' is required."));
            return false;
        }
        if !column.is_numeric() {
            row.insert_if_absent(name, value);
        }
        return true;
    }

    if let Some(max_length) = column.max_len() {
        if value.chars().count() > max_length {
            errors.push(format!(
                "Row {number}: '{name}' exceeds the maximum length of {max_length} characters."
            ));
            return false;
        }
    }

    if !column.is_numeric() {
        row.insert_if_absent(name, value);
        return true;
    }

    let Ok(parsed) = value.parse::<i64>() else {
        errors.push(format!("Row {number}: '{name}' must be a valid integer."));
        return false;
    };
    if let Some(min) = column.min().filter(|min| parsed < *min) {
        errors.push(format!("Row {number}: '{name}' must be at least {min}."));
        return false;
    }
    if let Some(max) = column.max().filter(|max| parsed > *max) {
        errors.push(format!("Row {number}: '{name}' must be at most {max}."));
        return false;
    }
    row.insert(name, parsed);
    true
}

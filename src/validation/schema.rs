use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while assembling a [`Schema`].
#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("Column name must not be empty")]
    EmptyColumnName,

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("Column '{name}' has minimum {min} greater than maximum {max}")]
    InvalidBounds { name: String, min: i64, max: i64 },
}

/// Constraints for one logical column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSchema {
    name: String,
    required: bool,
    integer: bool,
    max_length: Option<usize>,
    min_value: Option<i64>,
    max_value: Option<i64>,
}

impl ColumnSchema {
    /// An optional, unbounded text column.
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            required: false,
            integer: false,
            max_length: None,
            min_value: None,
            max_value: None,
        }
    }

    /// An optional integer column; bounds come from `min_value`/`max_value`.
    pub fn integer(name: &str) -> Self {
        Self {
            integer: true,
            ..Self::text(name)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn min_value(mut self, min_value: i64) -> Self {
        self.min_value = Some(min_value);
        self
    }

    pub fn max_value(mut self, max_value: i64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_length
    }

    pub fn min(&self) -> Option<i64> {
        self.min_value
    }

    pub fn max(&self) -> Option<i64> {
        self.max_value
    }

    /// A column holds integers when built with [`ColumnSchema::integer`] or when it
    /// declares any numeric bound.
    pub fn is_numeric(&self) -> bool {
        self.integer || self.min_value.is_some() || self.max_value.is_some()
    }
}

/// An immutable set of column constraints with case-insensitively unique names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSchema>) -> Result<Self, SchemaError> {
        let mut names = HashSet::new();
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(SchemaError::EmptyColumnName);
            }
            if !names.insert(column.name.to_lowercase()) {
                return Err(SchemaError::DuplicateColumn(column.name.clone()));
            }
            if let (Some(min), Some(max)) = (column.min_value, column.max_value) {
                if min > max {
                    return Err(SchemaError::InvalidBounds {
                        name: column.name.clone(),
                        min,
                        max,
                    });
                }
            }
        }
        Ok(Self { columns })
    }

    /// Columns of a student roster upload.
    pub fn students() -> Self {
        Self {
            columns: student_columns(),
        }
    }

    /// Student columns plus the optional `Id` used by upserts.
    pub fn students_with_id() -> Self {
        let mut columns = student_columns();
        columns.push(ColumnSchema::integer(ID).min_value(1));
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Case-insensitive lookup by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        let name = name.to_lowercase();
        self.columns
            .iter()
            .find(|column| column.name.to_lowercase() == name)
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|column| column.required)
    }
}

pub const ID: &str = "Id";
pub const NAME: &str = "Name";
pub const AGE: &str = "Age";
pub const EMAIL: &str = "Email";
pub const GRADUATION_YEAR: &str = "GraduationYear";

fn student_columns() -> Vec<ColumnSchema> {
    vec![
        ColumnSchema::text(NAME).required().max_length(100),
        ColumnSchema::integer(AGE).required().min_value(5).max_value(100),
        ColumnSchema::text(EMAIL).required().max_length(150),
        ColumnSchema::integer(GRADUATION_YEAR).required().min_value(2000).max_value(2100),
    ]
}

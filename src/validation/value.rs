use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// A typed cell value after validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(number) => Some(*number),
            FieldValue::Text(_) => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(text) => write!(f, "{}", text),
            FieldValue::Integer(number) => write!(f, "{}", number),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

/// One validated data row, keyed by the schema's column names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidatedRow {
    /// Spreadsheet row number the values came from (1-based)
    pub row: usize,
    values: BTreeMap<String, FieldValue>,
}

impl ValidatedRow {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            values: BTreeMap::new(),
        }
    }

    /// Stores a value, replacing any previous one.
    pub fn insert(&mut self, column: &str, value: impl Into<FieldValue>) {
        self.values.insert(column.to_owned(), value.into());
    }

    /// Stores a value only when the column has none yet.
    pub fn insert_if_absent(&mut self, column: &str, value: impl Into<FieldValue>) {
        self.values
            .entry(column.to_owned())
            .or_insert_with(|| value.into());
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.values.get(column)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FieldValue::as_text)
    }

    pub fn integer(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(FieldValue::as_integer)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors() {
        let mut row = ValidatedRow::new(2);
        row.insert("Name", "Ann");
        row.insert("Age", 20i64);

        assert_eq!(row.text("Name"), Some("Ann"));
        assert_eq!(row.integer("Name"), None);
        assert_eq!(row.integer("Age"), Some(20));
        assert_eq!(row.text("Age"), None);
        assert_eq!(row.get("Email"), None);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn insert_if_absent_keeps_first_value() {
        let mut row = ValidatedRow::new(2);
        row.insert_if_absent("Name", "Ann");
        row.insert_if_absent("Name", "Bob");
        assert_eq!(row.text("Name"), Some("Ann"));
    }

    #[test]
    fn serializes_as_plain_values() {
        let mut row = ValidatedRow::new(3);
        row.insert("Age", 20i64);
        row.insert("Name", "Ann");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"row":3,"values":{"Age":20,"Name":"Ann"}}"#);
    }
}

use crate::error::RosterError;
use crate::validation::schema::AGE;
use crate::validation::schema::EMAIL;
use crate::validation::schema::GRADUATION_YEAR;
use crate::validation::schema::ID;
use crate::validation::schema::NAME;
use crate::validation::FieldValue;
use crate::validation::ValidatedRow;
use serde::Serialize;

/// A persisted student.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: String,
    pub graduation_year: i64,
}

impl Student {
    /// Export column order.
    pub const COLUMNS: [&'static str; 5] = [ID, NAME, AGE, EMAIL, GRADUATION_YEAR];

    /// Values in [`Student::COLUMNS`] order.
    pub fn to_fields(&self) -> [FieldValue; 5] {
        [
            FieldValue::Integer(self.id),
            FieldValue::Text(self.name.clone()),
            FieldValue::Integer(self.age),
            FieldValue::Text(self.email.clone()),
            FieldValue::Integer(self.graduation_year),
        ]
    }
}

/// A student about to be written. `id` is only honoured by upserts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewStudent {
    pub id: Option<i64>,
    pub name: String,
    pub age: i64,
    pub email: String,
    pub graduation_year: i64,
}

impl TryFrom<&ValidatedRow> for NewStudent {
    type Error = RosterError;

    fn try_from(row: &ValidatedRow) -> Result<Self, Self::Error> {
        let missing = |column: &str| RosterError::MissingField {
            row: row.row,
            column: column.to_owned(),
        };
        Ok(Self {
            id: row.integer(ID),
            name: row.text(NAME).ok_or_else(|| missing(NAME))?.to_owned(),
            age: row.integer(AGE).ok_or_else(|| missing(AGE))?,
            email: row.text(EMAIL).ok_or_else(|| missing(EMAIL))?.to_owned(),
            graduation_year: row.integer(GRADUATION_YEAR).ok_or_else(|| missing(GRADUATION_YEAR))?,
        })
    }
}

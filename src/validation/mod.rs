//! Schema-driven validation of uploaded worksheets.
pub mod schema;
pub mod validator;
pub mod value;

pub use schema::ColumnSchema;
pub use schema::Schema;
pub use schema::SchemaError;
pub use validator::ErrorPolicy;
pub use validator::ValidationResult;
pub use validator::Validator;
pub use value::FieldValue;
pub use value::ValidatedRow;

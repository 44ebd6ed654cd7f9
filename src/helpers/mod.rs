//! Low-level helpers shared by the spreadsheet codec.

pub mod reader;
pub(crate) mod xml;
pub(crate) mod zip;

//! Writes tabular data to an `.xlsx` package.

use crate::error::RosterError;
use crate::validation::FieldValue;
use rust_xlsxwriter::{Format, Workbook};

/// Writes a single worksheet with a bold header row followed by one row per record.
///
/// Integers are written as numbers, text as strings. Returns the package bytes.
pub fn write_table<'a, I>(sheet_name: &str, header: &[&str], rows: I) -> Result<Vec<u8>, RosterError>
where
    I: IntoIterator<Item = &'a [FieldValue]>,
{
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, name) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }

    for (row_idx, record) in rows.into_iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col, value) in record.iter().enumerate() {
            let col = col as u16;
            match value {
                FieldValue::Integer(number) => {
                    worksheet.write_number(row, col, *number as f64)?;
                }
                FieldValue::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

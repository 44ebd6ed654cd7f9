//! Conversion between Excel-style cell references (`B7`) and zero-based indexes.

use regex::Regex;
use std::sync::OnceLock;

/// Number of rows in an Excel worksheet.
pub(crate) const MAX_ROWS: usize = 1_048_576;
/// Number of columns in an Excel worksheet (`A` to `XFD`).
pub(crate) const MAX_COLS: usize = 16_384;

static CELL_REFERENCE: OnceLock<Regex> = OnceLock::new();

/// Converts a column name (`A`, `Z`, `AA`) to a zero-based column index.
/// Columns past `XFD` yield `None`.
pub(crate) fn col_to_index(name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for character in name.chars() {
        if !character.is_ascii_alphabetic() {
            return None;
        }
        let digit = (character.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1).filter(|index| *index < MAX_COLS)
}

/// Converts a one-based row number (`"7"`) to a zero-based row index.
/// Rows past 1,048,576 yield `None`.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number
        .parse::<usize>()
        .ok()?
        .checked_sub(1)
        .filter(|index| *index < MAX_ROWS)
}

/// Converts a zero-based column index to its column name.
pub(crate) fn index_to_col(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Parses a cell reference such as `B7` into `(row, col)` indexes.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let pattern = CELL_REFERENCE
        .get_or_init(|| Regex::new(r"^\$?([A-Za-z]+)\$?(\d+)$").expect("Hardcode regex pattern"));
    let captures = pattern.captures(reference)?;
    let col = col_to_index(captures.get(1)?.as_str())?;
    let row = row_to_index(captures.get(2)?.as_str())?;
    Some((row, col))
}

/// Formats `(row, col)` indexes as a cell reference such as `B7`.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_references() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("B7"), Some((6, 1)));
        assert_eq!(reference_to_index("AA10"), Some((9, 26)));
        assert_eq!(reference_to_index("$C$3"), Some((2, 2)));
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("7B"), None);
        assert_eq!(reference_to_index(""), None);
    }

    #[test]
    fn rejects_references_past_sheet_limits() {
        assert_eq!(reference_to_index("XFD1048576"), Some((MAX_ROWS - 1, MAX_COLS - 1)));
        assert_eq!(reference_to_index("A1048577"), None);
        assert_eq!(reference_to_index("XFE1"), None);
        assert_eq!(reference_to_index("A99999999999999999"), None);
        assert_eq!(reference_to_index("A999999999999999999999999"), None);
        assert_eq!(row_to_index("1048576"), Some(MAX_ROWS - 1));
        assert_eq!(col_to_index("ZZZZZZZZZZZZZZZZ"), None);
    }

    #[test]
    fn formats_references() {
        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(6, 1), "B7");
        assert_eq!(index_to_reference(9, 26), "AA10");
        assert_eq!(index_to_col(701), "ZZ");
        assert_eq!(index_to_col(702), "AAA");
    }
}

use crate::spreadsheet::cell::Cell;

/// Represents a worksheet read from a spreadsheet file.
///
/// Cells are stored sparsely in arrival order; [`Sheet::records`] groups them
/// by row and addresses them by column within the used range.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    /// All non-empty cells in the sheet
    pub(crate) cells: Vec<Cell>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

/// One row of the used range, with cells addressable by column position.
#[derive(Debug)]
pub struct Record<'a> {
    /// Row index (0-based)
    pub row: usize,
    /// First used column of the sheet
    col_lower: usize,
    /// Width of the used range
    width: usize,
    /// Present cells, sorted by column
    cells: Vec<&'a Cell>,
}

impl Record<'_> {
    /// Spreadsheet row number as shown to users (1-based).
    pub fn number(&self) -> usize {
        self.row + 1
    }

    /// Number of positions in the row.
    pub fn len(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Trimmed text at the given position, empty when the cell is absent.
    pub fn text(&self, col: usize) -> String {
        let col = self.col_lower.saturating_add(col);
        self.cells
            .binary_search_by_key(&col, |cell| cell.col)
            .map(|index| self.cells[index].to_string().trim().to_owned())
            .unwrap_or_default()
    }
}

impl Sheet {
    /// Creates an empty sheet.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Builds a sheet from in-memory rows; the first row lands on spreadsheet row 1.
    /// Empty strings leave their cell absent.
    pub fn from_rows<R, S>(name: &str, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sheet = Self::new(name);
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                let value = value.into();
                if !value.is_empty() {
                    sheet.push(Cell::text(row, col, value));
                }
            }
        }
        sheet
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of rows between the first and last used row, inclusive.
    pub fn used_rows(&self) -> usize {
        self.row_lower_bound
            .zip(self.row_upper_bound)
            .map(|(lower, upper)| upper - lower + 1)
            .unwrap_or(0)
    }

    /// Adds a cell to the sheet, updating the data range.
    pub(crate) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    /// Updates the actual data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        self.row_lower_bound = Some(self.row_lower_bound.map_or(row, |lower| lower.min(row)));
        self.row_upper_bound = Some(self.row_upper_bound.map_or(row, |upper| upper.max(row)));
        self.col_lower_bound = Some(self.col_lower_bound.map_or(col, |lower| lower.min(col)));
        self.col_upper_bound = Some(self.col_upper_bound.map_or(col, |upper| upper.max(col)));
    }

    /// Groups the cells into one record per row of the used range.
    /// Positions are relative to the first used column. When two cells share
    /// a position, the one read first wins.
    pub fn records(&self) -> Vec<Record<'_>> {
        let (Some(row_lower), Some(row_upper), Some(col_lower), Some(col_upper)) = (
            self.row_lower_bound,
            self.row_upper_bound,
            self.col_lower_bound,
            self.col_upper_bound,
        ) else {
            return Vec::new();
        };
        let width = col_upper - col_lower + 1;

        let mut sorted: Vec<&Cell> = self.cells.iter().collect();
        sorted.sort_by_key(|cell| (cell.row, cell.col));
        sorted.dedup_by_key(|cell| (cell.row, cell.col));

        let mut sorted = sorted.into_iter().peekable();
        let mut records = Vec::with_capacity(row_upper - row_lower + 1);
        for row in row_lower..=row_upper {
            let mut cells = Vec::new();
            while let Some(cell) = sorted.next_if(|cell| cell.row == row) {
                cells.push(cell);
            }
            records.push(Record {
                row,
                col_lower,
                width,
                cells,
            });
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(sheet: &mut Sheet, row: usize, col: usize, value: &str) {
        sheet.push(Cell::text(row, col, value));
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("Students");

        assert!(sheet.is_empty());
        assert_eq!(sheet.used_rows(), 0);
        assert_eq!(sheet.row_lower_bound, None);
        assert_eq!(sheet.col_upper_bound, None);
        assert!(sheet.records().is_empty());
    }

    #[test]
    fn sheet_update() {
        let mut sheet = Sheet::new("Students");
        push(&mut sheet, 1, 1, "a");
        push(&mut sheet, 1, 3, "b");
        push(&mut sheet, 3, 1, "c");
        push(&mut sheet, 3, 3, "d");

        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.row_lower_bound, Some(1));
        assert_eq!(sheet.row_upper_bound, Some(3));
        assert_eq!(sheet.col_lower_bound, Some(1));
        assert_eq!(sheet.col_upper_bound, Some(3));
        assert_eq!(sheet.used_rows(), 3);
    }

    #[test]
    fn sheet_records_cover_the_used_range() {
        let mut sheet = Sheet::new("Students");
        push(&mut sheet, 1, 1, "a");
        push(&mut sheet, 1, 3, " b ");
        push(&mut sheet, 3, 2, "c");

        let records = sheet.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].number(), 2);
        assert_eq!(records[0].len(), 3);
        assert_eq!(records[0].text(0), "a");
        assert_eq!(records[0].text(1), "");
        assert_eq!(records[0].text(2), "b");
        assert!(records[1].is_empty());
        assert_eq!(records[2].text(1), "c");
        assert_eq!(records[2].text(9), "");
    }

    #[test]
    fn sheet_bounds_ignore_arrival_order() {
        let mut sheet = Sheet::new("Students");
        push(&mut sheet, 5, 2, "late");
        push(&mut sheet, 2, 4, "early");
        push(&mut sheet, 3, 0, "left");

        assert_eq!(sheet.row_lower_bound, Some(2));
        assert_eq!(sheet.row_upper_bound, Some(5));
        assert_eq!(sheet.col_lower_bound, Some(0));
        assert_eq!(sheet.col_upper_bound, Some(4));
        assert_eq!(sheet.used_rows(), 4);
    }

    #[test]
    fn sheet_records_sort_cells_by_position() {
        let mut sheet = Sheet::new("Students");
        push(&mut sheet, 0, 0, "Name");
        push(&mut sheet, 0, 1, "Age");
        push(&mut sheet, 0, 2, "Email");
        push(&mut sheet, 0, 3, "GraduationYear");
        push(&mut sheet, 1, 1, "20");
        push(&mut sheet, 1, 0, "Ann");
        push(&mut sheet, 1, 2, "ann@x.com");
        push(&mut sheet, 1, 3, "2025");
        push(&mut sheet, 2, 3, "2026");
        push(&mut sheet, 0, 0, "Duplicate");

        let records = sheet.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].text(0), "Name");
        let row: Vec<_> = (0..records[1].len()).map(|col| records[1].text(col)).collect();
        assert_eq!(row, vec!["Ann", "20", "ann@x.com", "2025"]);
        assert_eq!(records[2].text(3), "2026");
        assert_eq!(records[2].text(0), "");
    }

    #[test]
    fn sheet_records_span_wide_rows() {
        let mut sheet = Sheet::new("Students");
        push(&mut sheet, 0, 0, "Name");
        push(&mut sheet, 1, 16_383, "far");

        let records = sheet.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), 16_384);
        assert_eq!(records[1].text(16_383), "far");
        assert_eq!(records[1].text(16_384), "");
    }

    #[test]
    fn sheet_from_rows() {
        let sheet = Sheet::from_rows("Students", vec![vec!["Name", "Age"], vec!["Ann", ""]]);

        assert_eq!(sheet.name, "Students");
        assert_eq!(sheet.cells.len(), 3);
        assert_eq!(sheet.used_rows(), 2);
        let records = sheet.records();
        assert_eq!(records[0].text(1), "Age");
        assert_eq!(records[1].text(0), "Ann");
        assert_eq!(records[1].text(1), "");
    }
}

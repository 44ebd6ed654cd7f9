use crate::error::RosterError;
use crate::helpers::reader::SourceReader;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::row_to_index;
use crate::spreadsheet::reference::MAX_COLS;
use crate::spreadsheet::reference::MAX_ROWS;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Workbook;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_RELATIONSHIP: &[u8] = b"Relationship";           // Package relationship
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");       // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");           // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                      // Text content within strings
const TAG_SHEET: QName = QName(b"sheet");                 // Worksheet definition
const TAG_ROW: QName = QName(b"row");                     // Row in worksheet
const TAG_CELL: QName = QName(b"c");                      // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");            // Inline string value
const TAG_VALUE: QName = QName(b"v");                     // Cell value content

/// Represents an Excel XLSX package opened for reading
pub(crate) struct XlsxSpreadsheet {
    /// File name of the spreadsheet
    name: String,
    /// ZIP archive containing the XLSX file contents
    zip: ZipArchive<SourceReader>,
    /// List of worksheets with (name, zip_path) pairs, in workbook order
    sheets: Vec<(String, String)>,
}

impl XlsxSpreadsheet {
    /// Opens an XLSX package and parses its workbook structure
    ///
    /// # Arguments
    /// * `name` - Display name of the package (file name of the upload)
    /// * `reader` - Package content
    pub(crate) fn open(name: &str, mut reader: SourceReader) -> Result<XlsxSpreadsheet, RosterError> {
        reader.ensure_zip_package(name)?;
        let mut zip = ZipArchive::new(reader)?;
        let sheets = load_workbook(&mut zip)?;
        Ok(XlsxSpreadsheet {
            name: name.to_owned(),
            zip,
            sheets,
        })
    }

    /// Loads the shared string table; packages without one yield an empty table
    fn load_shared_strings(&mut self) -> Result<Vec<String>, RosterError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };

        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                shared_strings.push(string);
            }
        });
        Ok(shared_strings)
    }

    /// Reads every worksheet into memory
    pub(crate) fn read(mut self) -> Result<Workbook, RosterError> {
        let shared_strings = self.load_shared_strings()?;
        let mut sheets = Vec::with_capacity(self.sheets.len());
        for (sheet_name, zip_path) in &self.sheets {
            let mut reader = self.zip.xml_reader(zip_path)?
                .ok_or_else(|| SpreadsheetError::MissingPart(zip_path.to_owned()))?;
            let sheet = read_sheet(&mut reader, sheet_name, &shared_strings)?;
            sheets.push(sheet);
        }
        Ok(Workbook {
            name: self.name,
            sheets,
        })
    }
}

/// Parses one worksheet part into a [`Sheet`]
fn read_sheet<R: BufRead>(
    reader: &mut XmlReader<R>,
    sheet_name: &str,
    shared_strings: &[String],
) -> Result<Sheet, RosterError> {
    let mut sheet = Sheet::new(sheet_name);
    let mut row_count = 0usize;
    let mut col_count = 0usize;
    let mut row = 0usize;
    let mut col = 0usize;
    let mut kind = CellType::default();
    let mut value = String::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_ROW => {
            if let Some(number) = event.get_attribute_value("r")? {
                row_count = row_to_index(&number)
                    .ok_or_else(|| SpreadsheetError::InvalidRowNumber(number.to_string()))?;
            }
            col_count = 0;
        }
        Event::End(event) if event.name() == TAG_ROW => {
            row_count += 1;
            col_count = 0;
        }
        Event::Start(event) if event.name() == TAG_CELL => {
            (row, col) = match event.get_attribute_value("r")? {
                Some(reference) => reference_to_index(&reference)
                    .ok_or_else(|| SpreadsheetError::InvalidCellReference(reference.to_string()))?,
                None if row_count < MAX_ROWS && col_count < MAX_COLS => (row_count, col_count),
                None => Err(SpreadsheetError::InvalidCellReference(index_to_reference(row_count, col_count)))?,
            };
            col_count = col + 1;
            let kind_name = event.get_attribute_value("t")?;
            kind = CellType::from_xlsx_attribute(kind_name.as_deref());
            value.clear();
        }
        Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
            value = read_string_value(reader, TAG_INLINE_STRING, false)?;
        }
        Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
            value = read_string_value(reader, TAG_VALUE, true)?;
        }
        Event::End(event) if event.name() == TAG_CELL => {
            if kind != CellType::Empty && !value.is_empty() {
                if kind == CellType::SharedString {
                    let index = value.trim().parse::<usize>()?;
                    value = shared_strings.get(index)
                        .cloned()
                        .ok_or(SpreadsheetError::InvalidSharedString(index))?;
                }
                sheet.push(Cell {
                    row,
                    col,
                    kind,
                    value: std::mem::take(&mut value),
                });
            }
            kind = CellType::Empty;
        }
    });
    Ok(sheet)
}

/// Loads workbook structure and worksheet information from XLSX file
///
/// Parses the workbook.xml file to extract worksheet names and their corresponding
/// XML file paths.
///
/// # Returns
/// Worksheets as (name, zip_path) pairs
fn load_workbook(zip: &mut ZipArchive<SourceReader>) -> Result<Vec<(String, String)>, RosterError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::MissingPart("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&*id) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Loads worksheet relationships from an Excel file
///
/// # Returns
/// Mapping of relationship IDs to worksheet paths
fn load_relationships(zip: &mut ZipArchive<SourceReader>, path: &str) -> Result<HashMap<String, String>, RosterError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::MissingPart(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only process worksheet relationships
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Normalizes a relationship target to a path inside the package
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix("/xl/") {
        format!("xl/{stripped}")
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Extracts string content from XML elements, skipping phonetic text annotations
/// and properly handling both text nodes and CDATA sections.
///
/// # Arguments
/// * `reader` - XML reader positioned at the start of the string content
/// * `end_tag` - XML tag that marks the end of the string content
/// * `is_text_content` - Whether to treat the content as text by default
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, RosterError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_from_xml(xml: &str, shared_strings: &[String]) -> Result<Sheet, RosterError> {
        let mut reader = XmlReader::new(xml.as_bytes());
        read_sheet(&mut reader, "Sheet1", shared_strings)
    }

    #[test]
    fn reads_cells_of_every_kind() {
        let shared = vec!["Name".to_string(), "Ann".to_string()];
        let sheet = sheet_from_xml(
            r#"<worksheet><sheetData>
                <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="inlineStr"><is><t>Age</t></is></c></row>
                <row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2"><v>20.0</v></c><c r="C2" t="b"><v>1</v></c></row>
            </sheetData></worksheet>"#,
            &shared,
        )
        .unwrap();

        let records = sheet.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text(0), "Name");
        assert_eq!(records[0].text(1), "Age");
        assert_eq!(records[1].text(0), "Ann");
        assert_eq!(records[1].text(1), "20");
        assert_eq!(records[1].text(2), "true");
    }

    #[test]
    fn cells_without_reference_take_next_position() {
        let sheet = sheet_from_xml(
            r#"<sheetData><row><c t="str"><v>x</v></c><c t="str"><v>y</v></c></row><row><c t="str"><v>z</v></c></row></sheetData>"#,
            &[],
        )
        .unwrap();

        assert_eq!(sheet.cells[0].reference(), "A1");
        assert_eq!(sheet.cells[1].reference(), "B1");
        assert_eq!(sheet.cells[2].reference(), "A2");
    }

    #[test]
    fn skips_empty_and_styled_cells() {
        let sheet = sheet_from_xml(
            r#"<sheetData><row r="3"><c r="A3" s="1"/><c r="B3" t="str"><v>kept</v></c></row></sheetData>"#,
            &[],
        )
        .unwrap();

        assert_eq!(sheet.cells.len(), 1);
        assert_eq!(sheet.cells[0].reference(), "B3");
    }

    #[test]
    fn skips_phonetic_runs() -> Result<(), RosterError> {
        let mut reader = XmlReader::new(
            r#"<sst><si><r><t>Ta</t></r><r><t>naka</t></r><rPh><t>ignored</t></rPh></si></sst>"#.as_bytes(),
        );
        let mut strings = Vec::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
            }
        });
        assert_eq!(strings, vec!["Tanaka".to_string()]);
        Ok(())
    }

    #[test]
    fn rejects_dangling_shared_string() {
        let error = sheet_from_xml(r#"<row r="1"><c r="A1" t="s"><v>4</v></c></row>"#, &[]).unwrap_err();
        assert_eq!(error.to_string(), "Shared string index 4 is out of range");
    }

    #[test]
    fn rejects_cells_outside_the_grid() {
        let error = sheet_from_xml(
            r#"<sheetData><row r="1"><c r="A1" t="str"><v>Name</v></c></row>
               <row><c r="A99999999999999999" t="str"><v>x</v></c></row></sheetData>"#,
            &[],
        )
        .unwrap_err();
        assert_eq!(error.to_string(), "Invalid cell reference 'A99999999999999999'");

        let error = sheet_from_xml(r#"<row r="1048577"><c t="str"><v>x</v></c></row>"#, &[]).unwrap_err();
        assert_eq!(error.to_string(), "Invalid row number '1048577'");

        let error = sheet_from_xml(r#"<row r="1"><c r="XFE1" t="str"><v>x</v></c></row>"#, &[]).unwrap_err();
        assert_eq!(error.to_string(), "Invalid cell reference 'XFE1'");
    }

    #[test]
    fn last_cell_of_the_grid_is_accepted() {
        let sheet = sheet_from_xml(r#"<row r="1048576"><c r="XFD1048576" t="str"><v>x</v></c></row>"#, &[]).unwrap();
        assert_eq!(sheet.cells[0].reference(), "XFD1048576");
    }

    #[test]
    fn out_of_order_cells_keep_their_positions() {
        let sheet = sheet_from_xml(
            r#"<sheetData>
                <row r="1"><c r="A1" t="str"><v>Name</v></c><c r="B1" t="str"><v>Age</v></c></row>
                <row r="2"><c r="B2"><v>20</v></c><c r="A2" t="str"><v>Ann</v></c></row>
            </sheetData>"#,
            &[],
        )
        .unwrap();

        let records = sheet.records();
        assert_eq!(records[1].text(0), "Ann");
        assert_eq!(records[1].text(1), "20");
    }

    #[test]
    fn normalizes_relationship_targets() {
        assert_eq!(to_zip_path(Cow::Borrowed("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("/xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
    }
}

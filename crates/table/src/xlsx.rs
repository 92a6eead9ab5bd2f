use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => {
            // Excel stores dates as days since 1899-12-30
            CellValue::Float(dt.as_f64())
        }
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

fn workbook_error(e: XlsxError) -> SheetError {
    SheetError::Workbook(e.to_string())
}

fn read_all_sheets<R>(workbook: &mut Xlsx<R>) -> Result<Book>
where
    R: std::io::Read + std::io::Seek,
{
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut book = Book::new();

    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(workbook_error)?;

        let mut data: Vec<Vec<CellValue>> = Vec::new();
        for row in range.rows() {
            let row_data: Vec<CellValue> = row.iter().map(data_to_cell_value).collect();
            data.push(row_data);
        }

        let mut sheet = Sheet::with_name(&sheet_name);
        *sheet.data_mut() = data;
        book.add_sheet(&sheet_name, sheet)?;
    }

    Ok(book)
}

impl Book {
    /// Load a book from an Excel file on disk (all sheets, raw rows).
    ///
    /// Rows come back untyped: no header promotion happens here, because
    /// callers know which physical row is the header for each sheet.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::Workbook` if the file is not a valid XLSX
    /// container or a sheet cannot be read.
    pub fn from_xlsx_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut workbook: Xlsx<BufReader<File>> =
            open_workbook(path.as_ref()).map_err(workbook_error)?;
        read_all_sheets(&mut workbook)
    }

    /// Load a book from an in-memory XLSX blob (all sheets, raw rows).
    ///
    /// # Errors
    ///
    /// Returns `SheetError::Workbook` if the bytes are not a valid XLSX
    /// container or a sheet cannot be read.
    pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<Self> {
        let mut workbook: Xlsx<Cursor<&[u8]>> =
            Xlsx::new(Cursor::new(bytes)).map_err(workbook_error)?;
        read_all_sheets(&mut workbook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    fn write_fixture(path: &Path) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("People").unwrap();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 1, "Score").unwrap();
        sheet.write_string(1, 0, "Alice").unwrap();
        sheet.write_number(1, 1, 30.0).unwrap();
        let other = workbook.add_worksheet();
        other.set_name("Extra").unwrap();
        other.write_string(0, 0, "x").unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_from_xlsx_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fixture.xlsx");
        write_fixture(&path);

        let book = Book::from_xlsx_path(&path).unwrap();
        assert_eq!(book.sheet_count(), 2);
        assert!(book.has_sheet("People"));

        let people = book.get_sheet("People").unwrap();
        assert_eq!(people.row_count(), 2);
        assert_eq!(people.get(0, 0).unwrap().as_str(), "Name");
        // Numbers come back as floats from Excel
        assert_eq!(people.get(1, 1).unwrap().as_float(), Some(30.0));
    }

    #[test]
    fn test_from_xlsx_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fixture.xlsx");
        write_fixture(&path);

        let bytes = std::fs::read(&path).unwrap();
        let book = Book::from_xlsx_bytes(&bytes).unwrap();
        assert_eq!(book.sheet_names(), vec!["People", "Extra"]);
    }

    #[test]
    fn test_invalid_container_is_workbook_error() {
        let result = Book::from_xlsx_bytes(b"this is not a zip archive");
        assert!(matches!(result, Err(SheetError::Workbook(_))));
    }
}

use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;
use std::io::{Read, Write};

impl Sheet {
    /// Load a sheet from a CSV string with type inference.
    ///
    /// The first record becomes the header when `has_headers` is set.
    pub fn from_csv_str(content: &str, has_headers: bool) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes(), has_headers)
    }

    /// Load a sheet from a reader
    pub fn from_csv_reader<R: Read>(reader: R, has_headers: bool) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false) // headers handled via promote_header_row
            .from_reader(reader);

        let mut data: Vec<Vec<CellValue>> = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record.iter().map(CellValue::parse).collect();
            data.push(row);
        }

        let mut sheet = Sheet::with_name("Sheet1");
        *sheet.data_mut() = data;
        if has_headers && !sheet.is_empty() {
            sheet.promote_header_row(0)?;
        }
        Ok(sheet)
    }

    /// Write the sheet to a writer as CSV.
    ///
    /// When columns are named, the header record is written first. Values
    /// containing the delimiter or quote character get standard CSV quoting.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        if let Some(names) = self.column_names() {
            csv_writer.write_record(names)?;
        }
        for row in self.rows() {
            let record: Vec<String> = row.iter().map(CellValue::as_str).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Convert the sheet to a CSV string
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        let mut buffer = Vec::new();
        // Ignore errors for string conversion
        let _ = self.write_csv(&mut buffer);
        String::from_utf8_lossy(&buffer).to_string()
    }
}

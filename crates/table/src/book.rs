use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// A collection of named sheets, in workbook order.
#[derive(Debug, Clone, Default)]
pub struct Book {
    name: String,
    sheets: IndexMap<String, Sheet>,
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Book {
            name: "Book1".to_string(),
            sheets: IndexMap::new(),
        }
    }

    /// Get the book name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the book name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the book has no sheets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Check if a sheet with the given name exists
    #[must_use]
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.contains_key(name)
    }

    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets.get(name).ok_or_else(|| SheetError::SheetNotFound {
            name: name.to_string(),
        })
    }

    /// Add a sheet to the book
    pub fn add_sheet(&mut self, name: &str, mut sheet: Sheet) -> Result<()> {
        if self.sheets.contains_key(name) {
            return Err(SheetError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }
        sheet.set_name(name);
        self.sheets.insert(name.to_string(), sheet);
        Ok(())
    }

    /// Iterate over sheets in order
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consolidate all sheets into a single sheet by stacking rows vertically.
    ///
    /// All sheets must have named columns. Columns are aligned by name in
    /// first-seen order; cells for columns a sheet does not carry become
    /// null.
    pub fn consolidate(&self) -> Result<Sheet> {
        self.consolidate_with_options(&ConsolidateOptions::default())
    }

    /// Consolidate with options (e.g., add a source column naming the sheet
    /// each row came from).
    pub fn consolidate_with_options(&self, options: &ConsolidateOptions) -> Result<Sheet> {
        if self.is_empty() {
            return Ok(Sheet::new());
        }

        // Collect all unique column names across all sheets (preserving order)
        let mut all_columns: IndexSet<String> = IndexSet::new();
        for (name, sheet) in self.sheets() {
            let col_names = sheet.column_names().ok_or_else(|| {
                SheetError::ColumnsNotNamed(format!(
                    "Sheet '{name}' does not have named columns. All sheets must have named columns for consolidate."
                ))
            })?;
            for col in col_names {
                all_columns.insert(col.clone());
            }
        }

        let final_columns: Vec<String> = if let Some(source_col) = &options.source_column {
            if all_columns.contains(source_col) {
                return Err(SheetError::DuplicateColumnName {
                    name: source_col.clone(),
                });
            }
            std::iter::once(source_col.clone())
                .chain(all_columns.iter().cloned())
                .collect()
        } else {
            all_columns.iter().cloned().collect()
        };

        let mut data: Vec<Vec<CellValue>> = Vec::new();
        for (sheet_name, sheet) in self.sheets() {
            let col_idx: HashMap<&str, usize> = sheet
                .column_names()
                .map(|names| {
                    names
                        .iter()
                        .enumerate()
                        .map(|(i, n)| (n.as_str(), i))
                        .collect()
                })
                .unwrap_or_default();

            for row in sheet.rows() {
                let mut new_row = Vec::with_capacity(final_columns.len());
                for (i, col_name) in final_columns.iter().enumerate() {
                    if options.source_column.is_some() && i == 0 {
                        new_row.push(CellValue::String(sheet_name.to_string()));
                    } else if let Some(&idx) = col_idx.get(col_name.as_str()) {
                        new_row.push(row.get(idx).cloned().unwrap_or(CellValue::Null));
                    } else {
                        new_row.push(CellValue::Null);
                    }
                }
                data.push(new_row);
            }
        }

        let mut result = Sheet::with_name("consolidated");
        let header: Vec<CellValue> = final_columns
            .iter()
            .map(|n| CellValue::String(n.clone()))
            .collect();
        // Header goes in as a row and is promoted straight back out, which
        // also installs the column index
        result.data_mut().push(header);
        result.data_mut().extend(data);
        result.promote_header_row(0)?;

        Ok(result)
    }
}

/// Options for consolidating sheets
#[derive(Debug, Clone, Default)]
pub struct ConsolidateOptions {
    /// When set, prepend a column with this name carrying the source sheet
    /// name on every row
    pub source_column: Option<String>,
}

impl ConsolidateOptions {
    /// Enable the source column with a custom name
    #[must_use]
    pub fn with_source_column(mut self, name: &str) -> Self {
        self.source_column = Some(name.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(data: Vec<Vec<&str>>) -> Sheet {
        let mut sheet = Sheet::from_data(data);
        sheet.promote_header_row(0).unwrap();
        sheet
    }

    #[test]
    fn test_add_and_get_sheet() {
        let mut book = Book::new();
        book.add_sheet("Data", Sheet::new()).unwrap();
        assert!(book.has_sheet("Data"));
        assert!(book.get_sheet("Missing").is_err());
        assert!(matches!(
            book.add_sheet("Data", Sheet::new()),
            Err(SheetError::SheetAlreadyExists { .. })
        ));
    }

    #[test]
    fn test_consolidate_aligns_columns_by_name() {
        let mut book = Book::new();
        book.add_sheet("a", named(vec![vec!["X", "Y"], vec!["1", "2"]]))
            .unwrap();
        book.add_sheet("b", named(vec![vec!["Y", "Z"], vec!["3", "4"]]))
            .unwrap();

        let combined = book.consolidate().unwrap();
        assert_eq!(combined.row_count(), 2);
        assert_eq!(
            combined.column_names().unwrap(),
            &vec!["X".to_string(), "Y".to_string(), "Z".to_string()]
        );
        // Columns absent from a source sheet are null, not empty string
        assert!(combined.get_by_name(1, "X").unwrap().is_null());
        assert_eq!(combined.get_by_name(1, "Z").unwrap().as_str(), "4");
    }

    #[test]
    fn test_consolidate_source_column() {
        let mut book = Book::new();
        book.add_sheet("8a", named(vec![vec!["V"], vec!["acme"]]))
            .unwrap();
        book.add_sheet("HUBZone", named(vec![vec!["V"], vec!["globex"]]))
            .unwrap();

        let options = ConsolidateOptions::default().with_source_column("Pool");
        let combined = book.consolidate_with_options(&options).unwrap();

        assert_eq!(combined.get_by_name(0, "Pool").unwrap().as_str(), "8a");
        assert_eq!(combined.get_by_name(1, "Pool").unwrap().as_str(), "HUBZone");
    }

    #[test]
    fn test_consolidate_source_column_conflict() {
        let mut book = Book::new();
        book.add_sheet("a", named(vec![vec!["Pool"], vec!["x"]]))
            .unwrap();

        let options = ConsolidateOptions::default().with_source_column("Pool");
        assert!(matches!(
            book.consolidate_with_options(&options),
            Err(SheetError::DuplicateColumnName { .. })
        ));
    }
}

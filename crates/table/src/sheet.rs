use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::HashMap;

/// A sheet representing a 2D grid of cells (row-major storage).
///
/// Data rows never contain the header: promoting a header row with
/// [`Sheet::promote_header_row`] moves it into the column names and drops it
/// (and everything above it) from the data.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    column_names: Option<Vec<String>>,
    column_index: Option<HashMap<String, usize>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
            column_names: None,
            column_index: None,
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue> + Clone>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        Sheet {
            name: "Sheet1".to_string(),
            data: converted,
            column_names: None,
            column_index: None,
        }
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of data rows (excluding any promoted header)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        if let Some(names) = &self.column_names {
            names.len()
        } else {
            self.data.first().map_or(0, Vec::len)
        }
    }

    /// Check if the sheet has no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a cell value by row and column index
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Set a cell value by row and column index
    pub fn set<T: Into<CellValue>>(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let rows = self.row_count();
        let cols = self.col_count();
        let cell = self
            .data
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows,
                cols,
            })?;
        *cell = value.into();
        Ok(())
    }

    /// Get a cell value by row index and column name
    pub fn get_by_name(&self, row: usize, col_name: &str) -> Result<&CellValue> {
        let col = self.column_index_by_name(col_name)?;
        self.get(row, col)
    }

    /// Get a data row by index
    pub fn row(&self, index: usize) -> Result<&Vec<CellValue>> {
        self.data.get(index).ok_or(SheetError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    /// Append a data row, padding with nulls to the column count
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        let cols = self.col_count();
        if cols > 0 {
            row.resize(cols, CellValue::Null);
        }
        self.data.push(row);
    }

    /// Iterate over data rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Get a reference to the raw data
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get a mutable reference to the raw data
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }

    // ===== Named Access =====

    /// Promote a physical row to column headers.
    ///
    /// Header cells are rendered to strings and whitespace-trimmed. The
    /// header row and every row above it are removed from the data, so the
    /// remaining rows are records only.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::DuplicateColumnName` if two trimmed header cells
    /// collide.
    pub fn promote_header_row(&mut self, row_index: usize) -> Result<()> {
        let header_row = self.row(row_index)?;
        let names: Vec<String> = header_row.iter().map(|c| c.as_str().trim().to_string()).collect();

        let mut index_map = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            if index_map.contains_key(name) {
                return Err(SheetError::DuplicateColumnName { name: name.clone() });
            }
            index_map.insert(name.clone(), i);
        }

        self.data.drain(..=row_index);
        // Ragged workbook rows are padded so every record covers the header
        let cols = names.len();
        for row in &mut self.data {
            if row.len() < cols {
                row.resize(cols, CellValue::Null);
            }
        }

        self.column_names = Some(names);
        self.column_index = Some(index_map);
        Ok(())
    }

    /// Get column names (if set)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.column_names.as_ref()
    }

    /// Check whether a named column exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index_of(name).is_some()
    }

    /// Get the index of a named column, if present
    #[must_use]
    pub fn column_index_of(&self, name: &str) -> Option<usize> {
        self.column_index.as_ref().and_then(|m| m.get(name).copied())
    }

    fn column_index_by_name(&self, name: &str) -> Result<usize> {
        self.column_index
            .as_ref()
            .ok_or_else(|| {
                SheetError::ColumnsNotNamed("Call promote_header_row() first".to_string())
            })?
            .get(name)
            .copied()
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    fn require_column_names(&self) -> Result<&Vec<String>> {
        self.column_names.as_ref().ok_or_else(|| {
            SheetError::ColumnsNotNamed("Call promote_header_row() first".to_string())
        })
    }

    fn rebuild_column_index(&mut self) {
        if let Some(names) = &self.column_names {
            let mut index_map = HashMap::new();
            for (i, name) in names.iter().enumerate() {
                index_map.insert(name.clone(), i);
            }
            self.column_index = Some(index_map);
        } else {
            self.column_index = None;
        }
    }

    // ===== Column Operations =====

    /// Get a copy of a named column's values
    pub fn column_by_name(&self, name: &str) -> Result<Vec<CellValue>> {
        let idx = self.column_index_by_name(name)?;
        Ok(self
            .data
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or(CellValue::Null))
            .collect())
    }

    /// Append a new named column with the given values.
    ///
    /// The value vector must match the row count exactly.
    pub fn push_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<()> {
        let names = self.require_column_names()?;
        if names.iter().any(|n| n == name) {
            return Err(SheetError::DuplicateColumnName {
                name: name.to_string(),
            });
        }
        if values.len() != self.row_count() {
            return Err(SheetError::IndexOutOfBounds {
                row: values.len(),
                col: names.len(),
                rows: self.row_count(),
                cols: names.len(),
            });
        }

        for (row, value) in self.data.iter_mut().zip(values) {
            row.push(value);
        }
        if let Some(names) = &mut self.column_names {
            names.push(name.to_string());
        }
        self.rebuild_column_index();
        Ok(())
    }

    /// Add an all-null column if no column with that name exists.
    ///
    /// This is the primitive behind guaranteed-column schemas: after calling
    /// it, consumers can address the column unconditionally and branch only
    /// on value-is-null.
    pub fn ensure_column(&mut self, name: &str) -> Result<()> {
        if self.has_column(name) {
            return Ok(());
        }
        let nulls = vec![CellValue::Null; self.row_count()];
        self.push_column(name, nulls)
    }

    /// Apply a function to every cell of a named column
    pub fn column_map_by_name<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: Fn(&CellValue) -> CellValue,
    {
        let idx = self.column_index_by_name(name)?;
        for row in &mut self.data {
            if let Some(cell) = row.get_mut(idx) {
                *cell = f(cell);
            }
        }
        Ok(())
    }

    /// Project the sheet onto the given named columns, in the given order
    pub fn select_columns(&self, columns: &[&str]) -> Result<Sheet> {
        let indices: Result<Vec<usize>> = columns
            .iter()
            .map(|name| self.column_index_by_name(name))
            .collect();
        let indices = indices?;

        let data: Vec<Vec<CellValue>> = self
            .data
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect();

        let mut result = Sheet::with_name(&self.name);
        result.data = data;
        result.column_names = Some(columns.iter().map(|s| (*s).to_string()).collect());
        result.rebuild_column_index();
        Ok(result)
    }

    // ===== Row Operations =====

    /// Produce a new sheet containing only the rows matching the predicate.
    ///
    /// The source sheet is untouched; filtering is always non-destructive.
    #[must_use]
    pub fn filtered_rows<F>(&self, predicate: F) -> Sheet
    where
        F: Fn(&[CellValue]) -> bool,
    {
        let data: Vec<Vec<CellValue>> = self
            .data
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect();

        Sheet {
            name: self.name.clone(),
            data,
            column_names: self.column_names.clone(),
            column_index: self.column_index.clone(),
        }
    }

    // ===== Joins =====

    /// Left outer join with another sheet, with distinct key column names.
    ///
    /// Every row of `self` is kept. A row is paired with every `other` row
    /// whose key cell renders to the same string; zero matches fill the
    /// right-side columns with nulls, multiple matches emit one output row
    /// per match. All right-side columns are kept (the right key included);
    /// a right column whose name collides with a left column is renamed by
    /// appending `suffix`, so no data is dropped on collision.
    ///
    /// # Errors
    ///
    /// Returns error if either sheet lacks named columns, a key column is
    /// missing, or a suffixed name still collides.
    pub fn left_join_on(
        &self,
        other: &Sheet,
        left_key: &str,
        right_key: &str,
        suffix: &str,
    ) -> Result<Sheet> {
        let left_names = self.require_column_names()?.clone();
        let right_names = other.require_column_names()?;

        let left_key_idx =
            self.column_index_of(left_key)
                .ok_or_else(|| SheetError::JoinKeyNotFound {
                    key: left_key.to_string(),
                    sheet: self.name.clone(),
                })?;
        let right_key_idx =
            other
                .column_index_of(right_key)
                .ok_or_else(|| SheetError::JoinKeyNotFound {
                    key: right_key.to_string(),
                    sheet: other.name.clone(),
                })?;

        // Right key string -> row indices (fan-out preserved)
        let mut right_map: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in other.data.iter().enumerate() {
            if let Some(cell) = row.get(right_key_idx) {
                right_map.entry(cell.as_str()).or_default().push(i);
            }
        }

        // Result columns: all left columns, then all right columns with
        // collisions suffixed
        let mut result_names = left_names.clone();
        let mut right_cols: Vec<(usize, String)> = Vec::with_capacity(right_names.len());
        for (i, name) in right_names.iter().enumerate() {
            let final_name = if left_names.iter().any(|n| n == name) {
                format!("{name}{suffix}")
            } else {
                name.clone()
            };
            if result_names.iter().any(|n| *n == final_name) {
                return Err(SheetError::DuplicateColumnName { name: final_name });
            }
            result_names.push(final_name.clone());
            right_cols.push((i, final_name));
        }

        let right_col_count = right_cols.len();
        let mut result_data: Vec<Vec<CellValue>> = Vec::new();

        for left_row in &self.data {
            let left_key_val = left_row
                .get(left_key_idx)
                .map(CellValue::as_str)
                .unwrap_or_default();

            if let Some(right_indices) = right_map.get(&left_key_val) {
                for &right_idx in right_indices {
                    let right_row = &other.data[right_idx];
                    let mut new_row = left_row.clone();
                    for (col_idx, _) in &right_cols {
                        new_row.push(right_row.get(*col_idx).cloned().unwrap_or(CellValue::Null));
                    }
                    result_data.push(new_row);
                }
            } else {
                let mut new_row = left_row.clone();
                for _ in 0..right_col_count {
                    new_row.push(CellValue::Null);
                }
                result_data.push(new_row);
            }
        }

        let mut result = Sheet::with_name(&format!("{}_joined", self.name));
        result.data = result_data;
        result.column_names = Some(result_names);
        result.rebuild_column_index();
        Ok(result)
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

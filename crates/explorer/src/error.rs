//! Error types for the explorer core.

use awardbook_table::SheetError;
use thiserror::Error;

/// Result type for explorer operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Errors raised while turning a workbook into a merged table.
///
/// Every variant is fatal for the workbook that produced it: the pipeline
/// never returns a partial table.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// A required sheet is absent from the workbook.
    #[error("required sheet '{name}' not found in workbook")]
    SheetMissing { name: String },

    /// A required column is absent; carries the columns actually found.
    #[error("column '{column}' not found in {sheet}; columns found: {found:?}")]
    ColumnMissing {
        column: String,
        sheet: String,
        found: Vec<String>,
    },

    /// No sheet matched any recognized pool name.
    #[error("no pool sheets found in workbook")]
    NoPoolSheets,

    /// The blob is not a decodable spreadsheet container.
    #[error("workbook cannot be decoded: {0}")]
    Workbook(String),

    /// An underlying table operation failed.
    #[error("table error: {0}")]
    Table(SheetError),
}

/// Coarse error category, for callers that only branch on schema-vs-parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required sheet/column/key is missing from an otherwise readable
    /// workbook.
    Schema,
    /// The workbook bytes could not be decoded at all.
    Parse,
}

impl ExplorerError {
    /// Create a column-missing error from a sheet's current column set.
    pub fn column_missing(column: &str, sheet: &str, found: Option<&Vec<String>>) -> Self {
        Self::ColumnMissing {
            column: column.to_string(),
            sheet: sheet.to_string(),
            found: found.cloned().unwrap_or_default(),
        }
    }

    /// The coarse category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Workbook(_) => ErrorKind::Parse,
            _ => ErrorKind::Schema,
        }
    }
}

impl From<SheetError> for ExplorerError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::Workbook(msg) => Self::Workbook(msg),
            other => Self::Table(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_split() {
        assert_eq!(
            ExplorerError::Workbook("bad zip".into()).kind(),
            ErrorKind::Parse
        );
        assert_eq!(ExplorerError::NoPoolSheets.kind(), ErrorKind::Schema);
        assert_eq!(
            ExplorerError::SheetMissing { name: "x".into() }.kind(),
            ErrorKind::Schema
        );
    }

    #[test]
    fn test_column_missing_lists_found_columns() {
        let found = vec!["A".to_string(), "B".to_string()];
        let err = ExplorerError::column_missing("Contract Number", "contracts", Some(&found));
        let msg = err.to_string();
        assert!(msg.contains("Contract Number"));
        assert!(msg.contains('A') && msg.contains('B'));
    }
}

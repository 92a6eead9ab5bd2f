//! Sheet/Book tabular data layer for awardbook.
//!
//! Provides an in-memory grid model for workbook data: typed cell values
//! with an explicit null marker, sheets with named columns, multi-sheet
//! books, XLSX reading, CSV reading/writing, row-stacking consolidation,
//! and left joins.
//!
//! # Examples
//!
//! ```
//! use awardbook_table::{CellValue, Sheet};
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec!["Vendor", "Pool"],
//!     vec!["Acme", "8a"],
//! ]);
//! sheet.promote_header_row(0).unwrap();
//!
//! assert_eq!(sheet.row_count(), 1);
//! assert_eq!(sheet.get_by_name(0, "Pool").unwrap().as_str(), "8a");
//! ```

mod book;
mod cell;
mod csv;
mod error;
mod sheet;
mod xlsx;

/// Re-export book types and options.
pub use book::{Book, ConsolidateOptions};
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;

//! Explorer core for awardbook.
//!
//! Reconciles per-pool award listings against the master
//! contract-information sheet of a government awards workbook and exposes
//! the merged result through a small query interface: filtering, facet
//! option lists, grouped unique counts, summary metrics, and CSV export.
//!
//! The pipeline is synchronous and fail-fast: a workbook either produces a
//! complete [`MergedTable`] or an [`ExplorerError`], never a partial
//! dataset.
//!
//! # Examples
//!
//! ```no_run
//! use awardbook_explorer::{explore_bytes, FilterSpec};
//!
//! let bytes = std::fs::read("awards.xlsx").unwrap();
//! let table = explore_bytes(&bytes).unwrap();
//!
//! let spec = FilterSpec::all().with_search("aevex");
//! let hits = table.filter(&spec);
//! println!("{} matching rows", hits.row_count());
//! ```

pub mod cache;
pub mod error;
pub mod normalize;
pub mod query;
pub mod reconcile;

pub use cache::TableCache;
pub use error::{ErrorKind, ExplorerError, Result};
pub use normalize::{load_workbook, normalize_code, CONTRACT_KEY, CONTRACT_SHEET, POOL_KEY, POOL_SHEETS};
pub use query::{FilterSpec, Summary, DISPLAY_COLUMNS, SEARCH_COLUMNS};
pub use reconcile::{reconcile, MergedTable, GUARANTEED_COLUMNS, VENDOR_DISPLAY};

use awardbook_table::Book;

/// Run the full pipeline: normalize the workbook's sheets and reconcile
/// them into one merged table.
pub fn explore(book: &Book) -> Result<MergedTable> {
    let (contracts, pools) = normalize::load_workbook(book)?;
    reconcile::reconcile(&contracts, &pools)
}

/// Decode an in-memory workbook blob and run the full pipeline.
pub fn explore_bytes(bytes: &[u8]) -> Result<MergedTable> {
    let book = Book::from_xlsx_bytes(bytes)?;
    explore(&book)
}

//! Workbook normalizer: turns a raw multi-sheet workbook into a contract
//! table and a unioned, pool-tagged award table with canonical join keys.

use crate::error::{ExplorerError, Result};
use awardbook_table::{Book, CellValue, ConsolidateOptions, Sheet};
use tracing::{debug, info};

/// Sheet holding one record per contract. Its header sits on the second
/// physical row; the first row is decorative.
pub const CONTRACT_SHEET: &str = "OASIS+Contract Information";

/// Join key column on the contract sheet.
pub const CONTRACT_KEY: &str = "Contract Number";

/// Join key column on the pool sheets. Distinct spelling from the contract
/// sheet's key.
pub const POOL_KEY: &str = "Contract #";

/// Column tagging each unioned award row with its pool of origin.
pub const POOL_COLUMN: &str = "Pool";

/// Recognized pool sheet names, compared after trimming. Workbook authors
/// are inconsistent about trailing spaces in sheet names.
pub const POOL_SHEETS: [&str; 6] = [
    "8a",
    "Small Business",
    "Woman Owned SB",
    "Service Disabled Veteran Owned",
    "HUBZone",
    "Unrestricted",
];

/// Code columns on the pool table that get the same cleanup as join keys.
const CODE_COLUMNS: [&str; 2] = ["NAICS", "SIN"];

/// Canonicalize a key/code cell: string form, one trailing `.0` float
/// artifact stripped (suffix-anchored, so a mid-string `.0` survives),
/// surrounding whitespace trimmed. Null stays null. Idempotent.
#[must_use]
pub fn normalize_code(cell: &CellValue) -> CellValue {
    if cell.is_null() {
        return CellValue::Null;
    }
    let rendered = cell.as_str();
    let trimmed = rendered.trim();
    let stripped = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    CellValue::String(stripped.to_string())
}

/// Load and normalize the two source tables from a workbook.
///
/// Returns `(contracts, pools)`: the contract-information sheet with named,
/// trimmed columns, and the union of all recognized pool sheets tagged with
/// a `Pool` column. Both tables have their join keys canonicalized so the
/// reconciler can join on exact string equality.
///
/// Several spellings of one pool name (trailing whitespace) union into a
/// single pool; recognized sheets with no rows at all are skipped.
///
/// # Errors
///
/// Fails fast with a schema error when the contract sheet, its key column,
/// the pool key column, or all pool sheets are missing. No partial tables
/// are produced.
pub fn load_workbook(book: &Book) -> Result<(Sheet, Sheet)> {
    let mut contracts = book
        .get_sheet(CONTRACT_SHEET)
        .map_err(|_| ExplorerError::SheetMissing {
            name: CONTRACT_SHEET.to_string(),
        })?
        .clone();
    // Row 0 is decorative; the real header is the second physical row
    contracts.promote_header_row(1)?;

    if !contracts.has_column(CONTRACT_KEY) {
        return Err(ExplorerError::column_missing(
            CONTRACT_KEY,
            "contract sheet",
            contracts.column_names(),
        ));
    }

    // Group recognized sheets by trimmed name first: a workbook may spell
    // the same pool with and without trailing whitespace, and both tabs
    // belong to that pool
    let mut recognized: Vec<(String, Vec<Sheet>)> = Vec::new();
    for (sheet_name, sheet) in book.sheets() {
        let trimmed = sheet_name.trim();
        if !POOL_SHEETS.contains(&trimmed) {
            debug!(sheet = sheet_name, "skipping unrecognized sheet");
            continue;
        }
        if sheet.is_empty() {
            debug!(sheet = sheet_name, "skipping empty pool sheet");
            continue;
        }
        let mut pool_sheet = sheet.clone();
        pool_sheet.promote_header_row(0)?;
        match recognized.iter_mut().find(|(name, _)| name.as_str() == trimmed) {
            Some((_, sheets)) => sheets.push(pool_sheet),
            None => recognized.push((trimmed.to_string(), vec![pool_sheet])),
        }
    }

    if recognized.is_empty() {
        return Err(ExplorerError::NoPoolSheets);
    }

    let mut pool_book = Book::new();
    for (name, sheets) in recognized {
        if sheets.len() > 1 {
            // Same pool under several spellings: union the tabs before the
            // cross-pool consolidation so the Pool tag stays canonical
            let mut spellings = Book::new();
            for (i, sheet) in sheets.into_iter().enumerate() {
                spellings.add_sheet(&format!("{name} {i}"), sheet)?;
            }
            pool_book.add_sheet(&name, spellings.consolidate()?)?;
        } else if let Some(sheet) = sheets.into_iter().next() {
            pool_book.add_sheet(&name, sheet)?;
        }
    }

    let options = ConsolidateOptions::default().with_source_column(POOL_COLUMN);
    let mut pools = pool_book.consolidate_with_options(&options)?;

    if !pools.has_column(POOL_KEY) {
        return Err(ExplorerError::column_missing(
            POOL_KEY,
            "pool sheets",
            pools.column_names(),
        ));
    }

    // Canonicalize both sides of the join key, plus the code columns the
    // filter facets run on
    pools.column_map_by_name(POOL_KEY, normalize_code)?;
    contracts.column_map_by_name(CONTRACT_KEY, normalize_code)?;
    for col in CODE_COLUMNS {
        if pools.has_column(col) {
            pools.column_map_by_name(col, normalize_code)?;
        }
    }

    info!(
        contracts = contracts.row_count(),
        awards = pools.row_count(),
        pools = pool_book.sheet_count(),
        "workbook normalized"
    );

    Ok((contracts, pools))
}

//! Reconciler: left-joins pool awards against contract records, derives the
//! vendor display name, and guarantees the analytical column set.

use crate::error::Result;
use crate::normalize::{CONTRACT_KEY, POOL_KEY};
use awardbook_table::{CellValue, Sheet};
use tracing::info;

/// Derived column holding the single resolved vendor name per row.
pub const VENDOR_DISPLAY: &str = "Vendor Display";

/// Vendor-name-bearing source columns, in priority order.
pub const VENDOR_CANDIDATES: [&str; 2] = ["Vendor", "Vendor Name"];

/// Suffix applied to contract-side columns whose names collide with a
/// pool-side column. Nothing is dropped on collision.
pub const CONTRACT_SUFFIX: &str = "_contract";

/// Columns guaranteed to exist on every merged row, null-filled when the
/// source never produced them. Consumers branch on value-is-null only,
/// never on column presence.
pub const GUARANTEED_COLUMNS: [&str; 7] = [
    "Pool",
    "Domain",
    "NAICS",
    "SIN",
    "UEI",
    "Vendor City",
    "ZIP Code",
];

/// The reconciled analytical dataset.
///
/// Immutable once built: every query produces a new table or an owned
/// value, never a mutation of this one.
#[derive(Debug, Clone)]
pub struct MergedTable {
    sheet: Sheet,
}

impl MergedTable {
    pub(crate) fn from_sheet(sheet: Sheet) -> Self {
        Self { sheet }
    }

    /// The underlying sheet.
    #[must_use]
    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// Number of merged rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.sheet.row_count()
    }
}

/// First non-null, non-empty value among candidate columns, in priority
/// order. Columns absent from the sheet are skipped.
#[must_use]
pub fn coalesce(sheet: &Sheet, row: usize, candidates: &[&str]) -> Option<String> {
    for name in candidates {
        let Some(idx) = sheet.column_index_of(name) else {
            continue;
        };
        let Ok(cell) = sheet.get(row, idx) else {
            continue;
        };
        if cell.is_null() {
            continue;
        }
        let value = cell.as_str();
        if !value.trim().is_empty() {
            return Some(value);
        }
    }
    None
}

/// Join the pool table against the contract table and finish the merged
/// schema.
///
/// Left join on the normalized keys: every pool award survives, unmatched
/// rows carry null contract fields, and a key matching several contract
/// records fans out into one row per match. Afterwards `Vendor Display` is
/// derived and the guaranteed columns are installed.
pub fn reconcile(contracts: &Sheet, pools: &Sheet) -> Result<MergedTable> {
    let mut merged = pools.left_join_on(contracts, POOL_KEY, CONTRACT_KEY, CONTRACT_SUFFIX)?;

    // Vendor Display is always a string; empty when no candidate column has
    // a value, never null
    let display: Vec<CellValue> = (0..merged.row_count())
        .map(|row| {
            CellValue::String(coalesce(&merged, row, &VENDOR_CANDIDATES).unwrap_or_default())
        })
        .collect();
    merged.push_column(VENDOR_DISPLAY, display)?;

    for column in GUARANTEED_COLUMNS {
        merged.ensure_column(column)?;
    }

    info!(rows = merged.row_count(), "tables reconciled");
    Ok(MergedTable::from_sheet(merged))
}

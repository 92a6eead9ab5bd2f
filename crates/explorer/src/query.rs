//! Query interface over the merged table: filtering, option lists,
//! aggregation, display projection, and CSV export.

use crate::normalize::{CONTRACT_KEY, POOL_KEY};
use crate::reconcile::{MergedTable, VENDOR_DISPLAY};
use awardbook_table::{CellValue, Sheet};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Columns the free-text search runs over. Both spellings of the contract
/// identifier are included so either side of the join is searchable.
pub const SEARCH_COLUMNS: [&str; 4] = [VENDOR_DISPLAY, "UEI", CONTRACT_KEY, POOL_KEY];

/// Fixed column set for the tabular display view.
pub const DISPLAY_COLUMNS: [&str; 9] = [
    VENDOR_DISPLAY,
    "Pool",
    "Domain",
    "SIN",
    "NAICS",
    CONTRACT_KEY,
    "UEI",
    "Vendor City",
    "ZIP Code",
];

/// A filter request. All parts compose by logical AND; empty parts are
/// no-ops.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    /// Case-insensitive substring matched against [`SEARCH_COLUMNS`].
    pub search: Option<String>,
    /// Exact-value selections per facet; empty means "all".
    pub pools: Vec<String>,
    pub domains: Vec<String>,
    pub naics: Vec<String>,
    pub sins: Vec<String>,
}

impl FilterSpec {
    /// A spec that passes every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string());
        self
    }
}

/// Headline metrics for the current row set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub unique_vendors: usize,
    pub unique_naics: usize,
    pub unique_pools: usize,
}

impl MergedTable {
    /// Apply a filter, producing a new table. The receiver is untouched.
    ///
    /// Search: a row passes when any search column's value contains the
    /// needle case-insensitively; a null cell or absent column is a
    /// non-match for that field only. Facets: a row passes when the facet
    /// column's value is a member of the selection. Everything ANDs.
    #[must_use]
    pub fn filter(&self, spec: &FilterSpec) -> MergedTable {
        let sheet = self.sheet();

        let needle = spec
            .search
            .as_deref()
            .map(str::to_lowercase)
            .filter(|s| !s.is_empty());
        let search_indices: Vec<usize> = SEARCH_COLUMNS
            .iter()
            .filter_map(|c| sheet.column_index_of(c))
            .collect();

        let facets: Vec<(usize, HashSet<&String>)> = [
            ("Pool", &spec.pools),
            ("Domain", &spec.domains),
            ("NAICS", &spec.naics),
            ("SIN", &spec.sins),
        ]
        .into_iter()
        .filter(|(_, selected)| !selected.is_empty())
        .filter_map(|(column, selected)| {
            sheet
                .column_index_of(column)
                .map(|idx| (idx, selected.iter().collect()))
        })
        .collect();

        let filtered = sheet.filtered_rows(|row| {
            if let Some(needle) = &needle {
                let hit = search_indices.iter().any(|&idx| {
                    row.get(idx).is_some_and(|cell| {
                        !cell.is_null() && cell.as_str().to_lowercase().contains(needle)
                    })
                });
                if !hit {
                    return false;
                }
            }

            facets.iter().all(|(idx, selected)| {
                row.get(*idx)
                    .is_some_and(|cell| !cell.is_null() && selected.contains(&cell.as_str()))
            })
        });

        MergedTable::from_sheet(filtered)
    }

    /// Distinct values of a column, sorted ascending, nulls excluded.
    ///
    /// Used to populate facet option lists. An absent column yields an
    /// empty list.
    #[must_use]
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.sheet().column_index_of(column) else {
            return Vec::new();
        };
        let values: BTreeSet<String> = self
            .sheet()
            .rows()
            .filter_map(|row| row.get(idx))
            .filter(|cell| !cell.is_null())
            .map(CellValue::as_str)
            .collect();
        values.into_iter().collect()
    }

    /// Count distinct `count_col` values per `group_col` value.
    ///
    /// Null group keys and null counted cells are skipped. Results are
    /// sorted by count descending (group name ascending on ties) and
    /// truncated to `top_n` when given.
    #[must_use]
    pub fn grouped_unique_count(
        &self,
        group_col: &str,
        count_col: &str,
        top_n: Option<usize>,
    ) -> Vec<(String, usize)> {
        let sheet = self.sheet();
        let (Some(group_idx), Some(count_idx)) = (
            sheet.column_index_of(group_col),
            sheet.column_index_of(count_col),
        ) else {
            return Vec::new();
        };

        let mut groups: HashMap<String, HashSet<String>> = HashMap::new();
        for row in sheet.rows() {
            let Some(group_cell) = row.get(group_idx) else {
                continue;
            };
            if group_cell.is_null() {
                continue;
            }
            let Some(count_cell) = row.get(count_idx) else {
                continue;
            };
            if count_cell.is_null() {
                continue;
            }
            groups
                .entry(group_cell.as_str())
                .or_default()
                .insert(count_cell.as_str());
        }

        let mut counts: Vec<(String, usize)> = groups
            .into_iter()
            .map(|(group, values)| (group, values.len()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(n) = top_n {
            counts.truncate(n);
        }
        counts
    }

    /// Headline metrics for this row set.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            rows: self.row_count(),
            unique_vendors: self.distinct_values(VENDOR_DISPLAY).len(),
            unique_naics: self.distinct_values("NAICS").len(),
            unique_pools: self.distinct_values("Pool").len(),
        }
    }

    /// Project onto the fixed display column set, restricted to columns the
    /// table actually carries.
    #[must_use]
    pub fn display_view(&self) -> Sheet {
        let present: Vec<&str> = DISPLAY_COLUMNS
            .iter()
            .copied()
            .filter(|c| self.sheet().has_column(c))
            .collect();
        // All display columns are guaranteed or derived, so the projection
        // cannot fail on a reconciled table
        self.sheet()
            .select_columns(&present)
            .unwrap_or_else(|_| Sheet::new())
    }

    /// Serialize the current row set as CSV, header included.
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        self.sheet().to_csv_string()
    }
}

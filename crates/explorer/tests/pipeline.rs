//! End-to-end pipeline tests against synthesized workbooks.

use awardbook_explorer::{
    explore_bytes, ErrorKind, ExplorerError, FilterSpec, TableCache, GUARANTEED_COLUMNS,
    VENDOR_DISPLAY,
};
use awardbook_table::Sheet;
use rust_xlsxwriter::{Workbook, Worksheet};

const CONTRACT_SHEET: &str = "OASIS+Contract Information";

fn contract_sheet() -> Worksheet {
    let mut sheet = Worksheet::new();
    sheet.set_name(CONTRACT_SHEET).unwrap();
    // First physical row is decorative; the real header is row 2
    sheet.write_string(0, 0, "OASIS+ Master Contract Listing").unwrap();
    // Trailing space on the key header exercises column-name trimming
    let headers = [
        "Contract Number ",
        "Vendor Name",
        "Domain",
        "UEI",
        "Vendor City",
        "ZIP Code",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(1, col as u16, *header).unwrap();
    }
    let rows = [
        [
            "47QRCA25D0001",
            "AEVEX Corp",
            "Technical & Engineering",
            "UEI0001",
            "Tampa",
            "33607",
        ],
        // Duplicate contract number: the join fans out
        [
            "47QRCA25D0002",
            "Globex LLC",
            "Management Advisory",
            "UEI0002",
            "Reston",
            "20190",
        ],
        [
            "47QRCA25D0002",
            "Globex Federal",
            "Logistics",
            "UEI0003",
            "Reston",
            "20190",
        ],
    ];
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet.write_string(2 + r as u32, c as u16, *value).unwrap();
        }
    }
    sheet
}

fn pool_8a_sheet() -> Worksheet {
    let mut sheet = Worksheet::new();
    sheet.set_name("8a").unwrap();
    for (col, header) in ["Contract #", "Vendor", "NAICS", "SIN"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    // Key carries the float artifact and stray whitespace
    sheet.write_string(1, 0, "47QRCA25D0001.0 ").unwrap();
    sheet.write_string(1, 1, "AEVEX Corp").unwrap();
    sheet.write_number(1, 2, 541_511.0).unwrap();
    sheet.write_string(1, 3, "541611.0").unwrap();

    // Two awards with no pool-side vendor; display falls back to the
    // contract sheet's Vendor Name
    sheet.write_string(2, 0, "47QRCA25D0002").unwrap();
    sheet.write_number(2, 2, 541_611.0).unwrap();
    sheet.write_string(2, 3, "X1").unwrap();

    // Award with no matching contract record
    sheet.write_string(3, 0, "ORPHAN1").unwrap();
    sheet.write_string(3, 1, "Lone Star").unwrap();
    sheet.write_number(3, 2, 111_111.0).unwrap();
    sheet.write_string(3, 3, "S1").unwrap();

    sheet
}

fn sdvo_sheet() -> Worksheet {
    let mut sheet = Worksheet::new();
    // Trailing space: the workbook author's spelling of the pool sheet
    sheet.set_name("Service Disabled Veteran Owned ").unwrap();
    sheet.write_string(0, 0, "Contract #").unwrap();
    sheet.write_string(0, 1, "Vendor").unwrap();
    sheet.write_string(1, 0, "47QRCA25D0001").unwrap();
    sheet.write_string(1, 1, "AEVEX Corp").unwrap();
    sheet
}

fn ignored_sheet() -> Worksheet {
    let mut sheet = Worksheet::new();
    sheet.set_name("Notes").unwrap();
    sheet.write_string(0, 0, "not award data").unwrap();
    sheet
}

/// The standard fixture: 3 contract records (one number duplicated), an 8a
/// pool with 3 awards, an SDVO pool (trailing-space sheet name) with 1
/// award, and one unrecognized sheet.
fn fixture_bytes() -> Vec<u8> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(contract_sheet());
    workbook.push_worksheet(pool_8a_sheet());
    workbook.push_worksheet(sdvo_sheet());
    workbook.push_worksheet(ignored_sheet());
    workbook.save_to_buffer().unwrap()
}

fn rows_with_key<'a>(sheet: &'a Sheet, key: &str) -> Vec<usize> {
    let idx = sheet.column_index_of("Contract #").unwrap();
    sheet
        .rows()
        .enumerate()
        .filter(|(_, row)| row[idx].as_str() == key)
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn merges_every_pool_row() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    // 8a: 1 match + 1 fan-out pair + 1 orphan = 4; SDVO: 1
    assert_eq!(table.row_count(), 5);
}

#[test]
fn join_key_is_normalized_before_matching() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    let sheet = table.sheet();

    let rows = rows_with_key(sheet, "47QRCA25D0001");
    // The artifact-laden 8a key and the clean SDVO key both normalized to
    // the same contract
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(
            sheet.get_by_name(row, "Contract Number").unwrap().as_str(),
            "47QRCA25D0001"
        );
        assert_eq!(
            sheet.get_by_name(row, "Domain").unwrap().as_str(),
            "Technical & Engineering"
        );
    }
}

#[test]
fn duplicate_contract_numbers_fan_out() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    let sheet = table.sheet();

    let rows = rows_with_key(sheet, "47QRCA25D0002");
    assert_eq!(rows.len(), 2);
    let mut domains: Vec<String> = rows
        .iter()
        .map(|&row| sheet.get_by_name(row, "Domain").unwrap().as_str())
        .collect();
    domains.sort();
    assert_eq!(domains, vec!["Logistics", "Management Advisory"]);
}

#[test]
fn unmatched_awards_survive_with_null_contract_fields() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    let sheet = table.sheet();

    let rows = rows_with_key(sheet, "ORPHAN1");
    assert_eq!(rows.len(), 1);
    let row = rows[0];
    assert!(sheet.get_by_name(row, "Contract Number").unwrap().is_null());
    assert!(sheet.get_by_name(row, "Domain").unwrap().is_null());
    assert!(sheet.get_by_name(row, "UEI").unwrap().is_null());
    // The pool side is intact
    assert_eq!(
        sheet.get_by_name(row, VENDOR_DISPLAY).unwrap().as_str(),
        "Lone Star"
    );
}

#[test]
fn trailing_space_pool_sheet_is_trimmed() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    assert_eq!(
        table.distinct_values("Pool"),
        vec![
            "8a".to_string(),
            "Service Disabled Veteran Owned".to_string()
        ]
    );
}

#[test]
fn same_pool_under_both_spellings_unions_into_one_pool() {
    // One pool tab with the trailing-space spelling and one without; both
    // belong to the SDVO pool and both rows must survive under one tag
    let mut plain = Worksheet::new();
    plain.set_name("Service Disabled Veteran Owned").unwrap();
    plain.write_string(0, 0, "Contract #").unwrap();
    plain.write_string(0, 1, "Vendor").unwrap();
    plain.write_string(1, 0, "47QRCA25D0002").unwrap();
    plain.write_string(1, 1, "Globex LLC").unwrap();

    let mut workbook = Workbook::new();
    workbook.push_worksheet(contract_sheet());
    workbook.push_worksheet(sdvo_sheet());
    workbook.push_worksheet(plain);
    let bytes = workbook.save_to_buffer().unwrap();

    let table = explore_bytes(&bytes).unwrap();
    // SDVO tab: 1 row; plain tab: 1 row fanning out to 2 contract records
    assert_eq!(table.row_count(), 3);
    assert_eq!(
        table.distinct_values("Pool"),
        vec!["Service Disabled Veteran Owned".to_string()]
    );
}

#[test]
fn empty_recognized_pool_sheet_is_skipped() {
    let mut empty = Worksheet::new();
    empty.set_name("Unrestricted").unwrap();

    let mut workbook = Workbook::new();
    workbook.push_worksheet(contract_sheet());
    workbook.push_worksheet(pool_8a_sheet());
    workbook.push_worksheet(empty);
    let bytes = workbook.save_to_buffer().unwrap();

    let table = explore_bytes(&bytes).unwrap();
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.distinct_values("Pool"), vec!["8a".to_string()]);
}

#[test]
fn vendor_display_prefers_pool_vendor_then_contract_name() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    let sheet = table.sheet();

    // Pool-side Vendor wins when present
    let matched = rows_with_key(sheet, "47QRCA25D0001");
    for row in matched {
        assert_eq!(
            sheet.get_by_name(row, VENDOR_DISPLAY).unwrap().as_str(),
            "AEVEX Corp"
        );
    }

    // Empty pool-side Vendor falls back to the contract's Vendor Name
    let fanned = rows_with_key(sheet, "47QRCA25D0002");
    let mut names: Vec<String> = fanned
        .iter()
        .map(|&row| sheet.get_by_name(row, VENDOR_DISPLAY).unwrap().as_str())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Globex Federal", "Globex LLC"]);
}

#[test]
fn guaranteed_columns_exist_on_every_row() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    let sheet = table.sheet();
    for column in GUARANTEED_COLUMNS {
        let idx = sheet
            .column_index_of(column)
            .unwrap_or_else(|| panic!("column {column} missing"));
        for row in sheet.rows() {
            assert!(row.get(idx).is_some(), "row too short for {column}");
        }
    }
}

#[test]
fn facet_filters_compose_by_intersection() {
    let table = explore_bytes(&fixture_bytes()).unwrap();

    let spec = FilterSpec {
        pools: vec!["8a".to_string()],
        naics: vec!["541511".to_string()],
        ..FilterSpec::default()
    };
    // 8a alone matches 4 rows, NAICS alone matches 1; AND yields 1
    assert_eq!(table.filter(&spec).row_count(), 1);

    let pool_only = FilterSpec {
        pools: vec!["8a".to_string()],
        ..FilterSpec::default()
    };
    assert_eq!(table.filter(&pool_only).row_count(), 4);
}

#[test]
fn search_is_case_insensitive_across_fields() {
    let table = explore_bytes(&fixture_bytes()).unwrap();

    // Vendor display, both pools
    assert_eq!(table.filter(&FilterSpec::all().with_search("aevex")).row_count(), 2);
    // UEI
    assert_eq!(table.filter(&FilterSpec::all().with_search("uei0003")).row_count(), 1);
    // Contract identifier, either spelling
    assert_eq!(table.filter(&FilterSpec::all().with_search("d0002")).row_count(), 2);
    assert_eq!(table.filter(&FilterSpec::all().with_search("orphan")).row_count(), 1);
    // Non-match
    assert_eq!(table.filter(&FilterSpec::all().with_search("zzz")).row_count(), 0);
}

#[test]
fn filtering_leaves_the_source_table_intact() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    let before = table.row_count();
    let _ = table.filter(&FilterSpec::all().with_search("aevex"));
    assert_eq!(table.row_count(), before);
}

#[test]
fn distinct_values_sorted_without_nulls() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    // The SDVO row has no NAICS column value (null after consolidation)
    assert_eq!(
        table.distinct_values("NAICS"),
        vec!["111111".to_string(), "541511".to_string(), "541611".to_string()]
    );
    assert_eq!(table.distinct_values("No Such Column"), Vec::<String>::new());
}

#[test]
fn grouped_unique_counts_order_and_truncate() {
    let table = explore_bytes(&fixture_bytes()).unwrap();

    let by_pool = table.grouped_unique_count("Pool", VENDOR_DISPLAY, None);
    assert_eq!(
        by_pool,
        vec![
            ("8a".to_string(), 4),
            ("Service Disabled Veteran Owned".to_string(), 1)
        ]
    );

    let by_naics = table.grouped_unique_count("NAICS", VENDOR_DISPLAY, Some(2));
    assert_eq!(by_naics.len(), 2);
    assert_eq!(by_naics[0], ("541611".to_string(), 2));
    // Ties break by group name ascending
    assert_eq!(by_naics[1], ("111111".to_string(), 1));
}

#[test]
fn summary_matches_distinct_counts() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    let summary = table.summary();
    assert_eq!(summary.rows, table.row_count());
    assert_eq!(summary.unique_vendors, table.distinct_values(VENDOR_DISPLAY).len());
    assert_eq!(summary.unique_naics, 3);
    assert_eq!(summary.unique_pools, 2);
}

#[test]
fn export_round_trips_filtered_rows() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    let filtered = table.filter(&FilterSpec {
        pools: vec!["8a".to_string()],
        ..FilterSpec::default()
    });

    let csv = filtered.to_csv_string();
    let restored = Sheet::from_csv_str(&csv, true).unwrap();

    assert_eq!(restored.row_count(), filtered.row_count());
    let original: Vec<String> = filtered
        .sheet()
        .column_by_name(VENDOR_DISPLAY)
        .unwrap()
        .iter()
        .map(awardbook_table::CellValue::as_str)
        .collect();
    let roundtripped: Vec<String> = restored
        .column_by_name(VENDOR_DISPLAY)
        .unwrap()
        .iter()
        .map(awardbook_table::CellValue::as_str)
        .collect();
    assert_eq!(original, roundtripped);
}

#[test]
fn display_view_keeps_only_display_columns() {
    let table = explore_bytes(&fixture_bytes()).unwrap();
    let view = table.display_view();
    assert_eq!(view.row_count(), table.row_count());
    assert!(view.has_column(VENDOR_DISPLAY));
    assert!(view.has_column("Pool"));
    // Join-side bookkeeping columns are projected away
    assert!(!view.has_column("Contract #"));
}

#[test]
fn missing_contract_sheet_is_a_schema_error() {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(pool_8a_sheet());
    let bytes = workbook.save_to_buffer().unwrap();

    let err = explore_bytes(&bytes).unwrap_err();
    assert!(matches!(err, ExplorerError::SheetMissing { .. }));
    assert_eq!(err.kind(), ErrorKind::Schema);
}

#[test]
fn missing_contract_number_column_names_found_columns() {
    let mut workbook = Workbook::new();
    let mut sheet = Worksheet::new();
    sheet.set_name(CONTRACT_SHEET).unwrap();
    sheet.write_string(0, 0, "banner").unwrap();
    sheet.write_string(1, 0, "Vendor Name").unwrap();
    sheet.write_string(2, 0, "Acme").unwrap();
    workbook.push_worksheet(sheet);
    workbook.push_worksheet(pool_8a_sheet());
    let bytes = workbook.save_to_buffer().unwrap();

    match explore_bytes(&bytes).unwrap_err() {
        ExplorerError::ColumnMissing { column, found, .. } => {
            assert_eq!(column, "Contract Number");
            assert!(found.contains(&"Vendor Name".to_string()));
        }
        other => panic!("expected ColumnMissing, got {other:?}"),
    }
}

#[test]
fn workbook_without_pool_sheets_is_rejected() {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(contract_sheet());
    workbook.push_worksheet(ignored_sheet());
    let bytes = workbook.save_to_buffer().unwrap();

    assert!(matches!(
        explore_bytes(&bytes).unwrap_err(),
        ExplorerError::NoPoolSheets
    ));
}

#[test]
fn undecodable_blob_is_a_parse_error() {
    let err = explore_bytes(b"definitely not a zip container").unwrap_err();
    assert!(matches!(err, ExplorerError::Workbook(_)));
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn cache_shares_tables_by_content_identity() {
    let bytes = fixture_bytes();
    let mut cache = TableCache::new();

    let first = cache.load_or_insert(&bytes).unwrap();
    let second = cache.load_or_insert(&bytes).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    // A different workbook lands on a different entry
    let mut workbook = Workbook::new();
    workbook.push_worksheet(contract_sheet());
    workbook.push_worksheet(sdvo_sheet());
    let other_bytes = workbook.save_to_buffer().unwrap();
    let third = cache.load_or_insert(&other_bytes).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &third));
    assert_eq!(cache.len(), 2);
}

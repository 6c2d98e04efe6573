//! Workbook comparisons end to end

use crate::common::assertions::{assert_only_unchanged, changes_of};
use crate::common::{sample_data, TestFixture};
use docdiff::diff::DiffKind;
use docdiff::{compare, CompareConfig, DocumentKind};

#[test]
fn test_self_comparison_is_unchanged() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_xlsx("inventory.xlsx", &sample_data::inventory()).unwrap();

    let result = compare(&path, &path, DocumentKind::Spreadsheet, &CompareConfig::default()).unwrap();

    assert_only_unchanged(&result);
    assert_eq!(result.summary.unchanged, 12);
    assert!(result.is_identical());
}

#[test]
fn test_single_value_change() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_xlsx("a.xlsx", &sample_data::inventory()).unwrap();
    let b = fixture.create_xlsx("b.xlsx", &sample_data::inventory_qty_changed()).unwrap();

    let result = compare(&a, &b, DocumentKind::Spreadsheet, &CompareConfig::default()).unwrap();

    let changes: Vec<_> = result.changes().collect();
    assert_eq!(changes.len(), 1, "unexpected changes: {:?}", changes);
    let entry = changes[0];
    assert_eq!(entry.kind, DiffKind::Modified);
    assert_eq!(entry.path, "Sheet1!B2");
    assert_eq!(entry.deltas.len(), 1);
    assert_eq!(entry.deltas[0].attribute, "value");
    assert_eq!(entry.deltas[0].before, "10");
    assert_eq!(entry.deltas[0].after, "20");
}

#[test]
fn test_inserted_top_row_is_added() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_xlsx("a.xlsx", &sample_data::inventory()).unwrap();
    let mut rows = vec![vec!["Stock list", "", ""]];
    rows.extend(sample_data::inventory());
    let b = fixture.create_xlsx("b.xlsx", &rows).unwrap();

    let result = compare(&a, &b, DocumentKind::Spreadsheet, &CompareConfig::default()).unwrap();

    let added = changes_of(&result, DiffKind::Added);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].path, "Sheet1!A1");
    assert_eq!(added[0].after.as_deref(), Some("Stock list"));
    assert_eq!(result.summary.unchanged, 12);
    assert_eq!(result.summary.total_changes(), 1);
}

#[test]
fn test_formula_only_change() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture
        .create_xlsx("a.xlsx", &[vec!["Base", "Total"], vec!["10", "=A2*2|20"]])
        .unwrap();
    let b = fixture
        .create_xlsx("b.xlsx", &[vec!["Base", "Total"], vec!["10", "=A2+10|20"]])
        .unwrap();

    let result = compare(&a, &b, DocumentKind::Spreadsheet, &CompareConfig::default()).unwrap();

    let modified = changes_of(&result, DiffKind::Modified);
    assert_eq!(modified.len(), 1);
    assert_eq!(modified[0].path, "Sheet1!B2");
    let attributes: Vec<&str> = modified[0].deltas.iter().map(|d| d.attribute.as_str()).collect();
    assert_eq!(attributes, vec!["formula"]);
    assert_eq!(modified[0].deltas[0].before, "=A2*2");
    assert_eq!(modified[0].deltas[0].after, "=A2+10");
}

#[test]
fn test_moved_row_is_reported_moved() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_xlsx("a.xlsx", &sample_data::inventory()).unwrap();
    let mut rows = sample_data::inventory();
    let plums = rows.remove(3);
    rows.insert(1, plums);
    let b = fixture.create_xlsx("b.xlsx", &rows).unwrap();

    let result = compare(&a, &b, DocumentKind::Spreadsheet, &CompareConfig::default()).unwrap();

    assert_eq!(result.summary.added, 0);
    assert_eq!(result.summary.removed, 0);
    assert_eq!(result.summary.modified, 0);
    assert!(result.summary.moved >= 3, "summary: {:?}", result.summary);
    let moved = changes_of(&result, DiffKind::Moved);
    assert!(moved.iter().any(|e| e.path == "Sheet1!A2" && e.after.as_deref() == Some("Plums")));
    assert!(moved.iter().all(|e| e.before_position.is_some() && e.after_position.is_some()));
}

#[test]
fn test_keyed_rows_follow_their_key() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture
        .create_xlsx(
            "a.xlsx",
            &[
                vec!["Code", "Name", "Stock"],
                vec!["A-1", "Bolt", "100"],
                vec!["B-2", "Nut", "250"],
                vec!["C-3", "Washer", "75"],
            ],
        )
        .unwrap();
    let b = fixture
        .create_xlsx(
            "b.xlsx",
            &[
                vec!["Code", "Name", "Stock"],
                vec!["C-3", "Washer", "80"],
                vec!["A-1", "Bolt", "100"],
                vec!["B-2", "Nut", "250"],
            ],
        )
        .unwrap();
    let config = CompareConfig::default().with_key_header("code");

    let result = compare(&a, &b, DocumentKind::Spreadsheet, &config).unwrap();

    assert_eq!(result.summary.added, 0);
    assert_eq!(result.summary.removed, 0);
    let stock = result
        .entries()
        .find(|e| e.path == "Sheet1!C2")
        .expect("entry for the washer stock");
    assert_eq!(stock.before.as_deref(), Some("75"));
    assert_eq!(stock.after.as_deref(), Some("80"));
    assert_eq!(stock.deltas.len(), 1);
}

#[test]
fn test_added_and_renamed_sheets() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture
        .create_workbook("a.xlsx", &[("Stock", sample_data::inventory())])
        .unwrap();
    let b = fixture
        .create_workbook(
            "b.xlsx",
            &[
                ("Inventory", sample_data::inventory()),
                ("Notes", vec![vec!["checked"]]),
            ],
        )
        .unwrap();

    let result = compare(&a, &b, DocumentKind::Spreadsheet, &CompareConfig::default()).unwrap();

    assert_eq!(result.sections.len(), 2);
    assert!(result.sections[0].is_renamed());
    assert_eq!(result.sections[0].before_name.as_deref(), Some("Stock"));
    assert_eq!(result.sections[0].summary().unchanged, 12);
    assert_eq!(result.sections[1].name, "Notes");
    assert_eq!(result.sections[1].before_name, None);
    assert_eq!(result.summary.added, 1);
    assert_eq!(result.summary.total_changes(), 1);
}

#[test]
fn test_edited_row_next_to_inserted_row() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture
        .create_xlsx("a.xlsx", &[vec!["Item", "Qty"], vec!["Apples", "10"], vec!["Pears", "5"]])
        .unwrap();
    let b = fixture
        .create_xlsx(
            "b.xlsx",
            &[
                vec!["Item", "Qty"],
                vec!["Apples", "20"],
                vec!["Kiwi", "7"],
                vec!["Pears", "5"],
            ],
        )
        .unwrap();

    let result = compare(&a, &b, DocumentKind::Spreadsheet, &CompareConfig::default()).unwrap();

    assert_eq!(result.summary.modified, 1, "summary: {:?}", result.summary);
    assert_eq!(result.summary.added, 2);
    assert_eq!(result.summary.removed, 0);
    let modified = changes_of(&result, DiffKind::Modified);
    assert_eq!(modified[0].path, "Sheet1!B2");
    assert_eq!(modified[0].before.as_deref(), Some("10"));
    assert_eq!(modified[0].after.as_deref(), Some("20"));
    let added: Vec<&str> = changes_of(&result, DiffKind::Added).iter().map(|e| e.path.as_str()).collect();
    assert_eq!(added, vec!["Sheet1!A3", "Sheet1!B3"]);
}

#[test]
fn test_keyed_rows_with_new_key_are_added_and_removed() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture
        .create_xlsx(
            "a.xlsx",
            &[
                vec!["S.no", "Item", "Qty"],
                vec!["1", "Bolt", "100"],
                vec!["2", "Nut", "250"],
                vec!["3", "Washer", "75"],
            ],
        )
        .unwrap();
    let b = fixture
        .create_xlsx(
            "b.xlsx",
            &[
                vec!["S.no", "Item", "Qty"],
                vec!["1", "Bolt", "100"],
                vec!["9", "Nut", "250"],
                vec!["3", "Washer", "75"],
            ],
        )
        .unwrap();
    let config = CompareConfig::default().with_key_header("S.no");

    let result = compare(&a, &b, DocumentKind::Spreadsheet, &config).unwrap();

    assert_eq!(result.summary.modified, 0, "summary: {:?}", result.summary);
    assert_eq!(result.summary.moved, 0);
    assert_eq!(result.summary.removed, 3);
    assert_eq!(result.summary.added, 3);
    let removed = changes_of(&result, DiffKind::Removed);
    assert_eq!(removed[0].before.as_deref(), Some("2"));
    let added = changes_of(&result, DiffKind::Added);
    assert_eq!(added[0].after.as_deref(), Some("9"));
}

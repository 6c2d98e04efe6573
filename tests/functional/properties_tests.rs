//! Properties that hold for any pair of inputs

use crate::common::{sample_data, TestFixture};
use docdiff::diff::DiffKind;
use docdiff::{compare, CompareConfig, DocumentKind};

fn edited_workbook(fixture: &TestFixture) -> (std::path::PathBuf, std::path::PathBuf) {
    let a = fixture.create_xlsx("a.xlsx", &sample_data::inventory()).unwrap();
    let b = fixture
        .create_xlsx(
            "b.xlsx",
            &[
                vec!["Item", "Qty", "Price"],
                vec!["Apples", "20", "1.5"],
                vec!["Plums", "12", "3"],
                vec!["Cherries", "40", "6"],
            ],
        )
        .unwrap();
    (a, b)
}

#[test]
fn test_swapping_inputs_mirrors_the_result() {
    let fixture = TestFixture::new().unwrap();
    let (a, b) = edited_workbook(&fixture);
    let config = CompareConfig::default();

    let forward = compare(&a, &b, DocumentKind::Spreadsheet, &config).unwrap();
    let backward = compare(&b, &a, DocumentKind::Spreadsheet, &config).unwrap();

    assert_eq!(forward.summary.added, backward.summary.removed);
    assert_eq!(forward.summary.removed, backward.summary.added);
    assert_eq!(forward.summary.modified, backward.summary.modified);
    assert_eq!(forward.summary.moved, backward.summary.moved);
    assert_eq!(forward.summary.unchanged, backward.summary.unchanged);

    for entry in forward.entries().filter(|e| e.kind == DiffKind::Modified) {
        let mirrored = backward
            .entries()
            .find(|e| e.kind == DiffKind::Modified && e.before == entry.after && e.after == entry.before)
            .unwrap_or_else(|| panic!("no mirrored entry for {}", entry.path));
        for (delta, back) in entry.deltas.iter().zip(&mirrored.deltas) {
            assert_eq!(delta.attribute, back.attribute);
            assert_eq!(delta.before, back.after);
            assert_eq!(delta.after, back.before);
        }
    }
}

#[test]
fn test_moved_positions_swap_with_inputs() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_xlsx("a.xlsx", &sample_data::inventory()).unwrap();
    let mut rows = sample_data::inventory();
    rows.swap(1, 3);
    let b = fixture.create_xlsx("b.xlsx", &rows).unwrap();
    let config = CompareConfig::default();

    let forward = compare(&a, &b, DocumentKind::Spreadsheet, &config).unwrap();
    let backward = compare(&b, &a, DocumentKind::Spreadsheet, &config).unwrap();

    assert!(forward.summary.moved > 0);
    assert_eq!(forward.summary.moved, backward.summary.moved);
    for entry in forward.entries().filter(|e| e.kind == DiffKind::Moved) {
        assert!(backward.entries().any(|e| e.kind == DiffKind::Moved
            && e.before_position == entry.after_position
            && e.after_position == entry.before_position));
    }
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let fixture = TestFixture::new().unwrap();
    let (a, b) = edited_workbook(&fixture);
    let config = CompareConfig::default();

    let first = compare(&a, &b, DocumentKind::Spreadsheet, &config).unwrap().to_json().unwrap();
    let second = compare(&a, &b, DocumentKind::Spreadsheet, &config).unwrap().to_json().unwrap();
    let sequential = compare(&a, &b, DocumentKind::Spreadsheet, &config.clone().with_parallel(false))
        .unwrap()
        .to_json()
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, sequential);
}

#[test]
fn test_pdf_runs_are_byte_identical() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_pdf("a.pdf", &sample_data::report_pages()).unwrap();
    let b = fixture.create_pdf("b.pdf", &sample_data::report_pages_edited()).unwrap();
    let config = CompareConfig::default();

    let first = compare(&a, &b, DocumentKind::Pdf, &config).unwrap().to_json().unwrap();
    let second = compare(&a, &b, DocumentKind::Pdf, &config).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_json_uses_stable_field_names() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_xlsx("a.xlsx", &sample_data::inventory()).unwrap();
    let b = fixture.create_xlsx("b.xlsx", &sample_data::inventory_qty_changed()).unwrap();

    let result = compare(&a, &b, DocumentKind::Spreadsheet, &CompareConfig::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    assert_eq!(value["kind"], "excel");
    let entry = value["sections"][0]["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["kind"] == "modified")
        .unwrap();
    for field in ["section", "path", "before", "after", "deltas", "confidence"] {
        assert!(entry.get(field).is_some(), "missing field {}", field);
    }
    assert_eq!(entry["path"], "Sheet1!B2");
    assert_eq!(value["summary"]["modified"], 1);
}

//! Edge case tests for page layout and sparse documents

use crate::common::{sample_data, TestFixture};
use docdiff::diff::DiffKind;
use docdiff::extract::layout::{group_blocks, LayoutParams, TextRun};
use docdiff::{compare, CompareConfig, DocumentKind};

fn params() -> LayoutParams {
    LayoutParams {
        baseline_tolerance: 0.3,
        line_gap_factor: 1.5,
    }
}

fn run(text: &str, x: f64, y: f64) -> TextRun {
    TextRun {
        text: text.to_string(),
        x,
        y,
        width: text.chars().count() as f64 * 5.0,
        size: 10.0,
        font: "Times-Roman".to_string(),
    }
}

#[test]
fn test_two_columns_read_left_then_right() {
    let runs = vec![
        run("right one", 320.0, 100.0),
        run("left one", 72.0, 100.0),
        run("left two", 72.0, 112.0),
        run("right two", 320.0, 112.0),
    ];
    let blocks = group_blocks(runs, &params());
    let texts: Vec<&str> = blocks.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(texts, vec!["left one left two", "right one right two"]);
    assert_eq!(blocks[1].order, 1);
}

#[test]
fn test_whitespace_only_runs_produce_no_blocks() {
    let blocks = group_blocks(vec![run("   ", 72.0, 100.0), run("\t", 90.0, 100.0)], &params());
    assert!(blocks.is_empty());
}

#[test]
fn test_empty_page_against_filled_page() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_pdf("a.pdf", &[vec![]]).unwrap();
    let b = fixture.create_pdf("b.pdf", &[vec!["Draft notice"]]).unwrap();

    let result = compare(&a, &b, DocumentKind::Pdf, &CompareConfig::default()).unwrap();

    assert_eq!(result.sections.len(), 1);
    assert_eq!(result.summary.added, 1);
    assert_eq!(result.summary.total_changes(), 1);
    assert_eq!(result.entries().next().map(|e| e.kind), Some(DiffKind::Added));
}

#[test]
fn test_empty_workbook_sheet_against_filled_sheet() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_xlsx("a.xlsx", &[]).unwrap();
    let b = fixture.create_xlsx("b.xlsx", &sample_data::inventory()).unwrap();

    let result = compare(&a, &b, DocumentKind::Spreadsheet, &CompareConfig::default()).unwrap();

    assert_eq!(result.summary.added, 12);
    assert_eq!(result.summary.removed, 0);
    assert!(result.entries().all(|e| e.kind == DiffKind::Added));
}

//! PDF comparisons end to end

use crate::common::assertions::{assert_only_unchanged, changes_of};
use crate::common::{sample_data, TestFixture};
use docdiff::diff::DiffKind;
use docdiff::extract::extract;
use docdiff::model::Unit;
use docdiff::{compare, CompareConfig, DocumentKind};

#[test]
fn test_extracts_one_block_per_paragraph() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_pdf("report.pdf", &sample_data::report_pages()).unwrap();

    let document = extract(&path, DocumentKind::Pdf, &CompareConfig::default()).unwrap();

    assert_eq!(document.sections().len(), 2);
    assert_eq!(document.sections()[0].name(), "Page 1");
    let texts: Vec<&str> = document.sections()[0]
        .units()
        .iter()
        .filter_map(Unit::as_block)
        .map(|b| b.text.as_str())
        .collect();
    assert_eq!(
        texts,
        vec!["Quarterly Report", "The results were good overall.", "Revenue grew in every region."]
    );
    let style = &document.sections()[0].units()[0].as_block().unwrap().style;
    assert_eq!(style.font, "Helvetica");
    assert_eq!(style.size, 12.0);
    assert!(document.warnings().is_empty());
}

#[test]
fn test_self_comparison_is_unchanged() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_pdf("report.pdf", &sample_data::report_pages()).unwrap();

    let result = compare(&path, &path, DocumentKind::Pdf, &CompareConfig::default()).unwrap();

    assert_only_unchanged(&result);
    assert_eq!(result.summary.unchanged, 5);
}

#[test]
fn test_paragraph_edit_is_modified_in_place() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_pdf("a.pdf", &sample_data::report_pages()).unwrap();
    let b = fixture.create_pdf("b.pdf", &sample_data::report_pages_edited()).unwrap();

    let result = compare(&a, &b, DocumentKind::Pdf, &CompareConfig::default()).unwrap();

    let changes: Vec<_> = result.changes().collect();
    assert_eq!(changes.len(), 1, "unexpected changes: {:?}", changes);
    assert_eq!(changes[0].kind, DiffKind::Modified);
    assert_eq!(changes[0].path, "Page 1#2");
    assert_eq!(changes[0].deltas[0].attribute, "text");
    assert_eq!(changes[0].deltas[0].before, "The results were good overall.");
    assert_eq!(changes[0].deltas[0].after, "The results were great overall.");
    assert_eq!(result.summary.moved, 0);
}

#[test]
fn test_added_page() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_pdf("a.pdf", &sample_data::report_pages()).unwrap();
    let mut pages = sample_data::report_pages();
    pages.push(vec!["Appendix"]);
    let b = fixture.create_pdf("b.pdf", &pages).unwrap();

    let result = compare(&a, &b, DocumentKind::Pdf, &CompareConfig::default()).unwrap();

    let added = changes_of(&result, DiffKind::Added);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].path, "Page 3#1");
    assert_eq!(result.sections.last().map(|s| s.before_name.is_none()), Some(true));
}

#[test]
fn test_removed_paragraph() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_pdf("a.pdf", &sample_data::report_pages()).unwrap();
    let b = fixture
        .create_pdf(
            "b.pdf",
            &[
                vec!["Quarterly Report", "The results were good overall."],
                vec!["Outlook", "We expect steady demand next year."],
            ],
        )
        .unwrap();

    let result = compare(&a, &b, DocumentKind::Pdf, &CompareConfig::default()).unwrap();

    let removed = changes_of(&result, DiffKind::Removed);
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].before.as_deref(), Some("Revenue grew in every region."));
    assert_eq!(result.summary.total_changes(), 1);
}

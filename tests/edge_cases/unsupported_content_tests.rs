//! Content that cannot be compared: strict mode fails, lenient mode warns

use crate::common::{sample_data, FixtureFont, TestFixture};
use docdiff::config::Strictness;
use docdiff::extract::extract;
use docdiff::model::Unit;
use docdiff::{compare, CompareConfig, DocdiffError, DocumentKind};

fn one_page() -> Vec<Vec<&'static str>> {
    vec![vec!["Quarterly Report", "Totals by region"]]
}

#[test]
fn test_encrypted_pdf_is_unsupported() {
    let fixture = TestFixture::new().unwrap();
    let locked = fixture
        .create_encrypted_pdf("locked.pdf", &sample_data::report_pages())
        .unwrap();
    let plain = fixture.create_pdf("plain.pdf", &sample_data::report_pages()).unwrap();

    let error = compare(&locked, &plain, DocumentKind::Pdf, &CompareConfig::default()).unwrap_err();
    match error {
        DocdiffError::UnsupportedContent { ref path, .. } => assert!(path.ends_with("locked.pdf")),
        other => panic!("Expected UnsupportedContent, got {:?}", other),
    }

    let lenient = CompareConfig::default().with_strictness(Strictness::Lenient);
    let error = compare(&plain, &locked, DocumentKind::Pdf, &lenient).unwrap_err();
    assert_eq!(error.kind_name(), "UnsupportedContent");
}

#[test]
fn test_undecodable_font_fails_in_strict_mode() {
    let fixture = TestFixture::new().unwrap();
    let cid = fixture
        .create_pdf_with("cid.pdf", &one_page(), FixtureFont::CompositeUnmapped, false)
        .unwrap();
    let plain = fixture.create_pdf("plain.pdf", &one_page()).unwrap();

    let error = compare(&cid, &plain, DocumentKind::Pdf, &CompareConfig::default()).unwrap_err();
    match error {
        DocdiffError::UnsupportedContent { location, detail, .. } => {
            assert_eq!(location, "Page 1");
            assert!(detail.contains("ToUnicode"), "detail: {}", detail);
        }
        other => panic!("Expected UnsupportedContent, got {:?}", other),
    }
}

#[test]
fn test_undecodable_font_page_is_skipped_with_warning_in_lenient_mode() {
    let fixture = TestFixture::new().unwrap();
    let cid = fixture
        .create_pdf_with("cid.pdf", &one_page(), FixtureFont::CompositeUnmapped, false)
        .unwrap();
    let plain = fixture.create_pdf("plain.pdf", &one_page()).unwrap();
    let config = CompareConfig::default().with_strictness(Strictness::Lenient);

    let result = compare(&cid, &plain, DocumentKind::Pdf, &config).unwrap();

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].location, "Page 1");
    assert!(result.warnings[0].source.ends_with("cid.pdf"));
    assert_eq!(result.summary.added, 2);
    assert_eq!(result.summary.total_changes(), 2);
}

#[test]
fn test_composite_font_with_unicode_map_is_readable() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_pdf_with("mapped.pdf", &one_page(), FixtureFont::Composite, false)
        .unwrap();

    let document = extract(&path, DocumentKind::Pdf, &CompareConfig::default()).unwrap();

    let texts: Vec<&str> = document.sections()[0]
        .units()
        .iter()
        .filter_map(Unit::as_block)
        .map(|b| b.text.as_str())
        .collect();
    assert_eq!(texts, vec!["Quarterly Report", "Totals by region"]);
    assert_eq!(document.sections()[0].units()[0].as_block().unwrap().style.font, "FixtureSans");
    assert!(document.warnings().is_empty());
}

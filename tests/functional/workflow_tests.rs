//! CLI workflows run in-process

use crate::common::assertions::assert_file_exists_and_not_empty;
use crate::common::{sample_data, CliTestRunner};
use std::fs;

#[test]
fn test_compare_writes_text_report() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner.fixture().create_xlsx("a.xlsx", &sample_data::inventory()).unwrap();
    let b = runner
        .fixture()
        .create_xlsx("b.xlsx", &sample_data::inventory_qty_changed())
        .unwrap();
    let report = runner.fixture().path("report.txt");

    runner.expect_success(&[
        "compare",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--output",
        report.to_str().unwrap(),
        "--changes-only",
    ]);

    assert_file_exists_and_not_empty(&report);
    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains("Sheet1!B2"));
    assert!(text.contains("'10' → '20'"));
    assert!(!text.contains("Sheet1!A1"));
}

#[test]
fn test_compare_writes_json_report() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner.fixture().create_pdf("a.pdf", &sample_data::report_pages()).unwrap();
    let b = runner
        .fixture()
        .create_pdf("b.pdf", &sample_data::report_pages_edited())
        .unwrap();
    let report = runner.fixture().path("report.json");

    runner.expect_success(&[
        "compare",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--kind",
        "pdf",
        "--format",
        "json",
        "--output",
        report.to_str().unwrap(),
    ]);

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["kind"], "pdf");
    assert_eq!(value["summary"]["modified"], 1);
    assert_eq!(value["summary"]["unchanged"], 4);
}

#[test]
fn test_compare_with_config_file_and_lenient_flag() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner.fixture().create_xlsx("a.xlsx", &sample_data::inventory()).unwrap();
    let config = runner
        .fixture()
        .create_raw("config.json", br#"{"similarity_threshold": 0.8, "parallel": false}"#)
        .unwrap();
    let report = runner.fixture().path("out.txt");

    runner.expect_success(&[
        "compare",
        a.to_str().unwrap(),
        a.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--lenient",
        "--output",
        report.to_str().unwrap(),
    ]);

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains("Unchanged: 12"));
    assert!(!text.contains("Warnings"));
}

#[test]
fn test_extract_command() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner.fixture().create_xlsx("a.xlsx", &sample_data::inventory()).unwrap();

    runner.expect_success(&["extract", a.to_str().unwrap()]);
    runner.expect_success(&["extract", a.to_str().unwrap(), "--format", "json"]);
}

#[test]
fn test_compare_rejects_bad_config_file() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner.fixture().create_xlsx("a.xlsx", &sample_data::inventory()).unwrap();
    let config = runner
        .fixture()
        .create_raw("config.json", br#"{"similarity_threshold": 3.0}"#)
        .unwrap();

    let error = runner.expect_failure(&[
        "compare",
        a.to_str().unwrap(),
        a.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(error.kind_name(), "Config");
}

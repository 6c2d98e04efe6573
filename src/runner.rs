//! Comparison entry point
//!
//! One call extracts both documents, pairs their sections, diffs every pair and
//! assembles the result. Nothing is kept between calls.

use crate::align::sections::{pair_sections, SectionPair};
use crate::config::CompareConfig;
use crate::diff::{self, page::diff_page, sheet::diff_sheet, DiffEntry};
use crate::error::{DocdiffError, Result};
use crate::extract::{self, DetectedKind};
use crate::model::{Document, DocumentKind, Section};
use crate::progress::{NoProgress, ProgressObserver, Stage};
use crate::result::{DiffResult, PairedSectionDiff, ResultAssembler};
use log::info;
use rayon::prelude::*;
use std::path::Path;

/// Compare two documents of the declared kind
pub fn compare(path_a: &Path, path_b: &Path, kind: DocumentKind, config: &CompareConfig) -> Result<DiffResult> {
    compare_with_progress(path_a, path_b, kind, config, &NoProgress)
}

/// Compare two documents, detecting the kind from the first path
pub fn compare_auto(path_a: &Path, path_b: &Path, config: &CompareConfig) -> Result<DiffResult> {
    let kind = match extract::detect_kind(path_a) {
        DetectedKind::Known(kind) => kind,
        DetectedKind::Unrecognized(what) => {
            return Err(DocdiffError::invalid_input(format!(
                "cannot compare '{}': {}",
                path_a.display(),
                what
            )))
        }
        DetectedKind::Undetermined => {
            return Err(DocdiffError::unreadable(path_a, "cannot determine document kind"))
        }
    };
    compare(path_a, path_b, kind, config)
}

pub fn compare_with_progress(
    path_a: &Path,
    path_b: &Path,
    kind: DocumentKind,
    config: &CompareConfig,
    progress: &dyn ProgressObserver,
) -> Result<DiffResult> {
    config.validate()?;

    // Both inputs must be of the declared kind before anything is parsed
    extract::ensure_kind(path_a, kind)?;
    extract::ensure_kind(path_b, kind)?;

    info!("Comparing {} and {} as {}", path_a.display(), path_b.display(), kind);
    progress.stage(Stage::Extracting);

    let extractor = extract::extractor_for(kind, config);
    let (doc_a, doc_b) = rayon::join(|| extractor.extract(path_a), || extractor.extract(path_b));
    let doc_a = doc_a?;
    let doc_b = doc_b?;
    info!(
        "Extracted {} / {} sections ({} / {} units)",
        doc_a.sections().len(),
        doc_b.sections().len(),
        doc_a.unit_count(),
        doc_b.unit_count()
    );

    let pairs = pair_sections(&doc_a, &doc_b, config);
    progress.stage(Stage::Aligning { sections: pairs.len() });

    let diff_one = |pair: &SectionPair| -> PairedSectionDiff {
        let section_a = pair.a.and_then(|i| doc_a.section(i));
        let section_b = pair.b.and_then(|j| doc_b.section(j));
        let diff = diff_section_pair(kind, section_a, section_b, config);
        progress.section_done(&diff_name(section_a, section_b));
        PairedSectionDiff {
            pair: *pair,
            before_name: section_a.map(|s| s.name().to_string()),
            after_name: section_b.map(|s| s.name().to_string()),
            entries: diff,
        }
    };

    let section_diffs: Vec<PairedSectionDiff> = if config.parallel {
        pairs.par_iter().map(diff_one).collect()
    } else {
        pairs.iter().map(diff_one).collect()
    };

    progress.stage(Stage::Assembling);
    let result = ResultAssembler::assemble(
        kind,
        &doc_a.source().display().to_string(),
        &doc_b.source().display().to_string(),
        section_diffs,
        collect_warnings(&doc_a, &doc_b),
    );

    info!(
        "Comparison finished: {} added, {} removed, {} modified, {} moved, {} unchanged",
        result.summary.added,
        result.summary.removed,
        result.summary.modified,
        result.summary.moved,
        result.summary.unchanged
    );
    progress.finished(&result.summary);
    Ok(result)
}

fn diff_name(a: Option<&Section>, b: Option<&Section>) -> String {
    b.or(a).map(|s| s.name().to_string()).unwrap_or_default()
}

/// Entries for one section pair; one-sided sections skip alignment entirely
fn diff_section_pair(
    kind: DocumentKind,
    a: Option<&Section>,
    b: Option<&Section>,
    config: &CompareConfig,
) -> Vec<DiffEntry> {
    match (a, b) {
        (Some(a), Some(b)) => match kind {
            DocumentKind::Spreadsheet => diff_sheet(b.name(), a, b, config),
            DocumentKind::Pdf => diff_page(b.name(), a, b, config),
        },
        (Some(a), None) => diff::all_removed(a),
        (None, Some(b)) => diff::all_added(b),
        (None, None) => Vec::new(),
    }
}

fn collect_warnings(a: &Document, b: &Document) -> Vec<crate::model::ExtractionWarning> {
    a.warnings().iter().chain(b.warnings()).cloned().collect()
}

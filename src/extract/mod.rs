//! Format extractors: file on disk → canonical `Document`

pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod spreadsheet;

use crate::config::CompareConfig;
use crate::error::{DocdiffError, Result};
use crate::model::{Document, DocumentKind};
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use pdf::PdfExtractor;
pub use spreadsheet::SpreadsheetExtractor;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "xla", "xlam", "ods"];
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Turns a file into a `Document`
pub trait Extractor: Send + Sync {
    fn kind(&self) -> DocumentKind;

    fn extract(&self, path: &Path) -> Result<Document>;
}

/// Extractor for the declared kind
pub fn extractor_for(kind: DocumentKind, config: &CompareConfig) -> Box<dyn Extractor> {
    match kind {
        DocumentKind::Spreadsheet => Box::new(SpreadsheetExtractor::new(config)),
        DocumentKind::Pdf => Box::new(PdfExtractor::new(config)),
    }
}

/// Extract one document of the declared kind
pub fn extract(path: &Path, kind: DocumentKind, config: &CompareConfig) -> Result<Document> {
    ensure_kind(path, kind)?;
    let document = extractor_for(kind, config).extract(path)?;
    info!(
        "Extracted {} sections, {} units from {}",
        document.sections().len(),
        document.unit_count(),
        path.display()
    );
    Ok(document)
}

/// Outcome of looking at a file's name and first bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedKind {
    Known(DocumentKind),
    /// Readable, but neither a workbook nor a PDF
    Unrecognized(String),
    /// Missing, empty or unreadable; extraction reports the details
    Undetermined,
}

pub fn detect_kind(path: &Path) -> DetectedKind {
    if let Some(kind) = kind_from_extension(path) {
        return DetectedKind::Known(kind);
    }

    match read_magic(path) {
        Some(magic) => match kind_from_magic(&magic) {
            Some(kind) => DetectedKind::Known(kind),
            None => DetectedKind::Unrecognized(match path.extension() {
                Some(ext) => format!(".{} file", ext.to_string_lossy()),
                None => "unrecognized content".to_string(),
            }),
        },
        None => DetectedKind::Undetermined,
    }
}

fn kind_from_extension(path: &Path) -> Option<DocumentKind> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if ext == "pdf" {
        Some(DocumentKind::Pdf)
    } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        Some(DocumentKind::Spreadsheet)
    } else {
        None
    }
}

fn kind_from_magic(magic: &[u8]) -> Option<DocumentKind> {
    if magic.starts_with(b"%PDF-") {
        Some(DocumentKind::Pdf)
    } else if magic.starts_with(b"PK\x03\x04") || magic.starts_with(OLE_MAGIC) {
        Some(DocumentKind::Spreadsheet)
    } else {
        None
    }
}

fn read_magic(path: &Path) -> Option<Vec<u8>> {
    let file = File::open(path).ok()?;
    let mut magic = Vec::with_capacity(8);
    file.take(8).read_to_end(&mut magic).ok()?;
    if magic.is_empty() {
        None
    } else {
        Some(magic)
    }
}

/// Fail with `KindMismatch` when the file is recognizably not of the declared kind
pub fn ensure_kind(path: &Path, declared: DocumentKind) -> Result<()> {
    match detect_kind(path) {
        DetectedKind::Known(kind) if kind == declared => Ok(()),
        DetectedKind::Known(kind) => Err(DocdiffError::kind_mismatch(path, declared, kind.label())),
        DetectedKind::Unrecognized(what) => Err(DocdiffError::kind_mismatch(path, declared, what)),
        DetectedKind::Undetermined => Ok(()),
    }
}

/// Missing, non-regular and zero-byte files are unreadable
pub(crate) fn ensure_readable(path: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(path).map_err(|e| DocdiffError::unreadable(path, e.to_string()))?;
    if !metadata.is_file() {
        return Err(DocdiffError::unreadable(path, "not a regular file"));
    }
    if metadata.len() == 0 {
        return Err(DocdiffError::unreadable(path, "file is empty"));
    }
    Ok(metadata.len())
}

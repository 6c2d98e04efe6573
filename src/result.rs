//! Diff result assembly

use crate::align::sections::SectionPair;
use crate::diff::{DiffEntry, DiffKind};
use crate::model::{DocumentKind, ExtractionWarning};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-kind entry counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub moved: usize,
    pub unchanged: usize,
}

impl Summary {
    fn record(&mut self, kind: DiffKind) {
        match kind {
            DiffKind::Added => self.added += 1,
            DiffKind::Removed => self.removed += 1,
            DiffKind::Modified => self.modified += 1,
            DiffKind::Moved => self.moved += 1,
            DiffKind::Unchanged => self.unchanged += 1,
        }
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a DiffEntry>) -> Self {
        let mut summary = Summary::default();
        for entry in entries {
            summary.record(entry.kind);
        }
        summary
    }

    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.modified + self.moved
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }
}

/// Entries of one section pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDiff {
    pub name: String,
    pub before_name: Option<String>,
    pub after_name: Option<String>,
    pub entries: Vec<DiffEntry>,
}

impl SectionDiff {
    pub fn summary(&self) -> Summary {
        Summary::from_entries(&self.entries)
    }

    pub fn is_renamed(&self) -> bool {
        matches!((&self.before_name, &self.after_name), (Some(a), Some(b)) if a != b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub format_version: String,
    pub kind: DocumentKind,
    pub source_a: String,
    pub source_b: String,
    pub sections: Vec<SectionDiff>,
    pub summary: Summary,
    pub warnings: Vec<ExtractionWarning>,
}

impl DiffResult {
    /// Every entry in result order, unchanged ones included
    pub fn entries(&self) -> impl Iterator<Item = &DiffEntry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    /// Entries that are not `unchanged`
    pub fn changes(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries().filter(|e| e.is_change())
    }

    pub fn has_changes(&self) -> bool {
        self.summary.has_changes()
    }

    pub fn is_identical(&self) -> bool {
        !self.has_changes()
    }

    /// Summary per section name, in result order
    pub fn by_section(&self) -> IndexMap<String, Summary> {
        self.sections
            .iter()
            .map(|s| (s.name.clone(), s.summary()))
            .collect()
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Section pair with its computed entries, ready for assembly
#[derive(Debug, Clone)]
pub struct PairedSectionDiff {
    pub pair: SectionPair,
    pub before_name: Option<String>,
    pub after_name: Option<String>,
    pub entries: Vec<DiffEntry>,
}

/// Groups per-section entries into a `DiffResult`
pub struct ResultAssembler;

impl ResultAssembler {
    /// Sections follow document B; sections only in A come after, in A order
    pub fn assemble(
        kind: DocumentKind,
        source_a: &str,
        source_b: &str,
        mut sections: Vec<PairedSectionDiff>,
        warnings: Vec<ExtractionWarning>,
    ) -> DiffResult {
        sections.sort_by_key(|s| match (s.pair.b, s.pair.a) {
            (Some(b), _) => (0, b),
            (None, Some(a)) => (1, a),
            (None, None) => (2, 0),
        });

        let sections: Vec<SectionDiff> = sections
            .into_iter()
            .map(|s| SectionDiff {
                name: s
                    .after_name
                    .clone()
                    .or_else(|| s.before_name.clone())
                    .unwrap_or_default(),
                before_name: s.before_name,
                after_name: s.after_name,
                entries: s.entries,
            })
            .collect();

        let summary = Summary::from_entries(sections.iter().flat_map(|s| s.entries.iter()));

        DiffResult {
            format_version: crate::FORMAT_VERSION.to_string(),
            kind,
            source_a: source_a.to_string(),
            source_b: source_b.to_string(),
            sections,
            summary,
            warnings,
        }
    }
}

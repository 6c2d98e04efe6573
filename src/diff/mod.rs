//! Diff computation: aligned units → change records

pub mod page;
pub mod sheet;

use crate::model::{Comparable, Position, Section, Unit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Modified,
    Moved,
    Unchanged,
}

impl DiffKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Moved => "moved",
            Self::Unchanged => "unchanged",
        }
    }
}

/// One differing attribute of a matched pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub attribute: String,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub kind: DiffKind,
    pub section: String,
    pub path: String,
    pub before: Option<String>,
    pub after: Option<String>,
    pub deltas: Vec<Delta>,
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub before_position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub after_position: Option<Position>,
}

impl DiffEntry {
    pub fn is_change(&self) -> bool {
        self.kind != DiffKind::Unchanged
    }

    /// Entry for a matched pair: unchanged, modified, or moved (possibly with deltas)
    pub fn matched(section: &str, a: &Unit, b: &Unit, moved: bool, confidence: f64) -> Self {
        let deltas = attribute_deltas(a, b);
        let kind = if moved {
            DiffKind::Moved
        } else if deltas.is_empty() {
            DiffKind::Unchanged
        } else {
            DiffKind::Modified
        };
        Self {
            kind,
            section: section.to_string(),
            path: b.locator(section),
            before: Some(a.display()),
            after: Some(b.display()),
            deltas,
            confidence: Some(round_confidence(confidence)),
            before_position: Some(a.position()),
            after_position: Some(b.position()),
        }
    }

    pub fn removed(section: &str, a: &Unit) -> Self {
        Self {
            kind: DiffKind::Removed,
            section: section.to_string(),
            path: a.locator(section),
            before: Some(a.display()),
            after: None,
            deltas: Vec::new(),
            confidence: None,
            before_position: Some(a.position()),
            after_position: None,
        }
    }

    pub fn added(section: &str, b: &Unit) -> Self {
        Self {
            kind: DiffKind::Added,
            section: section.to_string(),
            path: b.locator(section),
            before: None,
            after: Some(b.display()),
            deltas: Vec::new(),
            confidence: None,
            before_position: None,
            after_position: Some(b.position()),
        }
    }
}

/// Compare attributes name by name, in the order the unit lists them
pub fn attribute_deltas<T: Comparable>(a: &T, b: &T) -> Vec<Delta> {
    a.attributes()
        .into_iter()
        .zip(b.attributes())
        .filter(|(x, y)| x.name == y.name && x.value != y.value)
        .map(|(x, y)| Delta {
            attribute: x.name.to_string(),
            before: x.value,
            after: y.value,
        })
        .collect()
}

/// Four decimals keep the JSON stable across platforms
fn round_confidence(c: f64) -> f64 {
    (c * 10_000.0).round() / 10_000.0
}

/// Every unit of a section that only exists in A
pub fn all_removed(section: &Section) -> Vec<DiffEntry> {
    section
        .units()
        .iter()
        .map(|u| DiffEntry::removed(section.name(), u))
        .collect()
}

/// Every unit of a section that only exists in B
pub fn all_added(section: &Section) -> Vec<DiffEntry> {
    section
        .units()
        .iter()
        .map(|u| DiffEntry::added(section.name(), u))
        .collect()
}

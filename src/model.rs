//! Canonical document model shared by the extractors and the diff engine
//!
//! Both extractors normalize their input into the same `Document` / `Section` /
//! `Unit` shape. Alignment and diff code only ever sees units through the
//! [`Alignable`](crate::align::Alignable) and [`Comparable`] capabilities.

use crate::align::Alignable;
use crate::hash::hash_value;
use crate::similarity::normalized_edit_similarity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The two document families the engine knows how to compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    #[serde(rename = "excel")]
    Spreadsheet,
    #[serde(rename = "pdf")]
    Pdf,
}

impl DocumentKind {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" | "xls" | "spreadsheet" => Ok(Self::Spreadsheet),
            "pdf" => Ok(Self::Pdf),
            _ => Err(format!("Invalid document kind: {}. Use 'excel' or 'pdf'", s)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "excel",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Something the extractor could not represent and skipped in lenient mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub source: String,
    pub location: String,
    pub detail: String,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.source, self.location, self.detail)
    }
}

/// Root of the canonical representation, built once per extraction call
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    kind: DocumentKind,
    source: PathBuf,
    sections: Vec<Section>,
    warnings: Vec<ExtractionWarning>,
}

impl Document {
    pub fn new(
        kind: DocumentKind,
        source: &Path,
        sections: Vec<Section>,
        warnings: Vec<ExtractionWarning>,
    ) -> Self {
        Self {
            kind,
            source: source.to_path_buf(),
            sections,
            warnings,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    pub fn unit_count(&self) -> usize {
        self.sections.iter().map(|s| s.units.len()).sum()
    }
}

/// A sheet or a page
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    index: usize,
    name: String,
    units: Vec<Unit>,
}

impl Section {
    pub fn new(index: usize, name: impl Into<String>, units: Vec<Unit>) -> Self {
        Self {
            index,
            name: name.into(),
            units,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }
}

/// Typed cell content as read from the workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Date(String),
    Error(String),
    /// Formula cell without a cached result
    Empty,
}

impl CellValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Date(_) => "date",
            Self::Error(_) => "error",
            Self::Empty => "empty",
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) | Self::Date(s) | Self::Error(s) => s.clone(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
            Self::Empty => String::new(),
        }
    }
}

/// Render a number the way a spreadsheet user reads it: `10`, not `10.0`
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Zero-based column index to spreadsheet letters (0 → A, 26 → AA)
pub fn column_letters(col: u32) -> String {
    let mut n = col;
    let mut s = String::new();
    loop {
        s.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    s
}

/// A1-style address for zero-based coordinates
pub fn cell_address(row: u32, col: u32) -> String {
    format!("{}{}", column_letters(col), row + 1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
    pub formula: Option<String>,
}

impl Cell {
    pub fn address(&self) -> String {
        cell_address(self.row, self.col)
    }

    pub fn display(&self) -> String {
        match (&self.value, &self.formula) {
            (CellValue::Empty, Some(formula)) => formula.clone(),
            (value, _) => value.display(),
        }
    }
}

/// Axis-aligned box in page points, origin at the top-left corner of the page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    pub fn center_distance(&self, other: &BoundingBox) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        (ax - bx).hypot(ay - by)
    }

    pub fn overlaps_horizontally(&self, other: &BoundingBox) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1
    }
}

/// Font family, rounded size and weight of the dominant run in a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleFingerprint {
    pub font: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl fmt::Display for StyleFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}pt", self.font, format_number(self.size))?;
        if self.bold {
            f.write_str(" bold")?;
        }
        if self.italic {
            f.write_str(" italic")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Reading-order index within the page
    pub order: usize,
    pub bbox: BoundingBox,
    pub text: String,
    pub style: StyleFingerprint,
}

/// Where a unit sits inside its section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Position {
    Cell { row: u32, col: u32, address: String },
    Block { order: usize, bbox: BoundingBox },
}

/// The atomic comparable element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "unit", rename_all = "lowercase")]
pub enum Unit {
    Cell(Cell),
    Block(TextBlock),
}

impl Unit {
    /// Locator of the unit inside a named section, e.g. `Sheet1!B2` or `Page 1#3`
    pub fn locator(&self, section: &str) -> String {
        match self {
            Unit::Cell(cell) => format!("{}!{}", section, cell.address()),
            Unit::Block(block) => format!("{}#{}", section, block.order + 1),
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Unit::Cell(cell) => Position::Cell {
                row: cell.row,
                col: cell.col,
                address: cell.address(),
            },
            Unit::Block(block) => Position::Block {
                order: block.order,
                bbox: block.bbox,
            },
        }
    }

    /// Human-readable value used for the `before`/`after` fields of a diff entry
    pub fn display(&self) -> String {
        match self {
            Unit::Cell(cell) => cell.display(),
            Unit::Block(block) => block.text.clone(),
        }
    }

    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            Unit::Cell(cell) => Some(cell),
            Unit::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&TextBlock> {
        match self {
            Unit::Block(block) => Some(block),
            Unit::Cell(_) => None,
        }
    }
}

/// One named, comparable attribute of a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Units whose attributes can be compared pairwise once aligned
pub trait Comparable: Alignable {
    /// Attributes in a fixed order; two matched units are compared name by name
    fn attributes(&self) -> Vec<Attribute>;
}

impl Alignable for Unit {
    fn identity_key(&self) -> String {
        match self {
            Unit::Cell(cell) => cell.address(),
            Unit::Block(block) => hash_value(&block.text),
        }
    }

    fn content_signature(&self) -> String {
        match self {
            Unit::Cell(cell) => match &cell.formula {
                Some(formula) => format!("{} {}", cell.value.display(), formula),
                None => cell.value.display(),
            },
            Unit::Block(block) => block.text.clone(),
        }
    }

    fn similarity(&self, other: &Self) -> f64 {
        normalized_edit_similarity(&self.content_signature(), &other.content_signature())
    }

    fn spatial_offset(&self, other: &Self) -> f64 {
        match (self, other) {
            (Unit::Block(a), Unit::Block(b)) => {
                let distance = a.bbox.center_distance(&b.bbox);
                distance / (distance + 100.0)
            }
            _ => 0.0,
        }
    }
}

impl Comparable for Unit {
    fn attributes(&self) -> Vec<Attribute> {
        match self {
            Unit::Cell(cell) => vec![
                Attribute::new("value", cell.value.display()),
                Attribute::new("formula", cell.formula.clone().unwrap_or_default()),
                Attribute::new("type", cell.value.type_name()),
            ],
            Unit::Block(block) => vec![
                Attribute::new("text", block.text.clone()),
                Attribute::new("style", block.style.to_string()),
            ],
        }
    }
}

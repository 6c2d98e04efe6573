//! PDF extraction with lopdf
//!
//! Only the text-showing part of each content stream is interpreted. Glyph
//! widths are estimated from the font size, which is good enough for grouping
//! runs into lines and blocks.

use super::fonts::{decode_simple, resource_fonts, FontInfo};
use super::layout::{group_blocks, LayoutParams, TextRun};
use super::{ensure_readable, Extractor};
use crate::config::{CompareConfig, Strictness};
use crate::error::{DocdiffError, Result};
use crate::model::{Document, DocumentKind, ExtractionWarning, Section, Unit};
use log::{debug, warn};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId};
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_PAGE_HEIGHT: f64 = 792.0;
/// Average glyph advance as a fraction of the font size
const GLYPH_WIDTH: f64 = 0.5;
/// TJ adjustment (thousandths of an em) treated as a word gap
const WORD_GAP_ADJUSTMENT: f64 = 200.0;

pub struct PdfExtractor {
    strictness: Strictness,
    layout: LayoutParams,
}

impl PdfExtractor {
    pub fn new(config: &CompareConfig) -> Self {
        Self {
            strictness: config.strictness,
            layout: LayoutParams {
                baseline_tolerance: config.baseline_tolerance,
                line_gap_factor: config.line_gap_factor,
            },
        }
    }
}

impl Extractor for PdfExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn extract(&self, path: &Path) -> Result<Document> {
        ensure_readable(path)?;

        let doc = lopdf::Document::load(path).map_err(|e| DocdiffError::unreadable(path, e.to_string()))?;
        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(DocdiffError::unsupported(
                path,
                "document",
                "encrypted content streams cannot be decoded",
            ));
        }

        let mut sections = Vec::new();
        let mut warnings = Vec::new();

        for (index, (page_number, page_id)) in doc.get_pages().into_iter().enumerate() {
            let name = format!("Page {}", page_number);
            let runs = match page_runs(&doc, page_id) {
                Ok(runs) => runs,
                Err(detail) => match self.strictness {
                    Strictness::Strict => return Err(DocdiffError::unsupported(path, name, detail)),
                    Strictness::Lenient => {
                        warn!("Skipping content of {} in {}: {}", name, path.display(), detail);
                        warnings.push(ExtractionWarning {
                            source: path.display().to_string(),
                            location: name.clone(),
                            detail,
                        });
                        Vec::new()
                    }
                },
            };

            let blocks = group_blocks(runs, &self.layout);
            debug!("{}: {} text blocks", name, blocks.len());
            sections.push(Section::new(
                index,
                name,
                blocks.into_iter().map(Unit::Block).collect(),
            ));
        }

        Ok(Document::new(DocumentKind::Pdf, path, sections, warnings))
    }
}

/// Affine transform `[a b c d e f]`, PDF row-vector convention
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Matrix {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`
    fn then(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn x_scale(&self) -> f64 {
        self.0[0].hypot(self.0[1])
    }

    fn y_scale(&self) -> f64 {
        self.0[2].hypot(self.0[3])
    }
}

/// Text state carried across operators of one content stream
struct TextState<'a> {
    fonts: &'a HashMap<Vec<u8>, FontInfo>,
    page_height: f64,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    tm: Matrix,
    tlm: Matrix,
    font: String,
    font_info: Option<&'a FontInfo>,
    size: f64,
    leading: f64,
    runs: Vec<TextRun>,
    /// First string that could not be decoded
    undecodable: Option<String>,
}

impl<'a> TextState<'a> {
    fn new(fonts: &'a HashMap<Vec<u8>, FontInfo>, page_height: f64) -> Self {
        Self {
            fonts,
            page_height,
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font: String::new(),
            font_info: None,
            size: 0.0,
            leading: 0.0,
            runs: Vec::new(),
            undecodable: None,
        }
    }

    /// Text of a string operand in the current font
    fn string_text(&mut self, obj: &Object) -> Option<String> {
        let Object::String(bytes, _) = obj else {
            return None;
        };
        let Some(font) = self.font_info else {
            return Some(decode_simple(bytes));
        };
        match font.decode(bytes) {
            Ok(text) => Some(text),
            Err(reason) => {
                self.undecodable.get_or_insert(reason);
                None
            }
        }
    }

    fn show_string(&mut self, obj: Option<&Object>) {
        if let Some(text) = obj.and_then(|o| self.string_text(o)) {
            let units = text.chars().count() as f64 * GLYPH_WIDTH;
            self.show(text, units);
        }
    }

    /// Concatenate a TJ array; large negative kerning becomes a space
    fn array_text(&mut self, items: &[Object]) -> (String, f64) {
        let mut text = String::new();
        let mut units = 0.0;
        for item in items {
            if let Some(s) = self.string_text(item) {
                units += s.chars().count() as f64 * GLYPH_WIDTH;
                text.push_str(&s);
            } else if let Some(adjust) = number(item) {
                units -= adjust / 1000.0;
                if -adjust > WORD_GAP_ADJUSTMENT && !text.ends_with(' ') {
                    text.push(' ');
                }
            }
        }
        (text, units)
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Matrix::translate(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Emit a run at the current text position and advance past it
    fn show(&mut self, text: String, advance_units: f64) {
        let advance = advance_units * self.size;
        if !text.trim().is_empty() {
            let m = self.tm.then(&self.ctm);
            self.runs.push(TextRun {
                text,
                x: m.0[4],
                y: self.page_height - m.0[5],
                width: advance * m.x_scale(),
                size: self.size * m.y_scale(),
                font: self.font.clone(),
            });
        }
        self.tm = Matrix::translate(advance, 0.0).then(&self.tm);
    }

    fn apply(&mut self, op: &Operation) {
        let nums: Vec<f64> = op.operands.iter().filter_map(number).collect();
        match op.operator.as_str() {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(m) = self.ctm_stack.pop() {
                    self.ctm = m;
                }
            }
            "cm" if nums.len() == 6 => {
                let m = Matrix([nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]]);
                self.ctm = m.then(&self.ctm);
            }
            "BT" => {
                self.tm = Matrix::IDENTITY;
                self.tlm = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(Ok(name)) = op.operands.first().map(Object::as_name) {
                    let fonts = self.fonts;
                    self.font_info = fonts.get(name);
                    self.font = match self.font_info {
                        Some(info) => info.base_font.clone(),
                        None => String::from_utf8_lossy(name).into_owned(),
                    };
                }
                if let Some(size) = op.operands.get(1).and_then(number) {
                    self.size = size;
                }
            }
            "TL" if !nums.is_empty() => self.leading = nums[0],
            "Td" if nums.len() == 2 => self.move_line(nums[0], nums[1]),
            "TD" if nums.len() == 2 => {
                self.leading = -nums[1];
                self.move_line(nums[0], nums[1]);
            }
            "Tm" if nums.len() == 6 => {
                self.tlm = Matrix([nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]]);
                self.tm = self.tlm;
            }
            "T*" => self.next_line(),
            "Tj" => self.show_string(op.operands.first()),
            "'" => {
                self.next_line();
                self.show_string(op.operands.first());
            }
            "\"" => {
                self.next_line();
                self.show_string(op.operands.get(2));
            }
            "TJ" => {
                if let Some(Ok(items)) = op.operands.first().map(Object::as_array) {
                    let (text, units) = self.array_text(items);
                    self.show(text, units);
                }
            }
            _ => {}
        }
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

pub(super) fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(super) fn resolve_dict<'a>(doc: &'a lopdf::Document, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj)?.as_dict().ok()
}

/// Look up a page attribute, following the `Parent` chain for inherited ones
fn inherited<'a>(doc: &'a lopdf::Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value);
        }
        node = resolve_dict(doc, node.get(b"Parent").ok()?)?;
    }
    None
}

fn page_height(doc: &lopdf::Document, page_id: ObjectId) -> f64 {
    inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .and_then(|arr| {
            let nums: Vec<f64> = arr.iter().filter_map(number).collect();
            (nums.len() == 4).then(|| (nums[3] - nums[1]).abs())
        })
        .unwrap_or(DEFAULT_PAGE_HEIGHT)
}

/// Resource name → font for the fonts a page can use
fn page_fonts(doc: &lopdf::Document, page_id: ObjectId) -> HashMap<Vec<u8>, FontInfo> {
    inherited(doc, page_id, b"Resources")
        .and_then(|res| res.as_dict().ok())
        .and_then(|res| res.get(b"Font").ok())
        .and_then(|f| resolve_dict(doc, f))
        .map(|fonts| resource_fonts(doc, fonts))
        .unwrap_or_default()
}

/// Interpret one page; the error string describes why its content is unusable
fn page_runs(doc: &lopdf::Document, page_id: ObjectId) -> std::result::Result<Vec<TextRun>, String> {
    let data = doc
        .get_page_content(page_id)
        .map_err(|e| format!("content stream cannot be read: {}", e))?;
    let content = Content::decode(&data).map_err(|e| format!("content stream cannot be decoded: {}", e))?;

    let fonts = page_fonts(doc, page_id);
    let mut state = TextState::new(&fonts, page_height(doc, page_id));
    for op in &content.operations {
        state.apply(op);
    }
    match state.undecodable {
        Some(reason) => Err(format!("text cannot be decoded ({})", reason)),
        None => Ok(state.runs),
    }
}

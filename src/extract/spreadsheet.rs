//! Workbook extraction with calamine

use super::{ensure_readable, Extractor};
use crate::config::{CompareConfig, Strictness};
use crate::error::{DocdiffError, Result};
use crate::model::{Cell, CellValue, Document, DocumentKind, ExtractionWarning, Section, Unit};
use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader, SheetType};
use chrono::{Duration, Timelike};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::Path;

pub struct SpreadsheetExtractor {
    strictness: Strictness,
    trim_cell_text: bool,
}

impl SpreadsheetExtractor {
    pub fn new(config: &CompareConfig) -> Self {
        Self {
            strictness: config.strictness,
            trim_cell_text: config.trim_cell_text,
        }
    }

    /// Merge the value range and the formula range into cell units, ordered by (row, col)
    fn collect_cells(&self, values: &Range<Data>, formulas: Option<&Range<String>>) -> Vec<Unit> {
        let mut cells: BTreeMap<(u32, u32), Cell> = BTreeMap::new();

        let (row0, col0) = values.start().unwrap_or((0, 0));
        for (r, c, data) in values.used_cells() {
            if let Some(value) = convert_value(data, self.trim_cell_text) {
                let (row, col) = (row0 + r as u32, col0 + c as u32);
                cells.insert(
                    (row, col),
                    Cell {
                        row,
                        col,
                        value,
                        formula: None,
                    },
                );
            }
        }

        if let Some(formulas) = formulas {
            let (row0, col0) = formulas.start().unwrap_or((0, 0));
            for (r, c, text) in formulas.used_cells() {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let (row, col) = (row0 + r as u32, col0 + c as u32);
                let formula = if text.starts_with('=') {
                    text.to_string()
                } else {
                    format!("={}", text)
                };
                cells
                    .entry((row, col))
                    .or_insert_with(|| Cell {
                        row,
                        col,
                        value: CellValue::Empty,
                        formula: None,
                    })
                    .formula = Some(formula);
            }
        }

        cells.into_values().map(Unit::Cell).collect()
    }

    fn skip_or_fail(
        &self,
        path: &Path,
        location: &str,
        detail: String,
        warnings: &mut Vec<ExtractionWarning>,
    ) -> Result<()> {
        match self.strictness {
            Strictness::Strict => Err(DocdiffError::unsupported(path, location, detail)),
            Strictness::Lenient => {
                warn!("Skipping {} in {}: {}", location, path.display(), detail);
                warnings.push(ExtractionWarning {
                    source: path.display().to_string(),
                    location: location.to_string(),
                    detail,
                });
                Ok(())
            }
        }
    }
}

impl Extractor for SpreadsheetExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Spreadsheet
    }

    fn extract(&self, path: &Path) -> Result<Document> {
        ensure_readable(path)?;

        let mut workbook =
            open_workbook_auto(path).map_err(|e| DocdiffError::unreadable(path, e.to_string()))?;

        let sheets: Vec<(String, bool, String)> = workbook
            .sheets_metadata()
            .iter()
            .map(|s| {
                (
                    s.name.clone(),
                    matches!(s.typ, SheetType::WorkSheet),
                    format!("{:?}", s.typ),
                )
            })
            .collect();

        let mut sections = Vec::with_capacity(sheets.len());
        let mut warnings = Vec::new();

        for (name, is_worksheet, type_name) in sheets {
            if !is_worksheet {
                self.skip_or_fail(
                    path,
                    &name,
                    format!("{} content is not compared", type_name),
                    &mut warnings,
                )?;
                continue;
            }

            let values = workbook
                .worksheet_range(&name)
                .map_err(|e| DocdiffError::unreadable(path, format!("sheet '{}': {}", name, e)))?;
            let formulas = match workbook.worksheet_formula(&name) {
                Ok(range) => Some(range),
                Err(e) => {
                    debug!("No formulas read for sheet '{}': {}", name, e);
                    None
                }
            };

            let units = self.collect_cells(&values, formulas.as_ref());
            debug!("Sheet '{}': {} cells", name, units.len());
            sections.push(Section::new(sections.len(), name, units));
        }

        Ok(Document::new(DocumentKind::Spreadsheet, path, sections, warnings))
    }
}

fn convert_value(data: &Data, trim: bool) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::String(s) => {
            let s = if trim { s.trim() } else { s.as_str() };
            if s.is_empty() {
                None
            } else {
                Some(CellValue::Text(s.to_string()))
            }
        }
        Data::DateTime(dt) => Some(CellValue::Date(format_excel_datetime(dt))),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Date(s.clone())),
        Data::Error(e) => Some(CellValue::Error(e.to_string())),
    }
}

/// Serial date or duration to ISO text; the workbook's 1900/1904 date system
/// travels with the value
fn format_excel_datetime(value: &ExcelDateTime) -> String {
    if value.is_duration() {
        return value
            .as_duration()
            .map(format_duration)
            .unwrap_or_else(|| value.as_f64().to_string());
    }
    match value.as_datetime() {
        Some(dt) if dt.num_seconds_from_midnight() == 0 => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => value.as_f64().to_string(),
    }
}

fn format_duration(duration: Duration) -> String {
    let seconds = duration.num_seconds();
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();
    format!("{}{}:{:02}:{:02}", sign, seconds / 3600, seconds / 60 % 60, seconds % 60)
}

//! Page layout: positioned text runs → lines → blocks in reading order

use crate::model::{BoundingBox, StyleFingerprint, TextBlock};
use crate::similarity::collapse_whitespace;
use std::cmp::Ordering;

/// A piece of text drawn by one show-text operator
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Baseline origin, top-left page coordinates
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub size: f64,
    pub font: String,
}

impl TextRun {
    fn end(&self) -> f64 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub baseline_tolerance: f64,
    pub line_gap_factor: f64,
}

#[derive(Debug, Clone)]
struct Line {
    runs: Vec<TextRun>,
    baseline: f64,
    size: f64,
}

impl Line {
    fn bbox(&self) -> BoundingBox {
        let x0 = self.runs.iter().map(|r| r.x).fold(f64::INFINITY, f64::min);
        let x1 = self.runs.iter().map(TextRun::end).fold(f64::NEG_INFINITY, f64::max);
        BoundingBox::new(x0, self.baseline - self.size, x1, self.baseline + self.size * 0.25)
    }

    fn text(&self) -> String {
        let mut text = String::new();
        let mut prev_end: Option<f64> = None;
        for run in &self.runs {
            if let Some(end) = prev_end {
                if run.x - end > run.size * 0.2 && !text.ends_with(' ') && !run.text.starts_with(' ') {
                    text.push(' ');
                }
            }
            text.push_str(&run.text);
            prev_end = Some(run.end());
        }
        text
    }
}

#[derive(Debug, Clone)]
struct Block {
    lines: Vec<Line>,
    bbox: BoundingBox,
}

fn by_position(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Group runs into reading-ordered text blocks
pub fn group_blocks(runs: Vec<TextRun>, params: &LayoutParams) -> Vec<TextBlock> {
    let lines = group_lines(runs, params);
    let mut blocks: Vec<Block> = Vec::new();

    for line in lines {
        let line_box = line.bbox();
        let target = blocks.iter().rposition(|block| {
            let Some(last) = block.lines.last() else {
                return false;
            };
            let gap = line.baseline - last.baseline;
            let size = last.size.max(line.size);
            gap > 0.0
                && gap <= size * params.line_gap_factor
                && block.bbox.overlaps_horizontally(&line_box)
                && similar_size(last.size, line.size)
        });

        match target {
            Some(idx) => {
                let block = &mut blocks[idx];
                block.bbox = block.bbox.union(&line_box);
                block.lines.push(line);
            }
            None => blocks.push(Block {
                bbox: line_box,
                lines: vec![line],
            }),
        }
    }

    blocks.sort_by(|a, b| {
        by_position(a.bbox.y0, b.bbox.y0).then_with(|| by_position(a.bbox.x0, b.bbox.x0))
    });

    blocks
        .into_iter()
        .filter_map(|block| {
            let text = collapse_whitespace(
                &block.lines.iter().map(Line::text).collect::<Vec<_>>().join(" "),
            );
            if text.is_empty() {
                return None;
            }
            let style = dominant_style(&block);
            Some((block.bbox, text, style))
        })
        .enumerate()
        .map(|(order, (bbox, text, style))| TextBlock {
            order,
            bbox,
            text,
            style,
        })
        .collect()
}

fn similar_size(a: f64, b: f64) -> bool {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    lo > 0.0 && hi / lo <= 1.5
}

/// Runs sharing a baseline (within tolerance) form one line, sorted left to right
fn group_lines(mut runs: Vec<TextRun>, params: &LayoutParams) -> Vec<Line> {
    runs.retain(|r| !r.text.trim().is_empty());
    runs.sort_by(|a, b| by_position(a.y, b.y).then_with(|| by_position(a.x, b.x)));

    let mut lines: Vec<Line> = Vec::new();
    for run in runs {
        let joins = lines.last().is_some_and(|line| {
            (run.y - line.baseline).abs() <= line.size.max(run.size) * params.baseline_tolerance
        });
        if joins {
            if let Some(line) = lines.last_mut() {
                line.size = line.size.max(run.size);
                line.runs.push(run);
            }
        } else {
            lines.push(Line {
                baseline: run.y,
                size: run.size,
                runs: vec![run],
            });
        }
    }

    let mut split = Vec::with_capacity(lines.len());
    for mut line in lines {
        line.runs.sort_by(|a, b| by_position(a.x, b.x));
        split.extend(split_columns(line));
    }
    split
}

/// Break a line where the horizontal gap is wide enough to be a column gutter
fn split_columns(line: Line) -> Vec<Line> {
    let mut parts: Vec<Line> = Vec::new();
    for run in line.runs {
        let new_part = match parts.last().and_then(|p| p.runs.last()) {
            Some(prev) => run.x - prev.end() > 3.0 * line.size,
            None => true,
        };
        if new_part {
            parts.push(Line {
                baseline: line.baseline,
                size: run.size,
                runs: vec![run],
            });
        } else if let Some(part) = parts.last_mut() {
            part.size = part.size.max(run.size);
            part.runs.push(run);
        }
    }
    parts
}

/// Style of the font carrying the most characters in the block
fn dominant_style(block: &Block) -> StyleFingerprint {
    let mut weights: Vec<(String, f64, usize)> = Vec::new();
    for run in block.lines.iter().flat_map(|l| l.runs.iter()) {
        let size = (run.size * 2.0).round() / 2.0;
        let chars = run.text.chars().count();
        match weights
            .iter_mut()
            .find(|(font, s, _)| *font == run.font && (*s - size).abs() < f64::EPSILON)
        {
            Some(entry) => entry.2 += chars,
            None => weights.push((run.font.clone(), size, chars)),
        }
    }

    let mut best: Option<&(String, f64, usize)> = None;
    for entry in &weights {
        if best.map_or(true, |b| entry.2 > b.2) {
            best = Some(entry);
        }
    }

    match best {
        Some((font, size, _)) => style_from_font(font, *size),
        None => style_from_font("", 0.0),
    }
}

/// Split a PostScript font name into family and weight flags
pub fn style_from_font(base_font: &str, size: f64) -> StyleFingerprint {
    let name = match base_font.split_once('+') {
        Some((prefix, rest)) if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => base_font,
    };
    let lower = name.to_lowercase();
    let family = name
        .split(|c| c == '-' || c == ',')
        .next()
        .unwrap_or(name)
        .to_string();

    StyleFingerprint {
        font: if family.is_empty() { "unknown".to_string() } else { family },
        size,
        bold: lower.contains("bold") || lower.contains("black") || lower.contains("heavy"),
        italic: lower.contains("italic") || lower.contains("oblique"),
    }
}

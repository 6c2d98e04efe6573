//! Output formatting utilities

use crate::diff::{DiffEntry, DiffKind};
use crate::error::Result;
use crate::model::{Document, Unit};
use crate::result::{DiffResult, Summary};
use chrono::{DateTime, Local};

/// Longest value shown inline before it is shortened
const MAX_VALUE_CHARS: usize = 80;

/// Pretty printer for docdiff output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Human-readable report of a comparison, as written to the result file
    pub fn render_report(result: &DiffResult, changes_only: bool, generated: Option<DateTime<Local>>) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "🔍 Comparison Results: {} → {} ({})",
            result.source_a, result.source_b, result.kind
        ));
        if let Some(when) = generated {
            lines.push(format!("├─ Generated: {}", when.format("%Y-%m-%d %H:%M:%S")));
        }
        lines.extend(summary_lines(&result.summary, "├─", "└─"));

        if !result.warnings.is_empty() {
            lines.push(String::new());
            lines.push(format!("⚠️  Warnings ({}):", result.warnings.len()));
            for (i, warning) in result.warnings.iter().enumerate() {
                let prefix = if i == result.warnings.len() - 1 { "└─" } else { "├─" };
                lines.push(format!("{} {}", prefix, warning));
            }
        }

        for section in &result.sections {
            let entries: Vec<&DiffEntry> = section
                .entries
                .iter()
                .filter(|e| !changes_only || e.is_change())
                .collect();
            if changes_only && entries.is_empty() {
                continue;
            }

            lines.push(String::new());
            let title = match (&section.before_name, &section.after_name) {
                (Some(before), Some(_)) if section.is_renamed() => {
                    format!("📄 {} (was {})", section.name, before)
                }
                (Some(_), None) => format!("📄 {} (removed)", section.name),
                (None, Some(_)) => format!("📄 {} (added)", section.name),
                _ => format!("📄 {}", section.name),
            };
            lines.push(title);

            if entries.is_empty() {
                lines.push("└─ ✅ no entries".to_string());
                continue;
            }
            for (i, entry) in entries.iter().enumerate() {
                let last = i == entries.len() - 1;
                lines.extend(entry_lines(entry, last));
            }
        }

        if changes_only && !result.has_changes() {
            lines.push(String::new());
            lines.push("✅ No differences found".to_string());
        }

        let mut report = lines.join("\n");
        report.push('\n');
        report
    }

    /// Print the short summary shown on the terminal after a comparison
    pub fn print_summary(result: &DiffResult) {
        if result.is_identical() {
            println!("✅ Documents are identical ({} units compared)", result.summary.unchanged);
            return;
        }
        println!("📊 {} changes", result.summary.total_changes());
        for line in summary_lines(&result.summary, "├─", "└─") {
            println!("{}", line);
        }
    }

    /// Dump of the canonical model of one document
    pub fn render_document(document: &Document) -> String {
        let mut lines = vec![format!(
            "📄 {} ({}, {} sections)",
            document.source().display(),
            document.kind(),
            document.sections().len()
        )];
        for (s, section) in document.sections().iter().enumerate() {
            let last_section = s == document.sections().len() - 1;
            let (branch, indent) = if last_section { ("└─", "   ") } else { ("├─", "│  ") };
            lines.push(format!("{} {} ({} units)", branch, section.name(), section.units().len()));
            for (u, unit) in section.units().iter().enumerate() {
                let prefix = if u == section.units().len() - 1 { "└─" } else { "├─" };
                let detail = match unit {
                    Unit::Cell(cell) => match &cell.formula {
                        Some(formula) => format!("{} [{}]", shorten(&cell.display()), formula),
                        None => shorten(&cell.display()),
                    },
                    Unit::Block(block) => format!("{} [{}]", shorten(&block.text), block.style),
                };
                lines.push(format!("{}{} {}: {}", indent, prefix, unit.locator(section.name()), detail));
            }
        }
        for warning in document.warnings() {
            lines.push(format!("⚠️  {}", warning));
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

fn summary_lines(summary: &Summary, mid: &str, end: &str) -> Vec<String> {
    vec![
        format!("{} ➕ Added: {}", mid, summary.added),
        format!("{} ➖ Removed: {}", mid, summary.removed),
        format!("{} ✏️  Modified: {}", mid, summary.modified),
        format!("{} 🔀 Moved: {}", mid, summary.moved),
        format!("{} ✅ Unchanged: {}", end, summary.unchanged),
    ]
}

fn entry_lines(entry: &DiffEntry, last: bool) -> Vec<String> {
    let (branch, indent) = if last { ("└─", "   ") } else { ("├─", "│  ") };
    let icon = match entry.kind {
        DiffKind::Added => "➕",
        DiffKind::Removed => "➖",
        DiffKind::Modified => "✏️",
        DiffKind::Moved => "🔀",
        DiffKind::Unchanged => "✅",
    };

    let head = match (entry.kind, &entry.before, &entry.after) {
        (DiffKind::Added, _, Some(after)) => format!("'{}'", shorten(after)),
        (DiffKind::Removed, Some(before), _) => format!("'{}'", shorten(before)),
        (DiffKind::Unchanged, _, Some(after)) => format!("'{}'", shorten(after)),
        (_, Some(before), Some(after)) if before != after => {
            format!("'{}' → '{}'", shorten(before), shorten(after))
        }
        (_, _, Some(after)) => format!("'{}'", shorten(after)),
        _ => String::new(),
    };

    let mut lines = vec![format!("{} {} {} {}: {}", branch, icon, entry.kind.label(), entry.path, head)];
    if entry.kind == DiffKind::Moved {
        if let (Some(from), Some(to)) = (&entry.before_position, &entry.after_position) {
            lines.push(format!(
                "{}├─ from {} to {}",
                indent,
                serde_json::to_string(from).unwrap_or_default(),
                serde_json::to_string(to).unwrap_or_default()
            ));
        }
    }
    if let Some(confidence) = entry.confidence.filter(|c| *c < 1.0) {
        lines.push(format!("{}├─ confidence: {:.2}", indent, confidence));
    }
    for (i, delta) in entry.deltas.iter().enumerate() {
        let prefix = if i == entry.deltas.len() - 1 { "└─" } else { "├─" };
        lines.push(format!(
            "{}{} {}: '{}' → '{}'",
            indent,
            prefix,
            delta.attribute,
            shorten(&delta.before),
            shorten(&delta.after)
        ));
    }
    lines
}

fn shorten(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_CHARS {
        return value.to_string();
    }
    let head: String = value.chars().take(MAX_VALUE_CHARS - 1).collect();
    format!("{}…", head)
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format a diff result, optionally without unchanged entries
    pub fn format_result(result: &DiffResult, changes_only: bool) -> Result<String> {
        if !changes_only {
            return Self::format(result);
        }
        let mut trimmed = result.clone();
        for section in &mut trimmed.sections {
            section.entries.retain(DiffEntry::is_change);
        }
        trimmed.sections.retain(|s| !s.entries.is_empty());
        Self::format(&trimmed)
    }
}

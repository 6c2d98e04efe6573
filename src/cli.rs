//! Command-line interface for docdiff

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docdiff")]
#[command(about = "A semantic diff tool for spreadsheet workbooks and PDF documents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare two documents of the same kind
    Compare {
        /// Original document
        file_a: PathBuf,

        /// Changed document
        file_b: PathBuf,

        /// Document kind: "excel" or "pdf" (detected from the first file when omitted)
        #[arg(long)]
        kind: Option<String>,

        /// Where to write the report
        #[arg(long, default_value = "comparison_result.txt")]
        output: PathBuf,

        /// Report format: "text" or "json"
        #[arg(long, default_value = "text")]
        format: String,

        /// JSON file with comparison settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Header of the column that identifies rows
        #[arg(long)]
        key_header: Option<String>,

        /// Minimum similarity for two units to be paired (0.0 to 1.0)
        #[arg(long, value_parser = validate_threshold)]
        threshold: Option<f64>,

        /// Skip unsupported content with a warning instead of failing
        #[arg(long)]
        lenient: bool,

        /// Leave unchanged entries out of the report
        #[arg(long)]
        changes_only: bool,
    },

    /// Dump the extracted model of one document
    Extract {
        /// Document to extract
        file: PathBuf,

        /// Document kind: "excel" or "pdf" (detected when omitted)
        #[arg(long)]
        kind: Option<String>,

        /// Output format: "text" or "json"
        #[arg(long, default_value = "text")]
        format: String,

        /// Skip unsupported content with a warning instead of failing
        #[arg(long)]
        lenient: bool,
    },
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'text' or 'json'", s)),
        }
    }
}

/// Validate that the threshold lies in [0, 1]
fn validate_threshold(s: &str) -> Result<f64, String> {
    let threshold: f64 = s
        .parse()
        .map_err(|_| format!("Invalid threshold: '{}'. Must be a number.", s))?;

    if !(0.0..=1.0).contains(&threshold) {
        return Err(format!("Threshold must be between 0 and 1: {}", threshold));
    }

    Ok(threshold)
}

//! Command implementations for docdiff CLI

use crate::cli::{Commands, OutputFormat};
use crate::config::{CompareConfig, Strictness};
use crate::error::{DocdiffError, Result};
use crate::extract::{self, DetectedKind};
use crate::model::DocumentKind;
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::progress::{NoProgress, ProgressObserver, ProgressReporter};
use crate::runner;
use log::info;
use std::path::Path;

/// Execute a command
pub fn execute_command(command: Commands, quiet: bool) -> Result<()> {
    match command {
        Commands::Compare {
            file_a,
            file_b,
            kind,
            output,
            format,
            config,
            key_header,
            threshold,
            lenient,
            changes_only,
        } => {
            let config = build_config(config.as_deref(), key_header, threshold, lenient)?;
            compare_command(
                &file_a,
                &file_b,
                kind.as_deref(),
                &output,
                &format,
                &config,
                changes_only,
                quiet,
            )
        }
        Commands::Extract {
            file,
            kind,
            format,
            lenient,
        } => {
            let config = build_config(None, None, None, lenient)?;
            extract_command(&file, kind.as_deref(), &format, &config)
        }
    }
}

/// Settings from the config file, then flag overrides
fn build_config(
    file: Option<&Path>,
    key_header: Option<String>,
    threshold: Option<f64>,
    lenient: bool,
) -> Result<CompareConfig> {
    let mut config = match file {
        Some(path) => CompareConfig::from_json_file(path)?,
        None => CompareConfig::default(),
    };
    if let Some(header) = key_header {
        config = config.with_key_header(header);
    }
    if let Some(threshold) = threshold {
        config = config.with_similarity_threshold(threshold);
    }
    if lenient {
        config = config.with_strictness(Strictness::Lenient);
    }
    config.validate()?;
    Ok(config)
}

/// Declared kind, or the one detected from the file
fn resolve_kind(declared: Option<&str>, path: &Path) -> Result<DocumentKind> {
    if let Some(kind) = declared {
        return DocumentKind::parse(kind).map_err(DocdiffError::invalid_input);
    }
    match extract::detect_kind(path) {
        DetectedKind::Known(kind) => Ok(kind),
        DetectedKind::Unrecognized(what) => Err(DocdiffError::invalid_input(format!(
            "cannot tell the kind of '{}' ({}); pass --kind",
            path.display(),
            what
        ))),
        DetectedKind::Undetermined => Err(DocdiffError::unreadable(path, "cannot determine document kind")),
    }
}

#[allow(clippy::too_many_arguments)]
fn compare_command(
    file_a: &Path,
    file_b: &Path,
    kind: Option<&str>,
    output: &Path,
    format: &str,
    config: &CompareConfig,
    changes_only: bool,
    quiet: bool,
) -> Result<()> {
    let format = OutputFormat::parse(format).map_err(DocdiffError::invalid_input)?;
    let kind = resolve_kind(kind, file_a)?;

    let result = if quiet {
        runner::compare_with_progress(file_a, file_b, kind, config, &NoProgress)?
    } else {
        let reporter = ProgressReporter::new_for_compare();
        let observer: &dyn ProgressObserver = &reporter;
        runner::compare_with_progress(file_a, file_b, kind, config, observer)?
    };

    let report = match format {
        OutputFormat::Text => PrettyPrinter::render_report(&result, changes_only, Some(chrono::Local::now())),
        OutputFormat::Json => JsonFormatter::format_result(&result, changes_only)?,
    };
    std::fs::write(output, report)?;
    info!("Report written to {}", output.display());

    PrettyPrinter::print_summary(&result);
    println!("📁 Report saved to: {}", output.display());
    Ok(())
}

fn extract_command(file: &Path, kind: Option<&str>, format: &str, config: &CompareConfig) -> Result<()> {
    let format = OutputFormat::parse(format).map_err(DocdiffError::invalid_input)?;
    let kind = resolve_kind(kind, file)?;
    let document = extract::extract(file, kind, config)?;

    match format {
        OutputFormat::Text => print!("{}", PrettyPrinter::render_document(&document)),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&document)?),
    }
    Ok(())
}

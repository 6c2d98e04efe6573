//! Comparison configuration

use crate::error::{DocdiffError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_MAX_FUZZY_CELLS: usize = 250_000;
pub const DEFAULT_HEADER_SEARCH_ROWS: u32 = 20;

/// How extraction reacts to content the model cannot represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Fail with `UnsupportedContent`
    #[default]
    Strict,
    /// Skip the construct and record a warning
    Lenient,
}

/// Tunables for one comparison call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Minimum similarity for a fuzzy match, in `[0, 1]`
    pub similarity_threshold: f64,
    /// Off-chain pairs displaced by at most this many positions are not reported as moved
    pub move_tolerance: usize,
    /// Upper bound on `unmatched_a * unmatched_b` for the fuzzy phase
    pub max_fuzzy_cells: usize,
    pub strictness: Strictness,
    /// Header text of the column whose values identify rows (e.g. `S.no`)
    pub key_header: Option<String>,
    /// Rows searched first when locating the header row
    pub header_search_rows: u32,
    /// Weight of header-name similarity when aligning columns with a key header
    pub header_name_weight: f64,
    pub trim_cell_text: bool,
    /// Baseline tolerance for line grouping, as a fraction of the font size
    pub baseline_tolerance: f64,
    /// Maximum vertical gap between lines of one block, as a multiple of the font size
    pub line_gap_factor: f64,
    /// Diff section pairs on the rayon pool
    pub parallel: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            move_tolerance: 0,
            max_fuzzy_cells: DEFAULT_MAX_FUZZY_CELLS,
            strictness: Strictness::Strict,
            key_header: None,
            header_search_rows: DEFAULT_HEADER_SEARCH_ROWS,
            header_name_weight: 0.25,
            trim_cell_text: true,
            baseline_tolerance: 0.3,
            line_gap_factor: 1.5,
            parallel: true,
        }
    }
}

impl CompareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DocdiffError::config(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        let config: CompareConfig = serde_json::from_str(&content).map_err(|e| {
            DocdiffError::config(format!("invalid config '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_move_tolerance(mut self, tolerance: usize) -> Self {
        self.move_tolerance = tolerance;
        self
    }

    pub fn with_max_fuzzy_cells(mut self, cells: usize) -> Self {
        self.max_fuzzy_cells = cells;
        self
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn with_key_header(mut self, header: impl Into<String>) -> Self {
        self.key_header = Some(header.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_lenient(&self) -> bool {
        self.strictness == Strictness::Lenient
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(DocdiffError::config(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.header_name_weight) {
            return Err(DocdiffError::config(format!(
                "header_name_weight must be within [0, 1], got {}",
                self.header_name_weight
            )));
        }
        if !(self.baseline_tolerance > 0.0) {
            return Err(DocdiffError::config("baseline_tolerance must be positive"));
        }
        if !(self.line_gap_factor > 0.0) {
            return Err(DocdiffError::config("line_gap_factor must be positive"));
        }
        if let Some(header) = &self.key_header {
            if header.trim().is_empty() {
                return Err(DocdiffError::config("key_header must not be blank"));
            }
        }
        Ok(())
    }
}

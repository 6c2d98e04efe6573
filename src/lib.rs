//! # docdiff
//!
//! A semantic diff engine for spreadsheet workbooks and PDF documents. Both inputs
//! are extracted into one canonical model (sections of cells or text blocks),
//! aligned structurally, and reported as added, removed, modified, moved and
//! unchanged entries with attribute-level deltas.

pub mod align;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diff;
pub mod error;
pub mod extract;
pub mod hash;
pub mod model;
pub mod output;
pub mod progress;
pub mod result;
pub mod runner;
pub mod similarity;

pub use config::CompareConfig;
pub use error::{DocdiffError, Result};
pub use model::DocumentKind;
pub use result::DiffResult;
pub use runner::{compare, compare_auto, compare_with_progress};

/// Current format version of serialized results
pub const FORMAT_VERSION: &str = "1.0.0";

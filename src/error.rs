//! Error types for docdiff operations

use crate::model::DocumentKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocdiffError>;

#[derive(Error, Debug)]
pub enum DocdiffError {
    #[error("Unreadable document '{path}': {reason}")]
    UnreadableDocument { path: PathBuf, reason: String },

    #[error("Unsupported content in '{path}' at {location}: {detail}")]
    UnsupportedContent {
        path: PathBuf,
        location: String,
        detail: String,
    },

    #[error("Kind mismatch for '{path}': declared {declared}, found {detected}")]
    KindMismatch {
        path: PathBuf,
        declared: DocumentKind,
        detected: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl DocdiffError {
    pub fn unreadable(path: &Path, reason: impl Into<String>) -> Self {
        Self::UnreadableDocument {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(path: &Path, location: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnsupportedContent {
            path: path.to_path_buf(),
            location: location.into(),
            detail: detail.into(),
        }
    }

    pub fn kind_mismatch(path: &Path, declared: DocumentKind, detected: impl Into<String>) -> Self {
        Self::KindMismatch {
            path: path.to_path_buf(),
            declared,
            detected: detected.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Short, stable name of the error kind, used by the CLI when reporting failures
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::UnreadableDocument { .. } => "UnreadableDocument",
            Self::UnsupportedContent { .. } => "UnsupportedContent",
            Self::KindMismatch { .. } => "KindMismatch",
            Self::Config { .. } => "Config",
            Self::InvalidInput { .. } => "InvalidInput",
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
            Self::Generic(_) => "Generic",
        }
    }
}

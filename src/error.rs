//! @acp:module "Errors"
//! @acp:summary "Fatal error taxonomy for quiz generation"
//! @acp:domain cli
//! @acp:layer model
//!
//! Every variant here aborts the run. Non-fatal conditions (unmatched
//! placeholders, missing answer markers) are reported through
//! [`crate::diagnostics::Diagnostics`] instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigIssue;

/// Errors raised by the generation pipeline
#[derive(Error, Debug)]
pub enum QuizError {
    /// Malformed or inconsistent configuration
    #[error("Invalid configuration '{origin}': {}", join_issues(.issues))]
    ConfigInvalid {
        origin: String,
        issues: Vec<ConfigIssue>,
    },

    /// Required external converter is not installed
    #[error("The '{tool}' command couldn't be found, markdown templates cannot be converted. {hint}")]
    ToolMissing { tool: String, hint: String },

    /// External converter exited unsuccessfully
    #[error("'{tool}' exited with {status} while converting '{}': {stderr}", .input.display())]
    ConversionFailed {
        tool: String,
        input: PathBuf,
        status: String,
        stderr: String,
    },

    /// Archive packaging step failed
    #[error("Failed to package quiz bank '{}': {reason}", .bank.display())]
    PackagingFailed { bank: PathBuf, reason: String },

    /// Template extension not recognized
    #[error("Unsupported template format '{extension}' for '{}' (supported: .md, .markdown, .txt, .text, .html, .htm)", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// An input file could not be read or is not valid UTF-8
    #[error("Failed to read '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An output file could not be created or written
    #[error("Failed to write '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl QuizError {
    /// Shorthand for a single-issue configuration error
    pub fn config(origin: impl Into<String>, issue: ConfigIssue) -> Self {
        QuizError::ConfigInvalid {
            origin: origin.into(),
            issues: vec![issue],
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        QuizError::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        QuizError::Write {
            path: path.into(),
            source,
        }
    }
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for quiz generation operations
pub type Result<T> = std::result::Result<T, QuizError>;

#![forbid(unsafe_code)]

//! @acp:module "Quizgen Library"
//! @acp:summary "Fill-in-the-blank quiz variant generation and question bank packaging"
//! @acp:domain cli
//! @acp:layer api
//! @acp:stability stable
//!
//! # Quizgen
//!
//! Generates batches of fill-in-the-blank quiz variants from a template and
//! a per-template variant configuration, then packages them as an
//! importable question bank.
//!
//! ## Pipeline
//!
//! - **Normalize**: Markdown, plain text or HTML template into HTML
//! - **Substitute**: variant placeholders, in configuration order
//! - **Render**: one `MB` quiz record per variant
//! - **Assemble**: records into `<bank>.txt`, packaged as `<bank>.zip`
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use quizgen::{Generator, PandocConverter, QtiPackager, TemplateJob, TracingDiagnostics};
//!
//! fn main() -> quizgen::Result<()> {
//!     let jobs = vec![TemplateJob::load("square.md", "square.json")?];
//!
//!     let converter = PandocConverter::default();
//!     let packager = QtiPackager::new();
//!     let diagnostics = TracingDiagnostics::new();
//!
//!     let report = Generator::new(&converter, &packager, &diagnostics)
//!         .run(&jobs, Path::new("out"), "quiz_bank")?;
//!     println!("{} quizzes", report.total_quizzes());
//!
//!     Ok(())
//! }
//! ```

mod atomic;

pub mod bank;
pub mod commands;
pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod generate;
pub mod render;

// Re-exports
pub use bank::{archive_path_for, assemble, BankArtifacts, Packager, QtiPackager};
pub use config::{ConfigIssue, FieldMap, GeneratorConfig, VariantConfig};
pub use convert::{
    normalize, BuiltinMarkdownConverter, DocumentConverter, PandocConverter, TemplateFormat,
};
pub use diagnostics::{
    CollectingDiagnostics, Diagnostic, Diagnostics, Location, Scoped, TracingDiagnostics,
};
pub use error::{QuizError, Result};
pub use generate::{GenerationReport, Generator, JobSummary, TemplateJob};
pub use render::{render, substitute, LineEnding, QuizRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! @acp:module "Diagnostics"
//! @acp:summary "Injected sink for non-fatal content problems"
//! @acp:domain cli
//! @acp:layer service
//!
//! Rendering never fails on content problems. Unmatched placeholders and
//! missing answer markers are handed to a [`Diagnostics`] sink passed in by
//! the caller: [`TracingDiagnostics`] logs and counts them, while
//! [`CollectingDiagnostics`] keeps them for inspection. [`Scoped`] tags
//! every diagnostic with the template and variant it came from.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A non-fatal problem found while generating a quiz
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Placeholder text does not occur in the template
    PlaceholderNotFound { placeholder: String },
    /// `[field]` marker does not occur in the question, so it cannot be answered
    AnswerMarkerMissing { field: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::PlaceholderNotFound { .. } => Severity::Warning,
            Diagnostic::AnswerMarkerMissing { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::PlaceholderNotFound { placeholder } => {
                write!(f, "Placeholder '{}' not found in quiz description.", placeholder)
            }
            Diagnostic::AnswerMarkerMissing { field } => write!(
                f,
                "Answer field '[{}]' not found in quiz description. The student will have no way to enter the answer.",
                field
            ),
        }
    }
}

/// Template and 1-based variant number a diagnostic belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub template: PathBuf,
    pub variant: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (variant #{})", self.template.display(), self.variant)
    }
}

/// Receiver for non-fatal diagnostics
pub trait Diagnostics: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);

    /// Emit a diagnostic known to come from `location`
    fn emit_at(&self, _location: &Location, diagnostic: Diagnostic) {
        self.emit(diagnostic);
    }
}

/// Forwards everything to `sink` tagged with a fixed location
pub struct Scoped<'a> {
    sink: &'a dyn Diagnostics,
    location: Location,
}

impl<'a> Scoped<'a> {
    pub fn new(sink: &'a dyn Diagnostics, location: Location) -> Self {
        Self { sink, location }
    }
}

impl Diagnostics for Scoped<'_> {
    fn emit(&self, diagnostic: Diagnostic) {
        self.sink.emit_at(&self.location, diagnostic);
    }

    fn emit_at(&self, location: &Location, diagnostic: Diagnostic) {
        self.sink.emit_at(location, diagnostic);
    }
}

/// Logs diagnostics through `tracing` and keeps per-severity counts
#[derive(Debug, Default)]
pub struct TracingDiagnostics {
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

impl TracingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }
}

impl TracingDiagnostics {
    fn record(&self, severity: Severity) {
        match severity {
            Severity::Warning => self.warnings.fetch_add(1, Ordering::Relaxed),
            Severity::Error => self.errors.fetch_add(1, Ordering::Relaxed),
        };
    }
}

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        self.record(diagnostic.severity());
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!("{}", diagnostic),
            Severity::Error => tracing::error!("{}", diagnostic),
        }
    }

    fn emit_at(&self, location: &Location, diagnostic: Diagnostic) {
        self.record(diagnostic.severity());
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!("{}: {}", location, diagnostic),
            Severity::Error => tracing::error!("{}: {}", location, diagnostic),
        }
    }
}

/// Stores every diagnostic in emission order
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<(Option<Location>, Diagnostic)>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<Diagnostic> {
        self.located().into_iter().map(|(_, d)| d).collect()
    }

    /// Like [`events`](Self::events), with the location each one was emitted at
    pub fn located(&self) -> Vec<(Option<Location>, Diagnostic)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, location: Option<Location>, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push((location, diagnostic));
        }
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        self.push(None, diagnostic);
    }

    fn emit_at(&self, location: &Location, diagnostic: Diagnostic) {
        self.push(Some(location.clone()), diagnostic);
    }
}

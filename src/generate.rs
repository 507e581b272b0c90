//! @acp:module "Generator"
//! @acp:summary "Run templates and their variants through the full pipeline"
//! @acp:domain cli
//! @acp:layer service
//!
//! Jobs are processed strictly in order: each template is normalized once,
//! then every variant is substituted and rendered. The quiz bank is only
//! written after all jobs succeeded, so a fatal error never leaves a bank
//! behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::bank::{assemble, BankArtifacts, Packager};
use crate::config::GeneratorConfig;
use crate::convert::{normalize, DocumentConverter};
use crate::diagnostics::{Diagnostics, Location, Scoped};
use crate::error::{QuizError, Result};
use crate::render::{render, substitute, LineEnding, QuizRecord};

/// A template paired with its configuration
#[derive(Debug, Clone)]
pub struct TemplateJob {
    pub template: PathBuf,
    pub config: GeneratorConfig,
    /// Where the config was loaded from, for reporting
    pub config_path: PathBuf,
}

impl TemplateJob {
    /// Load the config at `config_path` and pair it with `template`
    pub fn load(template: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Result<Self> {
        let config_path = config_path.into();
        debug!("Loading configuration file '{}'...", config_path.display());
        let config = GeneratorConfig::load(&config_path)?;
        Ok(Self {
            template: template.into(),
            config,
            config_path,
        })
    }
}

/// Per-job result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub template: PathBuf,
    pub config_path: PathBuf,
    pub quizzes: usize,
}

/// Outcome of a complete run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub jobs: Vec<JobSummary>,
    pub artifacts: BankArtifacts,
}

impl GenerationReport {
    /// Total number of quizzes in the bank
    pub fn total_quizzes(&self) -> usize {
        self.jobs.iter().map(|j| j.quizzes).sum()
    }
}

/// @acp:summary "Pipeline driver wired with its collaborators"
pub struct Generator<'a> {
    converter: &'a dyn DocumentConverter,
    packager: &'a dyn Packager,
    diagnostics: &'a dyn Diagnostics,
    line_ending: LineEnding,
}

impl<'a> Generator<'a> {
    pub fn new(
        converter: &'a dyn DocumentConverter,
        packager: &'a dyn Packager,
        diagnostics: &'a dyn Diagnostics,
    ) -> Self {
        Self {
            converter,
            packager,
            diagnostics,
            line_ending: LineEnding::default(),
        }
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Render every variant of one template. `scratch_dir` receives the
    /// normalized HTML.
    pub fn render_job(&self, job: &TemplateJob, scratch_dir: &Path) -> Result<Vec<QuizRecord>> {
        let normalized = normalize(&job.template, scratch_dir, self.converter)?;
        let template =
            fs::read_to_string(&normalized).map_err(|e| QuizError::read(&normalized, e))?;

        let mut records = Vec::with_capacity(job.config.variants.len());
        for (index, variant) in job.config.variants.iter().enumerate() {
            debug!("Processing variant #{}: {:?}", index + 1, variant);
            let diagnostics = Scoped::new(
                self.diagnostics,
                Location {
                    template: job.template.clone(),
                    variant: index + 1,
                },
            );
            let question = substitute(variant, &template, &diagnostics);
            records.push(render(variant, &question, self.line_ending, &diagnostics));
        }
        Ok(records)
    }

    /// @acp:summary "Generate all quizzes and package the bank"
    ///
    /// `output_dir` must exist; it holds the intermediate HTML files, the
    /// `<bank_name>.txt` bank and the packaged archive.
    pub fn run(
        &self,
        jobs: &[TemplateJob],
        output_dir: &Path,
        bank_name: &str,
    ) -> Result<GenerationReport> {
        let mut records = Vec::new();
        let mut summaries = Vec::with_capacity(jobs.len());

        for job in jobs {
            debug!(
                "Processing input '{}' with configuration '{}'...",
                job.template.display(),
                job.config_path.display()
            );
            let job_records = self.render_job(job, output_dir)?;
            info!(
                "Processed {} - {} pair and generated {} quizzes.",
                file_name(&job.template),
                file_name(&job.config_path),
                job_records.len()
            );

            summaries.push(JobSummary {
                template: job.template.clone(),
                config_path: job.config_path.clone(),
                quizzes: job_records.len(),
            });
            records.extend(job_records);
        }

        let artifacts = assemble(&records, output_dir, bank_name, self.packager)?;
        info!(
            "A quiz bank containing {} quizzes has been created in the '{}' directory.",
            records.len(),
            output_dir.display()
        );

        Ok(GenerationReport {
            jobs: summaries,
            artifacts,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

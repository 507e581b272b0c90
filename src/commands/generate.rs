//! @acp:module "Generate Command"
//! @acp:summary "Validate the invocation and generate a packaged quiz bank"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `quizgen generate`. Every input check runs before the first
//! file is written.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use console::style;
use regex::Regex;

use crate::bank::QtiPackager;
use crate::convert::{BuiltinMarkdownConverter, DocumentConverter, PandocConverter, TemplateFormat};
use crate::diagnostics::TracingDiagnostics;
use crate::generate::{Generator, TemplateJob};
use crate::render::LineEnding;

/// Allowed characters for bank names
static BANK_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap());

/// Markdown conversion backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConverterKind {
    /// External `pandoc` executable
    #[default]
    Pandoc,
    /// In-process pulldown-cmark rendering
    Builtin,
}

impl std::str::FromStr for ConverterKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pandoc" => Ok(ConverterKind::Pandoc),
            "builtin" | "pulldown-cmark" => Ok(ConverterKind::Builtin),
            _ => Err(format!("Unknown converter: {}. Use 'pandoc' or 'builtin'", s)),
        }
    }
}

/// Options for the generate command
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Quiz templates (.md, .txt, .html)
    pub inputs: Vec<PathBuf>,
    /// Configuration file for each template, same order
    pub configs: Vec<PathBuf>,
    /// Output directory, must be empty
    pub output: PathBuf,
    /// Remove the output directory first
    pub clear_output_dir: bool,
    /// Bank name used for the generated files
    pub bank_name: String,
    /// Markdown converter
    pub converter: ConverterKind,
    /// Pandoc executable
    pub pandoc: PathBuf,
    /// Record line terminator
    pub line_ending: LineEnding,
}

/// Execute the generate command
pub fn execute_generate(options: GenerateOptions) -> Result<()> {
    let jobs = load_jobs(&options.inputs, &options.configs)?;
    validate_bank_name(&options.bank_name)?;
    prepare_output_dir(&options.output, options.clear_output_dir)?;

    println!("{} Generating quizzes...", style("→").cyan());

    let pandoc = PandocConverter::new(&options.pandoc);
    let builtin = BuiltinMarkdownConverter::new();
    let converter: &dyn DocumentConverter = match options.converter {
        ConverterKind::Pandoc => &pandoc,
        ConverterKind::Builtin => &builtin,
    };
    let packager = QtiPackager::new();
    let diagnostics = TracingDiagnostics::new();

    let report = Generator::new(converter, &packager, &diagnostics)
        .with_line_ending(options.line_ending)
        .run(&jobs, &options.output, &options.bank_name)
        .context("Failed to generate quizzes")?;

    for job in &report.jobs {
        println!(
            "  {} + {}: {} quizzes",
            job.template.display(),
            job.config_path.display(),
            job.quizzes
        );
    }
    println!(
        "{} Quiz bank written to {}",
        style("✓").green(),
        report.artifacts.bank_file.display()
    );
    println!("  Archive: {}", report.artifacts.archive.display());
    println!("  Quizzes: {}", report.total_quizzes());

    if diagnostics.warnings() > 0 || diagnostics.errors() > 0 {
        println!(
            "{} {} warning(s) and {} error(s) reported, review the log above",
            style("!").yellow(),
            diagnostics.warnings(),
            diagnostics.errors()
        );
    }

    Ok(())
}

/// Check every template/config pair and load the configurations
pub fn load_jobs(inputs: &[PathBuf], configs: &[PathBuf]) -> Result<Vec<TemplateJob>> {
    if inputs.len() != configs.len() {
        bail!(
            "You must provide the same number of --input and --config arguments ({} != {}).",
            inputs.len(),
            configs.len()
        );
    }

    for input in inputs {
        if !input.is_file() {
            bail!("The specified input file does not exist: '{}'", input.display());
        }
        TemplateFormat::detect(input)?;
    }

    for config in configs {
        if !config.is_file() {
            bail!(
                "The specified configuration file does not exist: '{}'",
                config.display()
            );
        }
    }

    inputs
        .iter()
        .zip(configs)
        .map(|(input, config)| {
            TemplateJob::load(input, config).context("Failed to load configuration file")
        })
        .collect()
}

/// Bank names end up in file names and must stay plain
pub fn validate_bank_name(bank_name: &str) -> Result<()> {
    if BANK_NAME_PATTERN.is_match(bank_name) {
        Ok(())
    } else {
        Err(anyhow!(
            "The specified bank name ({}) is not valid. Only letters, digits, '.', '_' and '-' are allowed.",
            bank_name
        ))
    }
}

/// Ensure `output` is an empty directory, clearing or creating it as needed
pub fn prepare_output_dir(output: &Path, clear: bool) -> Result<()> {
    if clear && output.is_dir() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory '{}'", output.display()))?;
    }

    if output.exists() {
        if !output.is_dir() {
            bail!(
                "The specified output path is not a directory: '{}'",
                output.display()
            );
        }
        if fs::read_dir(output)?.next().is_some() {
            bail!(
                "The specified output directory is not empty: '{}' (use --clear-output-dir to replace its contents)",
                output.display()
            );
        }
    } else {
        fs::create_dir_all(output)
            .with_context(|| format!("Failed to create output directory '{}'", output.display()))?;
    }

    Ok(())
}

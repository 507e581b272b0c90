//! @acp:module "Bank Assembler"
//! @acp:summary "Concatenate quiz records into a bank file and package it"
//! @acp:domain cli
//! @acp:layer service

pub mod qti;

pub use qti::QtiPackager;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::atomic::write_atomic;
use crate::error::{QuizError, Result};
use crate::render::QuizRecord;

/// Extension of the packaged archive
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Turns a flat bank text file into an importable archive
pub trait Packager {
    /// Package `bank_file`, using `work_dir` for any output, and return the
    /// archive path
    fn package(&self, bank_file: &Path, work_dir: &Path) -> Result<PathBuf>;
}

/// Files produced by [`assemble`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankArtifacts {
    /// `<bank_name>.txt`
    pub bank_file: PathBuf,
    /// Archive produced by the packager
    pub archive: PathBuf,
}

/// Archive path for a bank file: same directory and stem, archive extension
pub fn archive_path_for(bank_file: &Path) -> PathBuf {
    bank_file.with_extension(ARCHIVE_EXTENSION)
}

/// @acp:summary "Write the quiz bank and package it"
///
/// Records are written in the given order to `<output_dir>/<bank_name>.txt`.
/// The bank file only appears once fully written; the packager then runs
/// exactly once. Any packaging error is reported as `PackagingFailed`.
pub fn assemble(
    records: &[QuizRecord],
    output_dir: &Path,
    bank_name: &str,
    packager: &dyn Packager,
) -> Result<BankArtifacts> {
    debug!("Generated {} quiz variants, creating quiz bank...", records.len());

    let bank_file = output_dir.join(format!("{}.txt", bank_name));
    let bank_text: String = records.iter().map(QuizRecord::as_str).collect();
    write_atomic(&bank_file, bank_text.as_bytes())?;

    debug!("Quiz bank created at '{}', packaging...", bank_file.display());
    let archive = packager
        .package(&bank_file, output_dir)
        .map_err(|e| match e {
            QuizError::PackagingFailed { .. } => e,
            other => QuizError::PackagingFailed {
                bank: bank_file.clone(),
                reason: other.to_string(),
            },
        })?;
    debug!("Quiz bank archive created at '{}'", archive.display());

    Ok(BankArtifacts { bank_file, archive })
}

//! @acp:module "Pandoc Converter"
//! @acp:summary "Markdown to HTML conversion through the pandoc executable"
//! @acp:domain cli
//! @acp:layer io

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::DocumentConverter;
use crate::error::{QuizError, Result};

const INSTALL_HINT: &str = "Install pandoc (https://pandoc.org/installing.html), point --pandoc at its executable, or use --converter builtin.";

/// Runs `pandoc --wrap=none` as a blocking subprocess
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: PathBuf,
}

impl PandocConverter {
    /// Use `program` as the pandoc executable (name on `PATH` or full path)
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl DocumentConverter for PandocConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        // --wrap=none: a wrapped line would later lose its newline and glue two words together
        cmd.arg("--wrap=none")
            .arg("--from=markdown")
            .arg("--to=html")
            .arg("-o")
            .arg(output)
            .arg(input);
        debug!("Executing format conversion: {:?}", cmd);

        let proc = match cmd.output() {
            Ok(proc) => proc,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(QuizError::ToolMissing {
                    tool: self.tool_name(),
                    hint: INSTALL_HINT.to_string(),
                });
            }
            Err(e) => return Err(QuizError::Io(e)),
        };

        let stdout = String::from_utf8_lossy(&proc.stdout);
        let stderr = String::from_utf8_lossy(&proc.stderr);
        debug!("Pandoc output:");
        debug!("  Exit status: {}", proc.status);
        debug!("  stdout: {}", stdout.trim());
        debug!("  stderr: {}", stderr.trim());

        if !proc.status.success() {
            return Err(QuizError::ConversionFailed {
                tool: self.tool_name(),
                input: input.to_path_buf(),
                status: proc.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_program_is_tool_missing() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("q.md");
        std::fs::write(&input, "# Q").unwrap();
        let output = temp.path().join("q.html");

        let converter = PandocConverter::new("quizgen-no-such-pandoc-binary");
        let err = converter.convert(&input, &output).unwrap_err();

        match err {
            QuizError::ToolMissing { tool, hint } => {
                assert_eq!(tool, "quizgen-no-such-pandoc-binary");
                assert!(hint.contains("--converter builtin"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_conversion_failed() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("q.md");
        std::fs::write(&input, "# Q").unwrap();

        // `false` ignores its arguments and exits with status 1
        let converter = PandocConverter::new("false");
        let err = converter
            .convert(&input, &temp.path().join("q.html"))
            .unwrap_err();

        assert!(matches!(err, QuizError::ConversionFailed { .. }));
    }

    #[test]
    fn test_default_program() {
        assert_eq!(PandocConverter::default().program(), Path::new("pandoc"));
    }
}

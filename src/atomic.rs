//! @acp:module "Atomic Writes"
//! @acp:summary "Rename-on-success file writes"
//! @acp:domain cli
//! @acp:layer io

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{QuizError, Result};

/// Directory that will hold `target`, falling back to the working directory
pub(crate) fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Write `contents` to a sibling temp file and rename it over `target`.
/// A failed write leaves `target` untouched.
pub(crate) fn write_atomic(target: &Path, contents: &[u8]) -> Result<()> {
    let failed = |e: std::io::Error| QuizError::write(target, e);

    let mut staging = NamedTempFile::new_in(parent_dir(target)).map_err(failed)?;
    staging.write_all(contents).map_err(failed)?;
    staging.flush().map_err(failed)?;
    staging.persist(target).map_err(|e| failed(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out.txt");
        std::fs::write(&target, "old").unwrap();

        write_atomic(&target, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("bank.txt")), Path::new("."));
        assert_eq!(parent_dir(Path::new("out/bank.txt")), Path::new("out"));
    }
}
